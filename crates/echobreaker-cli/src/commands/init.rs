//! The `echobreaker init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    if Path::new("echobreaker.toml").exists() {
        println!("echobreaker.toml already exists, skipping.");
    } else {
        std::fs::write("echobreaker.toml", SAMPLE_CONFIG)?;
        println!("Created echobreaker.toml");
    }

    std::fs::create_dir_all("rounds")?;
    let example_path = Path::new("rounds/example.toml");
    if example_path.exists() {
        println!("rounds/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_ROUND)?;
        println!("Created rounds/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: echobreaker validate --round rounds/example.toml");
    println!("  2. Run: echobreaker score --round rounds/example.toml");
    println!("  3. Run: echobreaker play --round rounds/example.toml --store game.json");
    println!("  4. Run: echobreaker rank --store game.json");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# echobreaker configuration

# Questions per daily session
batch_size = 5

# Rows shown by `echobreaker rank`
leaderboard_limit = 50

# Minutes from UTC at which the game day rolls over (-300 = US Eastern)
day_offset_minutes = -300
"#;

const EXAMPLE_ROUND: &str = include_str!("../../../../rounds/example.toml");
