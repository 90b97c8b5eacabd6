pub mod init;
pub mod play;
pub mod rank;
pub mod score;
pub mod validate;
