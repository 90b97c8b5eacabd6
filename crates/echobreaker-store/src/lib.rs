//! echobreaker-store: `GameStore` implementations.
//!
//! [`MemoryStore`] keeps everything in process and is what tests and
//! one-off scoring use. [`SnapshotStore`] persists the same state as a
//! JSON file, saved after every write.

pub mod error;
pub mod memory;
pub mod snapshot;
pub mod state;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use snapshot::SnapshotStore;
pub use state::GameState;
