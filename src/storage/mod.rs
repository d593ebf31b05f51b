pub mod traits;
pub mod sqlite;

pub use traits::SnapshotRepository;
pub use sqlite::{SqliteSnapshotRepository, SqliteStorage};
