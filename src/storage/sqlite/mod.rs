mod connection;
mod snapshot_repository;

pub use connection::SqliteStorage;
pub use snapshot_repository::SqliteSnapshotRepository;
