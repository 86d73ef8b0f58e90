//! Persistence implementations
//!
//! File-based implementations of the domain repository traits.

mod csv_snapshot_repo;

pub use csv_snapshot_repo::CsvSnapshotRepository;
