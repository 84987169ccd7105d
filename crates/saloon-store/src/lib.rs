//! saloon-store
//!
//! Content-store adapters feeding the reindex job: the forum's SQLite
//! database read through one sqlx transaction per snapshot, and an
//! in-memory store for tests and demos.
pub mod memory;
pub mod sqlite;

pub use memory::MemoryContentStore;
pub use sqlite::SqliteContentStore;
