#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{InMemoryProgressStore, ProgressStore, StorageError, progress_key};
pub use sqlite::{SqliteInitError, SqliteProgressStore};
