//! Local key–value persistence.
//!
//! The client keeps a handful of named slots (session token, serialized
//! user profile, the single survey draft). Everything that touches them goes
//! through [`KeyValueStore`] so flows can run against [`MemoryStore`] in
//! tests and [`SqliteStore`] on disk.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use thiserror::Error;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";
pub const DRAFT_KEY: &str = "survey_draft";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Unable to create directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Unable to open local store {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("Local store query failed: {0}")]
    Query(#[from] rusqlite::Error),
    #[error("Unable to serialize value for local store: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Local store lock poisoned")]
    Poisoned,
}

/// Named string slots. Writes replace the previous value; last write wins.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
