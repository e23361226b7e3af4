//! Small string key/value persistence for session and player state.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

pub mod keys {
    pub const TOKEN: &str = "token";
    pub const USER: &str = "user";
    pub const PLAYER_STATE: &str = "player_state";
    pub const RECENT_SEARCHES: &str = "recent_searches";
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored value is malformed: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Values are opaque strings, each key overwritten wholesale.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<()> {
    store.set(key, &serde_json::to_string(value)?)
}
