//! Persistent key-value storage for session state.
//!
//! This module provides:
//! - `KeyValueStore`: the synchronous string-keyed capability the session
//!   store writes through to
//! - `FileStore`: a JSON map file in the user's data directory
//! - `KeyringStore`: entries in the OS keychain
//! - `MemoryStore`: process-local storage for tests and ephemeral runs

pub mod file;
pub mod keychain;
pub mod memory;

pub use self::file::FileStore;
pub use self::keychain::KeyringStore;
pub use self::memory::MemoryStore;

use anyhow::Result;

/// Synchronous string-keyed storage that survives process restarts.
///
/// A missing key is `Ok(None)`, never an error. Removing a missing key
/// succeeds.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}
