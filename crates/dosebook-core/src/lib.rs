//! Core library for the dosebook client.
//!
//! The pieces, leaf-first:
//! - `store`: persistent key-value capability (file, keychain, memory)
//! - `auth`: the session store and the account operations built on it
//! - `api`: the HTTP client wrapper with its request/response interception
//! - `router`: the navigation capability the client drives on 401
//! - `bootstrap`: wires everything together and restores the session

pub mod api;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod models;
pub mod router;
pub mod store;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthError, AuthStore, SessionState};
pub use bootstrap::App;
pub use config::{Config, StorageBackend};
pub use models::{Credentials, Registration, User};
pub use router::{HistoryRouter, Navigator, Route};
pub use store::{FileStore, KeyValueStore, KeyringStore, MemoryStore};
