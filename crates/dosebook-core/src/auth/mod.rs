//! Authentication module for managing the user session.
//!
//! This module provides:
//! - `SessionState`: the shared in-memory session, written through to a
//!   `KeyValueStore` so it survives restarts
//! - `AuthStore`: login, logout, registration and profile refresh on top of
//!   the session and the API client
//!
//! The session is authenticated only while both a token and a user are held.

pub mod error;
pub mod session;
pub mod store;

pub use error::AuthError;
pub use session::{Session, SessionState, TOKEN_KEY, USER_KEY};
pub use store::AuthStore;
