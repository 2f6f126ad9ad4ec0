//! REST API client module for the dosebook server.
//!
//! This module provides the `ApiClient` through which every server call is
//! made. Outbound requests get `Authorization: Token <token>` from the
//! current session; inbound 401 responses clear the session and send the
//! user to the login view before the error reaches the caller.

pub mod client;
pub mod error;

pub use client::{ApiClient, Credential, ResponseOutcome};
pub use error::ApiError;
