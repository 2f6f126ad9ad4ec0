//! API client for communicating with the dosebook REST API.
//!
//! Every request goes through the same two interception points:
//! `authorize` decides which credential to attach before sending, and
//! `classify` decides what a response means once it arrives.

use std::sync::Arc;

use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::auth::SessionState;
use crate::router::{Navigator, Route};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Authorization header scheme used by the server
const TOKEN_SCHEME: &str = "Token";

/// Server-side session revocation endpoint
const LOGOUT_PATH: &str = "/auth/logout/";

/// Credential chosen for an outbound request.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Token(String),
    Anonymous,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Token(_) => f.write_str("Token(<redacted>)"),
            Credential::Anonymous => f.write_str("Anonymous"),
        }
    }
}

/// What an inbound response means to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOutcome {
    Success,
    /// HTTP 401: the session is no longer valid
    AuthFailure,
    Failure(StatusCode),
}

/// API client for the dosebook server.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling,
/// and the session is shared.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: SessionState,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    /// Create a client rooted at `base_url` (already including the `/api` prefix).
    pub fn new(
        base_url: impl Into<String>,
        session: SessionState,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        // No timeout: transport defaults apply.
        let client = Client::builder().default_headers(headers).build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(base_url = %base_url, "API client created");

        Ok(Self {
            client,
            base_url,
            session,
            navigator,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    // ========================================================================
    // Interception points
    // ========================================================================

    /// Outbound: the credential for a request sent right now.
    ///
    /// Reads the session at call time, so requests in flight across a
    /// login or logout may carry different credentials.
    pub fn authorize(&self) -> Credential {
        match self.session.token() {
            Some(token) => Credential::Token(token),
            None => Credential::Anonymous,
        }
    }

    /// Inbound: classify a response status.
    pub fn classify(status: StatusCode) -> ResponseOutcome {
        if status.is_success() {
            ResponseOutcome::Success
        } else if status == StatusCode::UNAUTHORIZED {
            ResponseOutcome::AuthFailure
        } else {
            ResponseOutcome::Failure(status)
        }
    }

    /// Attach a credential to a request.
    ///
    /// A token that cannot be encoded as a header value is dropped and the
    /// request goes out anonymous instead of failing.
    fn attach(builder: RequestBuilder, credential: &Credential) -> RequestBuilder {
        let Credential::Token(token) = credential else {
            return builder;
        };
        match header::HeaderValue::from_str(&format!("{} {}", TOKEN_SCHEME, token)) {
            Ok(mut value) => {
                value.set_sensitive(true);
                builder.header(header::AUTHORIZATION, value)
            }
            Err(e) => {
                warn!(error = %e, "Stored token is not a valid header value, sending without credential");
                builder
            }
        }
    }

    /// Clear the session and send the user to the login view.
    fn handle_auth_failure(&self) {
        warn!("Server rejected credential, forcing logout");
        if let Err(e) = self.session.force_logout() {
            warn!(error = %e, "Failed to clear persisted session");
        }
        self.navigator.navigate_to(Route::Login);
    }

    /// Read the body of a failed response into an error
    async fn failure(status: StatusCode, response: Response) -> ApiError {
        let body = response.text().await.unwrap_or_default();
        ApiError::from_status(status, &body)
    }

    /// Send a request through both interception points.
    async fn execute(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let credential = self.authorize();
        let response = Self::attach(builder, &credential).send().await?;

        let status = response.status();
        match Self::classify(status) {
            ResponseOutcome::Success => Ok(response),
            ResponseOutcome::AuthFailure => {
                self.handle_auth_failure();
                Err(ApiError::Unauthorized)
            }
            ResponseOutcome::Failure(status) => Err(Self::failure(status, response).await),
        }
    }

    async fn parse<T: DeserializeOwned>(response: Response, url: &str) -> Result<T, ApiError> {
        response.json().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", url, e))
        })
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(method = %method, url = %url, "Sending request");

        let mut builder = self.client.request(method, &url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = self.execute(builder).await?;
        Self::parse(response, &url).await
    }

    // ========================================================================
    // Request helpers
    // ========================================================================

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send_json::<(), T>(Method::GET, path, None).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::POST, path, Some(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::PUT, path, Some(body)).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::PATCH, path, Some(body)).await
    }

    /// DELETE, ignoring any response body
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path);
        debug!(url = %url, "Sending DELETE");
        self.execute(self.client.delete(&url)).await?;
        Ok(())
    }

    /// Revoke `token` on the server.
    ///
    /// Runs after the local session is already gone, so it carries the
    /// captured token itself. A 401 is handled like any other request's and
    /// navigates to the login view, but the session is only cleared if it
    /// still holds the rejected token; a newer login is left alone.
    pub(crate) async fn revoke(&self, token: &str) -> Result<(), ApiError> {
        let url = self.url(LOGOUT_PATH);
        let credential = Credential::Token(token.to_string());
        let response = Self::attach(self.client.post(&url), &credential)
            .send()
            .await?;

        let status = response.status();
        match Self::classify(status) {
            ResponseOutcome::Success => Ok(()),
            ResponseOutcome::AuthFailure => {
                if self.session.token().as_deref() == Some(token) {
                    self.handle_auth_failure();
                } else {
                    warn!("Server rejected revoked token");
                    self.navigator.navigate_to(Route::Login);
                }
                Err(ApiError::Unauthorized)
            }
            ResponseOutcome::Failure(status) => Err(Self::failure(status, response).await),
        }
    }
}
