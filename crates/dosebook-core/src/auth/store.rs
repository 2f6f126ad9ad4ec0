use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::models::{Credentials, LoginResponse, RegisterResponse, Registration, User};

use super::{AuthError, SessionState};

const LOGIN_PATH: &str = "/auth/login/";
const REGISTER_PATH: &str = "/auth/register/";
const PROFILE_PATH: &str = "/auth/me/";

/// Account operations on top of the shared session.
#[derive(Clone)]
pub struct AuthStore {
    api: ApiClient,
    session: SessionState,
}

impl AuthStore {
    /// Build on the client's session so both see the same state
    pub fn new(api: ApiClient) -> Self {
        let session = api.session().clone();
        Self { api, session }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Restore the session from storage. See [`SessionState::init`].
    pub fn init(&self) -> bool {
        self.session.init()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn user(&self) -> Option<User> {
        self.session.user()
    }

    /// Authenticate and store the issued token and user.
    ///
    /// Nothing is committed unless the whole response parsed and both values
    /// were persisted.
    pub async fn login(&self, credentials: &Credentials) -> Result<User, AuthError> {
        debug!(username = %credentials.username, "Logging in");
        let response: LoginResponse = self.api.post(LOGIN_PATH, credentials).await?;

        self.session.commit(response.token, response.user.clone())?;
        info!(user_id = response.user.id, "Logged in");
        Ok(response.user)
    }

    /// Create an account; the server signs the new user in immediately.
    pub async fn register(&self, registration: &Registration) -> Result<User, AuthError> {
        registration.validate().map_err(AuthError::Validation)?;

        debug!(username = %registration.username, "Registering");
        let response: RegisterResponse = self.api.post(REGISTER_PATH, registration).await?;

        self.session.commit(response.token, response.user.clone())?;
        info!(user_id = response.user.id, "Registered and logged in");
        Ok(response.user)
    }

    /// End the session.
    ///
    /// Local state is cleared before this returns, whatever the server says.
    /// When a token was held, the server is told in a background task whose
    /// handle is returned; dropping it does not cancel the notification.
    /// Must be called from within a Tokio runtime.
    pub fn logout(&self) -> Option<JoinHandle<()>> {
        let token = self.session.token();

        if let Err(e) = self.session.force_logout() {
            warn!(error = %e, "Failed to clear persisted session");
        }
        info!("Logged out");

        let token = token?;
        let api = self.api.clone();
        Some(tokio::spawn(async move {
            match api.revoke(&token).await {
                Ok(()) => debug!("Server session revoked"),
                Err(e) => warn!(error = %e, "Logout notification failed, local session already cleared"),
            }
        }))
    }

    /// Clear the session without telling the server
    pub fn force_logout(&self) -> Result<(), AuthError> {
        self.session.force_logout()?;
        Ok(())
    }

    /// Replace the stored profile, keeping the token
    pub fn set_user(&self, user: User) -> Result<(), AuthError> {
        self.session.set_user(user)?;
        Ok(())
    }

    /// Fetch the current profile from the server and store it
    pub async fn refresh_user(&self) -> Result<User, AuthError> {
        let user: User = self.api.get(PROFILE_PATH).await?;
        self.session.set_user(user.clone())?;
        debug!(user_id = user.id, "Profile refreshed");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::router::HistoryRouter;
    use crate::store::MemoryStore;

    fn store() -> AuthStore {
        let session = SessionState::new(Arc::new(MemoryStore::new()));
        // Nothing listens here; any network call fails fast
        let api = ApiClient::new("http://127.0.0.1:9/api", session, Arc::new(HistoryRouter::new()))
            .unwrap();
        AuthStore::new(api)
    }

    #[tokio::test]
    async fn test_register_validation_runs_before_network() {
        let auth = store();
        let registration = Registration {
            username: "u".to_string(),
            nickname: "n".to_string(),
            password: "a".to_string(),
            password_confirm: "b".to_string(),
        };
        let err = auth.register(&registration).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        assert!(!auth.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_without_token_skips_notification() {
        let auth = store();
        assert!(auth.logout().is_none());
        assert!(!auth.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_server_unreachable() {
        let auth = store();
        let user = serde_json::from_str(r#"{"id":1,"username":"a"}"#).unwrap();
        auth.session().commit("T1".to_string(), user).unwrap();

        let handle = auth.logout().expect("token was held");
        // Cleared before the notification has run
        assert!(!auth.is_authenticated());
        assert!(auth.session().token().is_none());

        // The failed notification never surfaces as a panic or error
        handle.await.unwrap();
        assert!(!auth.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_network_failure_commits_nothing() {
        let auth = store();
        let err = auth
            .login(&Credentials::new("a", "b"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Api(crate::api::ApiError::Network(_))));
        assert_eq!(auth.session().snapshot(), crate::auth::Session::default());
    }
}
