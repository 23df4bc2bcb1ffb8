//! Admin API client
//!
//! Combines the HTTP wrapper with the session context: every call gets the
//! bearer token attached, and a 401 from any call tears the session down
//! with a single notification.

use super::error::ApiError;
use super::http::ApiHttpClient;
use super::session::{AdminUser, SessionContext};
use crate::notification::{Notification, Notifier, OperationType};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Path of the sign-in endpoint, relative to `/admin/`
const LOGIN_PATH: &str = "auth/login";

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    #[serde(default)]
    user: Option<AdminUser>,
}

/// Main admin API client
#[derive(Clone)]
pub struct ApiClient {
    http: ApiHttpClient,
    base_url: String,
    session: Arc<SessionContext>,
    notifier: Arc<dyn Notifier>,
}

impl ApiClient {
    /// Create a client for the API at `base_url`
    pub fn new(
        base_url: &str,
        timeout: Duration,
        session: Arc<SessionContext>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| ApiError::Transport(format!("invalid API URL '{}': {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::Transport(format!(
                "unsupported API URL scheme: {}",
                parsed.scheme()
            )));
        }

        Ok(Self {
            http: ApiHttpClient::new(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            notifier,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    /// `{base}/admin/{path}`
    pub fn admin_url(&self, path: &str) -> String {
        format!("{}/admin/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Path of a single record, with the id percent-encoded
    pub fn record_path(path: &str, id: &str) -> String {
        format!("{}/{}", path, urlencoding::encode(id))
    }

    pub async fn get(&self, path: &str, params: &[(String, String)]) -> Result<Value, ApiError> {
        self.request(Method::GET, path, None, params).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.request(Method::POST, path, Some(body), &[]).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.request(Method::PUT, path, Some(body), &[]).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.request(Method::PATCH, path, Some(body), &[]).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Method::DELETE, path, None, &[]).await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        params: &[(String, String)],
    ) -> Result<Value, ApiError> {
        let token = self.session.gate()?;
        let url = self.admin_url(path);

        let result = self
            .http
            .send(method, &url, Some(&token), body, params)
            .await;

        if let Err(ApiError::Unauthorized) = result {
            self.handle_unauthorized();
        }
        result
    }

    /// Global 401 handling: end the session and tell the user once
    fn handle_unauthorized(&self) {
        if self.session.teardown() {
            tracing::warn!("Session rejected by server, signing out");
            self.notifier.notify(Notification::error(
                OperationType::SignIn,
                "",
                "Session expired, please sign in again",
            ));
        }
    }

    /// Exchange credentials for a token and start the session.
    ///
    /// Bad credentials come back as [`ApiError::Unauthorized`] and are left
    /// to the caller to report.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AdminUser, ApiError> {
        let body = json!({ "email": email, "password": password });
        let response = self
            .http
            .send(Method::POST, &self.admin_url(LOGIN_PATH), None, Some(&body), &[])
            .await?;

        let payload = response.get("data").cloned().unwrap_or(response);
        let login: LoginResponse = serde_json::from_value(payload)
            .map_err(|e| ApiError::Decode(format!("invalid login response: {}", e)))?;

        let user = login.user.unwrap_or_else(|| AdminUser {
            email: email.to_string(),
            ..Default::default()
        });

        // The in-memory session is live even if persisting it failed
        if let Err(e) = self.session.init(&login.token, Some(user.clone())) {
            tracing::warn!("Failed to persist session: {:#}", e);
        }

        tracing::info!("Signed in as {}", user.email);
        Ok(user)
    }

    /// End the session locally
    pub fn sign_out(&self) {
        if self.session.teardown() {
            tracing::info!("Signed out");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::session::MemoryCredentialStore;
    use crate::notification::SharedNotifications;

    fn client(base: &str) -> Result<ApiClient, ApiError> {
        let session = Arc::new(SessionContext::restore(Arc::new(MemoryCredentialStore::new())));
        ApiClient::new(
            base,
            Duration::from_secs(5),
            session,
            Arc::new(SharedNotifications::default()),
        )
    }

    #[test]
    fn test_urls() {
        let client = client("http://localhost:8080/").unwrap();
        assert_eq!(client.admin_url("products"), "http://localhost:8080/admin/products");
        assert_eq!(
            client.admin_url(&ApiClient::record_path("products", "a b/c")),
            "http://localhost:8080/admin/products/a%20b%2Fc"
        );
    }

    #[test]
    fn test_rejects_bad_base_url() {
        assert!(client("not a url").is_err());
        assert!(client("ftp://example.com").is_err());
    }

    #[tokio::test]
    async fn test_calls_without_session_are_refused() {
        let client = client("http://127.0.0.1:9").unwrap();
        let result = client.get("products", &[]).await;
        assert!(matches!(result, Err(ApiError::SessionRequired)));
    }
}
