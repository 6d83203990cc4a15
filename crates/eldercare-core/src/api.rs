//! Client for the care backend's REST API.
//!
//! JSON in, JSON out. Authenticated endpoints send the session token as a
//! bearer header. A non-success status becomes [`ApiError::Status`] carrying
//! the code and reason phrase; nothing is retried.

use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::auth::{Credentials, Registration, User, UserPatch};
use crate::error::ApiError;
use crate::profile::ElderlyProfile;
use crate::storage::Config;

/// Body returned by login and registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    /// A bad base URL is kept as its parse error and surfaces on the first request.
    base: Result<Url, url::ParseError>,
    token: Option<String>,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL or the HTTP
    /// client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Self::deferred(base_url, timeout)?;
        client.base()?;
        Ok(client)
    }

    /// Like [`ApiClient::new`], but an invalid base URL only fails the
    /// requests, so offline features keep working.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let client = Self::deferred(
            &config.api_base_url(),
            Duration::from_secs(config.api.timeout_secs),
        )?;
        if let Err(e) = &client.base {
            tracing::warn!(url = %config.api_base_url(), error = %e, "invalid API base URL, backend calls will fail");
        }
        Ok(client)
    }

    fn deferred(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base = Url::parse(base_url.trim_end_matches('/'));
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ApiError::Transport {
                endpoint: base_url.to_string(),
                source,
            })?;
        Ok(Self {
            http,
            base,
            token: None,
        })
    }

    fn base(&self) -> Result<&Url, ApiError> {
        self.base.as_ref().map_err(|e| ApiError::InvalidUrl(*e))
    }

    /// `None` when the configured base URL did not parse.
    pub fn base_url(&self) -> Option<&str> {
        self.base.as_ref().ok().map(Url::as_str)
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.base()?.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let mut req = self.http.request(method, self.url(path)?);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        Ok(req)
    }

    fn require_token(&self) -> Result<(), ApiError> {
        if self.token.is_none() {
            return Err(ApiError::NotAuthenticated);
        }
        Ok(())
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder, method: Method, path: &str) -> Result<T, ApiError> {
        let transport = |source| ApiError::Transport {
            endpoint: path.to_string(),
            source,
        };

        let response = req.send().await.map_err(|e| {
            tracing::error!(%method, endpoint = path, error = %e, "request failed");
            transport(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let err = ApiError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            };
            tracing::error!(%method, endpoint = path, error = %err, "request rejected");
            return Err(err);
        }

        let body = response.text().await.map_err(transport)?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode {
            endpoint: path.to_string(),
            message: e.to_string(),
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let req = self.request(Method::GET, path)?;
        self.send(req, Method::GET, path).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let req = self.request(Method::POST, path)?.json(body);
        self.send(req, Method::POST, path).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let req = self.request(Method::PUT, path)?.json(body);
        self.send(req, Method::PUT, path).await
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        self.post("/auth/login", credentials).await
    }

    pub async fn register(&self, registration: &Registration) -> Result<AuthResponse, ApiError> {
        self.post("/auth/register", registration).await
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        self.require_token()?;
        self.get("/auth/me").await
    }

    pub async fn reset_password(&self, email: &str) -> Result<serde_json::Value, ApiError> {
        self.post("/auth/reset-password", &serde_json::json!({ "email": email }))
            .await
    }

    pub async fn update_profile(&self, patch: &UserPatch) -> Result<User, ApiError> {
        self.require_token()?;
        self.put("/auth/profile", patch).await
    }

    pub async fn elderly_info(&self) -> Result<ElderlyProfile, ApiError> {
        self.require_token()?;
        self.get("/idoso/informacoesIdoso").await
    }

    pub async fn create_elderly(&self, profile: &ElderlyProfile) -> Result<ElderlyProfile, ApiError> {
        self.require_token()?;
        self.post("/idoso", profile).await
    }
}
