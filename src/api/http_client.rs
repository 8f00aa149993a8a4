use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::base::{ApiError, AuthApi, Endpoint};
use super::errors::normalize_error;
use crate::config::ApiConfig;
use crate::models::{AuthSession, Credentials, ProfileDraft, TokenKind, UserProfile};
use crate::store::TokenStore;

/// `AuthApi` over HTTP with `reqwest`.
pub struct HttpAuthApi {
    client: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl HttpAuthApi {
    pub fn new(config: &ApiConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        info!(base_url = %config.base_url, "Creating auth API client");
        Ok(HttpAuthApi {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    fn request(&self, method: Method, endpoint: Endpoint) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, endpoint.path());
        self.client.request(method, url)
    }

    /// Attaches the stored access token, if any. Without one the server
    /// answers 401 and the caller sees that as a normal rejection.
    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.tokens.get(TokenKind::Access) {
            Some(token) => builder.bearer_auth(token),
            None => {
                debug!("No access token stored; sending request without credentials");
                builder
            }
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = builder.send().await.map_err(|e| {
            warn!(endpoint = %endpoint, "Error sending request: {}", e);
            ApiError::transport(endpoint)
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            warn!(endpoint = %endpoint, "Error reading response body: {}", e);
            ApiError::transport(endpoint)
        })?;

        if status.is_success() {
            return serde_json::from_str::<T>(&body).map_err(|e| {
                warn!(endpoint = %endpoint, "Error parsing JSON: {}", e);
                ApiError::transport(endpoint)
            });
        }

        let message = normalize_error(endpoint, &body);
        debug!(
            endpoint = %endpoint,
            status = status.as_u16(),
            "Request rejected: {}",
            message
        );
        Err(ApiError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn authenticate<B: Serialize + ?Sized>(
        &self,
        endpoint: Endpoint,
        body: &B,
    ) -> Result<AuthSession, ApiError> {
        let builder = self.request(Method::POST, endpoint).json(body);
        self.send(endpoint, builder).await
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, credentials: &Credentials) -> Result<AuthSession, ApiError> {
        debug!(email = %credentials.email, "Sending login request");
        self.authenticate(Endpoint::Login, credentials).await
    }

    async fn register(&self, credentials: &Credentials) -> Result<AuthSession, ApiError> {
        debug!(email = %credentials.email, "Sending registration request");
        self.authenticate(Endpoint::Register, credentials).await
    }

    async fn fetch_current_user(&self) -> Result<UserProfile, ApiError> {
        let endpoint = Endpoint::FetchCurrentUser;
        let builder = self.authorized(self.request(Method::GET, endpoint));
        self.send(endpoint, builder).await
    }

    async fn update_current_user(&self, draft: &ProfileDraft) -> Result<UserProfile, ApiError> {
        let endpoint = Endpoint::UpdateCurrentUser;
        let builder = self.authorized(self.request(Method::PATCH, endpoint).json(draft));
        self.send(endpoint, builder).await
    }
}
