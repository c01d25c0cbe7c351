use serde::Deserialize;
use tracing::debug;

use crate::backend::BackendError;

pub const DEFAULT_METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Source of OAuth bearer tokens for the Vertex AI REST API.
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, BackendError>;
}

/// A token handed in through configuration, e.g. `gcloud auth print-access-token`
/// for local development.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait::async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String, BackendError> {
        Ok(self.0.clone())
    }
}

/// Fetches the attached service account's token from the instance metadata
/// server. Each call performs a fresh fetch.
pub struct MetadataServerToken {
    client: reqwest::Client,
    token_url: String,
}

#[derive(Deserialize)]
struct MetadataTokenResponse {
    access_token: String,
}

impl MetadataServerToken {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_url(client, DEFAULT_METADATA_TOKEN_URL)
    }

    pub fn with_url(client: reqwest::Client, token_url: impl Into<String>) -> Self {
        Self {
            client,
            token_url: token_url.into(),
        }
    }
}

#[async_trait::async_trait]
impl TokenProvider for MetadataServerToken {
    async fn access_token(&self) -> Result<String, BackendError> {
        debug!("Fetching access token from metadata server");

        let response = self
            .client
            .get(&self.token_url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| BackendError::Auth(format!("metadata server unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Auth(format!(
                "metadata server returned {status}: {body}"
            )));
        }

        let token: MetadataTokenResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Auth(format!("unreadable metadata token response: {e}")))?;

        Ok(token.access_token)
    }
}

#[cfg(test)]
mod unit_test {
    use super::*;
    use axum::{Json, Router, http::HeaderMap, http::StatusCode, routing::get};
    use serde_json::json;

    async fn spawn_metadata_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/token")
    }

    #[tokio::test]
    async fn test_static_token() {
        let provider = StaticToken::new("abc");
        assert_eq!(provider.access_token().await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_metadata_token_requires_flavor_header() {
        shared::setup_test!();

        let router = Router::new().route(
            "/token",
            get(|headers: HeaderMap| async move {
                match headers.get("Metadata-Flavor").and_then(|v| v.to_str().ok()) {
                    Some("Google") => (
                        StatusCode::OK,
                        Json(json!({
                            "access_token": "ya29.token",
                            "expires_in": 3599,
                            "token_type": "Bearer"
                        })),
                    ),
                    _ => (StatusCode::FORBIDDEN, Json(json!({}))),
                }
            }),
        );
        let url = spawn_metadata_server(router).await;

        let provider = MetadataServerToken::with_url(reqwest::Client::new(), url);
        assert_eq!(provider.access_token().await.unwrap(), "ya29.token");
    }

    #[tokio::test]
    async fn test_metadata_token_error_status() {
        shared::setup_test!();

        let router = Router::new().route(
            "/token",
            get(|| async { (StatusCode::NOT_FOUND, "no service account") }),
        );
        let url = spawn_metadata_server(router).await;

        let provider = MetadataServerToken::with_url(reqwest::Client::new(), url);
        let err = provider.access_token().await.unwrap_err();
        assert!(matches!(err, BackendError::Auth(ref msg) if msg.contains("404")));
    }
}
