// Managed inference backend the gateway talks to
pub mod vertex;

use chrono::{DateTime, Utc};
use http::StatusCode;
use serde::Serialize;
use thiserror::Error;

pub use vertex::{MetadataServerToken, StaticToken, TokenProvider, VertexBackend};

/// A deployed instance of a named model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEndpoint {
    pub id: String,
    pub display_name: String,
    pub create_time: DateTime<Utc>,
    /// Fully qualified resource name, used as the handle for prediction calls.
    pub resource_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionInstance {
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionParameters {
    pub max_output_tokens: u32,
    pub temperature: f64,
}

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("network error talking to the inference backend")]
    Network(#[from] reqwest::Error),
    #[error("inference backend returned {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("failed to obtain an access token: {0}")]
    Auth(String),
    #[error("malformed response from the inference backend: {0}")]
    MalformedResponse(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait InferenceBackendLike: Send + Sync {
    /// Endpoints whose display name equals `display_name`, newest
    /// `create_time` first. Implementations may return only a prefix of the
    /// full listing as long as it starts with the newest endpoint.
    async fn list_endpoints(&self, display_name: &str) -> Result<Vec<ModelEndpoint>, BackendError>;

    /// Issues a single prediction call and returns the raw predictions.
    async fn predict(
        &self,
        endpoint: &ModelEndpoint,
        instance: &PredictionInstance,
        parameters: &PredictionParameters,
    ) -> Result<Vec<serde_json::Value>, BackendError>;
}
