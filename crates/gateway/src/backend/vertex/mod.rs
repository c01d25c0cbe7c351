// Vertex AI REST implementation of the inference backend
mod auth;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

pub use auth::{DEFAULT_METADATA_TOKEN_URL, MetadataServerToken, StaticToken, TokenProvider};

use super::{
    BackendError, InferenceBackendLike, ModelEndpoint, PredictionInstance, PredictionParameters,
};

/// Upper bound on `endpoints.list` pages fetched for a single lookup.
const MAX_LIST_PAGES: usize = 20;
const LIST_PAGE_SIZE: &str = "10";

pub fn default_api_endpoint(location: &str) -> String {
    format!("https://{location}-aiplatform.googleapis.com")
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListEndpointsResponse {
    #[serde(default)]
    endpoints: Vec<VertexEndpoint>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VertexEndpoint {
    name: String,
    display_name: String,
    create_time: DateTime<Utc>,
}

impl From<VertexEndpoint> for ModelEndpoint {
    fn from(endpoint: VertexEndpoint) -> Self {
        let id = endpoint
            .name
            .rsplit('/')
            .next()
            .unwrap_or(endpoint.name.as_str())
            .to_string();

        ModelEndpoint {
            id,
            display_name: endpoint.display_name,
            create_time: endpoint.create_time,
            resource_name: endpoint.name,
        }
    }
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    instances: [&'a PredictionInstance; 1],
    parameters: &'a PredictionParameters,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<serde_json::Value>,
    deployed_model_id: Option<String>,
}

/// Client for the regional Vertex AI API of one project.
///
/// Holds no per-request state; clones share the underlying connection pool.
#[derive(Clone)]
pub struct VertexBackend {
    client: reqwest::Client,
    api_endpoint: String,
    project_id: String,
    location: String,
    token_provider: Arc<dyn TokenProvider>,
}

impl VertexBackend {
    pub fn new(
        client: reqwest::Client,
        api_endpoint: impl Into<String>,
        project_id: impl Into<String>,
        location: impl Into<String>,
        token_provider: Arc<dyn TokenProvider>,
    ) -> Self {
        let api_endpoint: String = api_endpoint.into();
        Self {
            client,
            api_endpoint: api_endpoint.trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            location: location.into(),
            token_provider,
        }
    }

    fn endpoints_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/locations/{}/endpoints",
            self.api_endpoint, self.project_id, self.location
        )
    }

    fn predict_url(&self, endpoint: &ModelEndpoint) -> String {
        format!("{}/v1/{}:predict", self.api_endpoint, endpoint.resource_name)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("Vertex AI request failed with status {}", status);
            return Err(BackendError::Api { status, body });
        }

        serde_json::from_str(&body).map_err(|e| BackendError::MalformedResponse(e.to_string()))
    }
}

fn display_name_filter(display_name: &str) -> String {
    let escaped = display_name.replace('\\', "\\\\").replace('"', "\\\"");
    format!("display_name=\"{escaped}\"")
}

#[async_trait::async_trait]
impl InferenceBackendLike for VertexBackend {
    async fn list_endpoints(&self, display_name: &str) -> Result<Vec<ModelEndpoint>, BackendError> {
        let token = self.token_provider.access_token().await?;
        let filter = display_name_filter(display_name);
        let url = self.endpoints_url();

        let mut endpoints = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_LIST_PAGES {
            let mut query = vec![
                ("filter", filter.clone()),
                ("orderBy", "create_time desc".to_string()),
                ("pageSize", LIST_PAGE_SIZE.to_string()),
            ];
            if let Some(token) = page_token.take() {
                query.push(("pageToken", token));
            }

            let response = self
                .client
                .get(&url)
                .bearer_auth(&token)
                .query(&query)
                .send()
                .await?;

            let page: ListEndpointsResponse = Self::decode(response).await?;
            endpoints.extend(page.endpoints.into_iter().map(ModelEndpoint::from));

            // Results are ordered server side, so later pages only hold older endpoints.
            if !endpoints.is_empty() {
                break;
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        if endpoints.is_empty() && page_token.is_some() {
            warn!(
                "Stopped listing endpoints for '{}' after {} pages",
                display_name, MAX_LIST_PAGES
            );
        }

        debug!(
            "Found {} endpoint(s) with display name '{}'",
            endpoints.len(),
            display_name
        );
        Ok(endpoints)
    }

    async fn predict(
        &self,
        endpoint: &ModelEndpoint,
        instance: &PredictionInstance,
        parameters: &PredictionParameters,
    ) -> Result<Vec<serde_json::Value>, BackendError> {
        let token = self.token_provider.access_token().await?;

        let response = self
            .client
            .post(self.predict_url(endpoint))
            .bearer_auth(&token)
            .json(&PredictRequest {
                instances: [instance],
                parameters,
            })
            .send()
            .await?;

        let prediction: PredictResponse = Self::decode(response).await?;
        debug!(
            "Prediction served by deployed model {:?} of endpoint {}",
            prediction.deployed_model_id, endpoint.id
        );

        Ok(prediction.predictions)
    }
}
