use std::{sync::Arc, time::Duration};

use clap::Parser;
use gateway::{
    DEFAULT_MODEL_ID, GatewayService, GenerationDefaults, MetadataServerToken, StaticToken,
    TokenProvider, VertexBackend, vertex::default_api_endpoint,
};
use shared::error::CommonError;
use tracing::info;
use url::Url;

/// Settings for `serve`. Every flag can also come from the environment the
/// hosting platform provides.
#[derive(Clone, Parser)]
pub struct ServeParams {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,
    #[arg(long, env = "PORT", default_value = "8080")]
    pub port: u16,
    /// Project that owns the model endpoints
    #[arg(long, env = "PROJECT_ID")]
    pub project_id: String,
    /// Region the endpoints are deployed in
    #[arg(long, env = "REGION", default_value = "us-central1")]
    pub region: String,
    /// Deployment label, only used for diagnostics
    #[arg(long, env = "ENVIRONMENT", default_value = "dev")]
    pub environment: String,
    /// Wall-clock budget for one request, e.g. `60s` or `2m`
    #[arg(long, env = "REQUEST_TIMEOUT", default_value = "60s")]
    pub request_timeout: humantime::Duration,
    /// Model used when a request does not name one
    #[arg(long, env = "DEFAULT_MODEL_ID", default_value = DEFAULT_MODEL_ID)]
    pub default_model_id: String,
    /// Override for the regional Vertex AI API base URL
    #[arg(long, env = "VERTEX_API_ENDPOINT")]
    pub vertex_api_endpoint: Option<Url>,
    /// Static bearer token; the metadata server is used when absent
    #[arg(long, env = "VERTEX_ACCESS_TOKEN", hide_env_values = true)]
    pub vertex_access_token: Option<String>,
}

impl ServeParams {
    fn validate(&self) -> Result<(), CommonError> {
        if self.project_id.trim().is_empty() {
            return Err(CommonError::invalid_configuration("project id must not be empty"));
        }
        if self.region.trim().is_empty() {
            return Err(CommonError::invalid_configuration("region must not be empty"));
        }
        if self.default_model_id.trim().is_empty() {
            return Err(CommonError::invalid_configuration(
                "default model id must not be empty",
            ));
        }
        if self.request_timeout().is_zero() {
            return Err(CommonError::invalid_configuration(
                "request timeout must be greater than zero",
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        *self.request_timeout
    }

    pub fn api_endpoint(&self) -> String {
        match &self.vertex_api_endpoint {
            Some(url) => url.to_string(),
            None => default_api_endpoint(&self.region),
        }
    }
}

/// Builds the request handler state. Called once at startup; the resulting
/// backend client is shared read-only by every request.
pub fn build_gateway_service(params: &ServeParams) -> Result<GatewayService, CommonError> {
    params.validate()?;

    let client = reqwest::Client::builder()
        .timeout(params.request_timeout())
        .build()?;

    let token_provider: Arc<dyn TokenProvider> = match &params.vertex_access_token {
        Some(token) => {
            info!("Using static access token for Vertex AI");
            Arc::new(StaticToken::new(token.clone()))
        }
        None => {
            info!("Using metadata server credentials for Vertex AI");
            Arc::new(MetadataServerToken::new(client.clone()))
        }
    };

    let backend = VertexBackend::new(
        client,
        params.api_endpoint(),
        params.project_id.clone(),
        params.region.clone(),
        token_provider,
    );

    Ok(GatewayService::new(
        Arc::new(backend),
        GenerationDefaults::with_model_id(params.default_model_id.clone()),
        params.request_timeout(),
    ))
}

#[cfg(test)]
mod unit_test {
    use super::*;

    fn parse(args: &[&str]) -> ServeParams {
        let mut argv = vec!["serve"];
        argv.extend_from_slice(args);
        ServeParams::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let params = parse(&["--project-id", "my-project", "--region", "us-central1"]);

        assert_eq!(params.project_id, "my-project");
        assert_eq!(params.request_timeout(), Duration::from_secs(60));
        assert_eq!(
            params.api_endpoint(),
            "https://us-central1-aiplatform.googleapis.com"
        );
    }

    #[test]
    fn test_humantime_timeout() {
        let params = parse(&["--project-id", "p", "--request-timeout", "2m"]);
        assert_eq!(params.request_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_api_endpoint_override() {
        let params = parse(&[
            "--project-id",
            "p",
            "--vertex-api-endpoint",
            "http://localhost:9000",
        ]);
        assert_eq!(params.api_endpoint(), "http://localhost:9000/");
    }

    #[test]
    fn test_build_service_uses_configured_defaults() {
        let params = parse(&[
            "--project-id",
            "p",
            "--default-model-id",
            "gemma-7b",
            "--vertex-access-token",
            "token",
        ]);

        let service = build_gateway_service(&params).unwrap();
        assert_eq!(service.defaults().model_id, "gemma-7b");
        assert_eq!(service.defaults().max_tokens, 4000);
    }

    #[test]
    fn test_rejects_blank_project_and_zero_timeout() {
        let blank = parse(&["--project-id", " "]);
        assert!(matches!(
            build_gateway_service(&blank),
            Err(CommonError::InvalidConfiguration { .. })
        ));

        let zero = parse(&["--project-id", "p", "--request-timeout", "0s"]);
        assert!(matches!(
            build_gateway_service(&zero),
            Err(CommonError::InvalidConfiguration { .. })
        ));
    }
}
