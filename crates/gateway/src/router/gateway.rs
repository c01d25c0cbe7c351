// Completion route and health probe
use std::{sync::Arc, time::Duration};

use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    response::{IntoResponse, Response},
    routing::options,
};
use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::backend::InferenceBackendLike;
use crate::error::GatewayError;
use crate::logic::{
    CompletionRequest, CompletionResponse, CorsDecision, ErrorResponse, GenerationDefaults,
    ResponseCors, evaluate_cors, format_response, generate_completion,
};

pub const SERVICE_ROUTE_KEY: &str = "completion";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Everything a request handler needs. Read-only once built; clones share
/// the same backend client.
#[derive(Clone)]
pub struct GatewayService {
    backend: Arc<dyn InferenceBackendLike>,
    defaults: Arc<GenerationDefaults>,
    request_timeout: Duration,
}

impl GatewayService {
    pub fn new(
        backend: Arc<dyn InferenceBackendLike>,
        defaults: GenerationDefaults,
        request_timeout: Duration,
    ) -> Self {
        Self {
            backend,
            defaults: Arc::new(defaults),
            request_timeout,
        }
    }

    pub fn backend(&self) -> &dyn InferenceBackendLike {
        self.backend.as_ref()
    }

    pub fn defaults(&self) -> &GenerationDefaults {
        &self.defaults
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

pub fn create_router() -> OpenApiRouter<GatewayService> {
    OpenApiRouter::new()
        .routes(routes!(route_generate_completion))
        .route("/", options(route_generate_completion))
        .routes(routes!(route_health))
}

#[utoipa::path(
    post,
    path = "/",
    tags = [SERVICE_ROUTE_KEY],
    request_body = CompletionRequest,
    responses(
        (status = 200, description = "Completion generated", body = CompletionResponse),
        (status = 400, description = "Bad Request", body = ErrorResponse),
        (status = 500, description = "Model not found or backend failure", body = ErrorResponse),
    ),
    summary = "Generate completion",
    description = "Resolve the newest endpoint deployed under model_id and run a single prediction for the prompt. OPTIONS on the same path answers CORS preflight probes.",
    operation_id = "generate-completion",
)]
async fn route_generate_completion(
    State(ctx): State<GatewayService>,
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let cors = match evaluate_cors(&method) {
        CorsDecision::Preflight(response) => {
            trace!("Answered CORS preflight");
            return response;
        }
        CorsDecision::Proceed(cors) => cors,
    };

    let body = match body {
        Ok(body) => body,
        Err(rejection) => return format_response(Err(unreadable_body(&rejection)), &cors),
    };

    info!("Handling {} completion request", method);

    let timeout = ctx.request_timeout();
    let result = tokio::time::timeout(
        timeout,
        generate_completion(ctx.backend(), ctx.defaults(), &body),
    )
    .await
    .unwrap_or_else(|_| {
        Err(GatewayError::upstream(
            "The request timed out",
            anyhow::anyhow!("completion pipeline exceeded {timeout:?}"),
        ))
    });

    format_response(result, &cors)
}

fn unreadable_body(rejection: &BytesRejection) -> GatewayError {
    warn!("Could not read request body: {}", rejection.body_text());
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        GatewayError::validation("Request body is too large")
    } else {
        GatewayError::validation("Request body could not be read")
    }
}

/// Answers a known path hit with an unsupported method. Carries the
/// allow-origin header like every other non-preflight response.
pub async fn route_method_not_allowed(method: Method) -> Response {
    debug!("Method {} not allowed", method);

    let mut response = (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse {
            error: format!("Method {method} is not allowed"),
        }),
    )
        .into_response();
    ResponseCors::default().apply(response.headers_mut());
    response
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[utoipa::path(
    get,
    path = "/health",
    tags = ["_internal"],
    responses(
        (status = 200, description = "Gateway is running", body = HealthResponse),
    ),
    summary = "Health check",
    description = "Liveness probe. Does not contact the inference backend.",
    operation_id = "health-check",
)]
async fn route_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
