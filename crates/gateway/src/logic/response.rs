// Success and error envelopes returned to the caller
use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::error::{GatewayError, GatewayErrorKind};
use crate::logic::cors::ResponseCors;
use crate::logic::prediction::PredictionResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CompletionResponse {
    pub completion: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<PredictionResult> for CompletionResponse {
    fn from(result: PredictionResult) -> Self {
        Self {
            completion: result.completion_text,
            model: result.model_id,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self.kind() {
            GatewayErrorKind::Validation => warn!("Rejected request: {}", self.detail()),
            GatewayErrorKind::NotFound | GatewayErrorKind::Upstream => {
                error!("Request failed: {}", self.detail())
            }
        }

        let status = self.status_code();
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}

pub fn format_response(
    result: Result<PredictionResult, GatewayError>,
    cors: &ResponseCors,
) -> Response {
    let mut response = match result {
        Ok(result) => (StatusCode::OK, Json(CompletionResponse::from(result))).into_response(),
        Err(e) => e.into_response(),
    };

    cors.apply(response.headers_mut());
    response
}

#[cfg(test)]
mod unit_test {
    use super::*;
    use http::header::ACCESS_CONTROL_ALLOW_ORIGIN;
    use serde_json::{Value, json};

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_success_envelope() {
        let response = format_response(
            Ok(PredictionResult {
                completion_text: "Q".to_string(),
                model_id: "X".to_string(),
            }),
            &ResponseCors::default(),
        );

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(body_json(response).await, json!({"completion": "Q", "model": "X"}));
    }

    #[tokio::test]
    async fn test_error_envelopes() {
        shared::setup_test!();

        let cases = [
            (GatewayError::validation("No prompt provided"), StatusCode::BAD_REQUEST),
            (
                GatewayError::model_not_found("X"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                GatewayError::upstream("The inference backend request failed", anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            let message = err.to_string();
            let response = format_response(Err(err), &ResponseCors::default());

            assert_eq!(response.status(), status);
            assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
            assert_eq!(body_json(response).await, json!({ "error": message }));
        }
    }
}
