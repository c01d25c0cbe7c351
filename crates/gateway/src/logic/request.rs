// Parsing and validation of the inbound completion payload
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use utoipa::ToSchema;

use crate::error::GatewayError;

/// Documented shape of the request body. Parsing goes through
/// [`validate_request`] so that wrong shapes surface as validation errors.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompletionRequest {
    /// Text to complete
    pub prompt: String,
    /// Maximum number of tokens to generate, defaults to 4000
    pub max_tokens: Option<u32>,
    /// Sampling temperature, defaults to 0.7
    pub temperature: Option<f64>,
    /// Display name of the deployed model endpoint
    pub model_id: Option<String>,
}

/// Optional fields exactly as they arrived. `null` counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawOptionalFields {
    #[serde(default)]
    pub max_tokens: Option<Value>,
    #[serde(default)]
    pub temperature: Option<Value>,
    #[serde(default)]
    pub model_id: Option<Value>,
}

/// Output of validation: a guaranteed non-empty prompt, nothing defaulted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceRequestDraft {
    pub prompt: String,
    pub optional: RawOptionalFields,
}

pub fn validate_request(body: &[u8]) -> Result<InferenceRequestDraft, GatewayError> {
    debug!("Validating completion request ({} bytes)", body.len());

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(GatewayError::validation("Request body is required"));
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|_| GatewayError::validation("Request body must be valid JSON"))?;

    let Value::Object(mut fields) = value else {
        return Err(GatewayError::validation("Request body must be a JSON object"));
    };

    let prompt = match fields.remove("prompt") {
        Some(Value::String(prompt)) if !prompt.is_empty() => prompt,
        Some(Value::String(_)) | Some(Value::Null) | None => {
            return Err(GatewayError::validation("No prompt provided"));
        }
        Some(_) => {
            return Err(GatewayError::validation("'prompt' must be a string"));
        }
    };

    let optional: RawOptionalFields = serde_json::from_value(Value::Object(fields))
        .map_err(|_| GatewayError::validation("Request body must be a JSON object"))?;

    Ok(InferenceRequestDraft { prompt, optional })
}
