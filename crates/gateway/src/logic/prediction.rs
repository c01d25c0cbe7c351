use serde_json::Value;
use tracing::info;

use crate::backend::{
    BackendError, InferenceBackendLike, ModelEndpoint, PredictionInstance, PredictionParameters,
};
use crate::error::GatewayError;
use crate::logic::params::InferenceRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionResult {
    pub completion_text: String,
    pub model_id: String,
}

/// Issues exactly one prediction call against `endpoint`. No retries.
pub async fn invoke_prediction<B: InferenceBackendLike + ?Sized>(
    backend: &B,
    endpoint: &ModelEndpoint,
    request: &InferenceRequest,
) -> Result<PredictionResult, GatewayError> {
    let instance = PredictionInstance {
        prompt: request.prompt.clone(),
    };
    let parameters = PredictionParameters {
        max_output_tokens: request.max_tokens,
        temperature: request.temperature,
    };

    info!(
        "Invoking prediction on endpoint {} (max_output_tokens={}, temperature={})",
        endpoint.id, parameters.max_output_tokens, parameters.temperature
    );

    let predictions = backend.predict(endpoint, &instance, &parameters).await?;

    let first = predictions.into_iter().next().ok_or_else(|| {
        BackendError::MalformedResponse("response contained no predictions".to_string())
    })?;

    Ok(PredictionResult {
        completion_text: completion_text(first)?,
        model_id: request.model_id.clone(),
    })
}

/// Text models answer with either a bare string or an object carrying
/// `content`.
fn completion_text(prediction: Value) -> Result<String, BackendError> {
    match prediction {
        Value::String(text) => Ok(text),
        Value::Object(mut fields) => match fields.remove("content") {
            Some(Value::String(text)) => Ok(text),
            _ => Err(BackendError::MalformedResponse(
                "prediction object has no string 'content'".to_string(),
            )),
        },
        other => Err(BackendError::MalformedResponse(format!(
            "unexpected prediction type: {other}"
        ))),
    }
}
