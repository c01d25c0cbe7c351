// Completion pipeline: validate, resolve parameters, resolve model, predict

pub mod cors;
pub mod model;
pub mod params;
pub mod prediction;
pub mod request;
pub mod response;

pub use cors::*;
pub use model::*;
pub use params::*;
pub use prediction::*;
pub use request::*;
pub use response::*;

use std::fmt;

use tracing::debug;

use crate::backend::InferenceBackendLike;
use crate::error::GatewayError;

/// Non-terminal states a request moves through. Any of them may fail straight
/// into error formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Validating,
    ResolvingParameters,
    ResolvingModel,
    Invoking,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Validating => "validating",
            PipelineStage::ResolvingParameters => "resolving-parameters",
            PipelineStage::ResolvingModel => "resolving-model",
            PipelineStage::Invoking => "invoking",
        };
        f.write_str(name)
    }
}

fn at_stage<T>(
    stage: PipelineStage,
    result: Result<T, GatewayError>,
) -> Result<T, GatewayError> {
    if let Err(e) = &result {
        debug!("Pipeline failed while {}: {:?}", stage, e.kind());
    }
    result
}

/// Runs everything between the CORS check and response formatting for one
/// request body.
pub async fn generate_completion<B: InferenceBackendLike + ?Sized>(
    backend: &B,
    defaults: &GenerationDefaults,
    body: &[u8],
) -> Result<PredictionResult, GatewayError> {
    let draft = at_stage(PipelineStage::Validating, validate_request(body))?;

    let request = at_stage(
        PipelineStage::ResolvingParameters,
        resolve_parameters(draft, defaults),
    )?;

    let endpoint = at_stage(
        PipelineStage::ResolvingModel,
        resolve_model(backend, &request.model_id).await,
    )?;

    at_stage(
        PipelineStage::Invoking,
        invoke_prediction(backend, &endpoint, &request).await,
    )
}
