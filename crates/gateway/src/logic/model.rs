use tracing::{debug, info};

use crate::backend::{InferenceBackendLike, ModelEndpoint};
use crate::error::GatewayError;

/// Picks the newest endpoint deployed under `model_id`. Resolved fresh on
/// every call.
pub async fn resolve_model<B: InferenceBackendLike + ?Sized>(
    backend: &B,
    model_id: &str,
) -> Result<ModelEndpoint, GatewayError> {
    debug!("Resolving endpoint for model '{}'", model_id);

    let endpoints = backend.list_endpoints(model_id).await.map_err(|e| {
        GatewayError::upstream("Failed to look up the requested model", e)
    })?;

    let Some(endpoint) = endpoints.into_iter().next() else {
        return Err(GatewayError::model_not_found(model_id));
    };

    info!(
        "Resolved model '{}' to endpoint {} (created {})",
        model_id, endpoint.id, endpoint.create_time
    );
    Ok(endpoint)
}
