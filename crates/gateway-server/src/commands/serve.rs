use shared::error::CommonError;
use tracing::info;

use crate::config::{ServeParams, build_gateway_service};
use crate::server::{
    GRACEFUL_SHUTDOWN_TIMEOUT, StartAxumServerParams, shutdown_signal, start_axum_server,
};

pub async fn cmd_serve(params: ServeParams) -> Result<(), CommonError> {
    info!(
        "Configuring gateway for project '{}' in {} (environment: {})",
        params.project_id, params.region, params.environment
    );

    let gateway_service = build_gateway_service(&params)?;

    let (server_fut, handle, addr) = start_axum_server(StartAxumServerParams {
        host: params.host.clone(),
        port: params.port,
        gateway_service,
    })
    .await?;

    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutting down server, waiting for in-flight requests to complete...");
        handle.graceful_shutdown(Some(GRACEFUL_SHUTDOWN_TIMEOUT));
    });

    info!("Listening on http://{}", addr);
    server_fut.await?;
    info!("Server shut down gracefully");

    Ok(())
}
