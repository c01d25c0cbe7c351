use axum::Router;
use tower_http::trace::TraceLayer;
use utoipa::openapi::{Info, OpenApi, tag::TagBuilder};

pub mod gateway;

pub use gateway::{GatewayService, SERVICE_ROUTE_KEY, create_router, route_method_not_allowed};

pub fn initiate_router(gateway_service: GatewayService) -> Router {
    let (router, _) = create_router().split_for_parts();
    router
        .with_state(gateway_service)
        .method_not_allowed_fallback(route_method_not_allowed)
        .layer(TraceLayer::new_for_http())
}

pub fn generate_openapi_spec() -> OpenApi {
    let (_, mut spec) = create_router().split_for_parts();

    let mut info = Info::new(
        "inference-gateway",
        "Single-endpoint HTTP gateway for text generation on managed model endpoints",
    );
    info.version = env!("CARGO_PKG_VERSION").to_string();
    spec.info = info;

    spec.tags = Some(vec![
        TagBuilder::new()
            .name(SERVICE_ROUTE_KEY)
            .description(Some("Text completion against a named model endpoint"))
            .build(),
        TagBuilder::new()
            .name("_internal")
            .description(Some("Liveness probe for the hosting platform"))
            .build(),
    ]);

    spec
}
