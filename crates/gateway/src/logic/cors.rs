use axum::{
    body::Body,
    response::{IntoResponse, Response},
};
use http::{
    HeaderMap, HeaderValue, Method, StatusCode,
    header::{
        ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
        ACCESS_CONTROL_MAX_AGE,
    },
};

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "POST";
pub const ALLOW_HEADERS: &str = "Content-Type";
pub const MAX_AGE_SECONDS: &str = "3600";

/// What the CORS policy decided for an incoming request.
pub enum CorsDecision {
    /// Preflight probe, answered right away. Nothing else runs.
    Preflight(Response),
    /// Regular request; the eventual response must carry these headers.
    Proceed(ResponseCors),
}

/// Headers every non-preflight response has to carry.
#[derive(Debug, Clone)]
pub struct ResponseCors {
    allow_origin: HeaderValue,
}

impl ResponseCors {
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin.clone());
    }
}

impl Default for ResponseCors {
    fn default() -> Self {
        Self {
            allow_origin: HeaderValue::from_static(ALLOW_ORIGIN),
        }
    }
}

pub fn evaluate_cors(method: &Method) -> CorsDecision {
    if *method == Method::OPTIONS {
        CorsDecision::Preflight(preflight_response())
    } else {
        CorsDecision::Proceed(ResponseCors::default())
    }
}

fn preflight_response() -> Response {
    let mut response = (StatusCode::NO_CONTENT, Body::empty()).into_response();
    let headers = response.headers_mut();
    headers.insert(
        ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ORIGIN),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(
        ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static(MAX_AGE_SECONDS),
    );
    response
}

#[cfg(test)]
mod unit_test {
    use super::*;

    #[tokio::test]
    async fn test_preflight_response() {
        let CorsDecision::Preflight(response) = evaluate_cors(&Method::OPTIONS) else {
            panic!("OPTIONS must be answered as a preflight");
        };

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let headers = response.headers();
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], "POST");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
        assert_eq!(headers[ACCESS_CONTROL_MAX_AGE], "3600");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(body.is_empty());
    }

    #[test]
    fn test_other_methods_proceed_with_allow_origin() {
        for method in [Method::POST, Method::GET, Method::PUT] {
            let CorsDecision::Proceed(cors) = evaluate_cors(&method) else {
                panic!("{method} must not be treated as a preflight");
            };

            let mut headers = HeaderMap::new();
            cors.apply(&mut headers);
            assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
            assert!(headers.get(ACCESS_CONTROL_ALLOW_METHODS).is_none());
        }
    }
}
