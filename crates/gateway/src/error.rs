use http::StatusCode;
use thiserror::Error;

use crate::backend::BackendError;

/// Discriminant of [`GatewayError`], handy for assertions and log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    Validation,
    NotFound,
    Upstream,
}

/// Request-scoped failure of the completion pipeline.
///
/// `msg` is the text returned to the caller. Anything that may leak backend
/// internals goes into `source`, which is only ever logged.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("{msg}")]
    Validation { msg: String },
    #[error("{msg}")]
    NotFound {
        msg: String,
        lookup_id: String,
        #[source]
        source: Option<anyhow::Error>,
    },
    #[error("{msg}")]
    Upstream {
        msg: String,
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl GatewayError {
    pub fn validation(msg: impl Into<String>) -> Self {
        GatewayError::Validation { msg: msg.into() }
    }

    pub fn model_not_found(model_id: &str) -> Self {
        GatewayError::NotFound {
            msg: format!("No deployed endpoint found for model '{model_id}'"),
            lookup_id: model_id.to_string(),
            source: None,
        }
    }

    pub fn upstream(msg: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        GatewayError::Upstream {
            msg: msg.into(),
            source: Some(source.into()),
        }
    }

    pub fn kind(&self) -> GatewayErrorKind {
        match self {
            GatewayError::Validation { .. } => GatewayErrorKind::Validation,
            GatewayError::NotFound { .. } => GatewayErrorKind::NotFound,
            GatewayError::Upstream { .. } => GatewayErrorKind::Upstream,
        }
    }

    /// Resolution failures are reported as server errors, same as any other
    /// upstream failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Validation { .. } => StatusCode::BAD_REQUEST,
            GatewayError::NotFound { .. } | GatewayError::Upstream { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Full diagnostic text including the source chain. Never sent to clients.
    pub fn detail(&self) -> String {
        let mut detail = self.to_string();
        let mut current = std::error::Error::source(self);
        while let Some(cause) = current {
            detail.push_str(": ");
            detail.push_str(&cause.to_string());
            current = cause.source();
        }
        detail
    }
}

impl From<BackendError> for GatewayError {
    fn from(e: BackendError) -> Self {
        GatewayError::upstream("The inference backend request failed", e)
    }
}

#[cfg(test)]
mod unit_test {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            GatewayError::validation("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::model_not_found("m").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            GatewayError::from(BackendError::Auth("expired".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_backend_detail_is_kept_out_of_message() {
        let err = GatewayError::from(BackendError::Api {
            status: StatusCode::TOO_MANY_REQUESTS,
            body: "quota exceeded for project secret-project".to_string(),
        });

        assert_eq!(err.kind(), GatewayErrorKind::Upstream);
        assert!(!err.to_string().contains("secret-project"));
        assert!(err.detail().contains("secret-project"));
    }
}
