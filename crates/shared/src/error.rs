use thiserror::Error;

/// Errors raised while bootstrapping and running the process: configuration,
/// sockets, client construction. Request-scoped failures have their own type in
/// the gateway crate.
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("invalid configuration: {msg}")]
    InvalidConfiguration {
        msg: String,
        #[source]
        source: Option<anyhow::Error>,
    },
    #[error("io error")]
    IoError {
        #[from]
        #[source]
        source: std::io::Error,
    },
    #[error("address parse error")]
    AddrParseError {
        #[from]
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("serde json error")]
    SerdeSerializationError {
        #[from]
        #[source]
        source: serde_json::Error,
    },
    #[error("reqwest error")]
    ReqwestError {
        #[from]
        #[source]
        source: reqwest::Error,
    },
}

impl CommonError {
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        CommonError::InvalidConfiguration {
            msg: msg.into(),
            source: None,
        }
    }
}
