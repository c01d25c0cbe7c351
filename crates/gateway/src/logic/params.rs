use serde_json::Value;

use crate::error::GatewayError;
use crate::logic::request::InferenceRequestDraft;

pub const DEFAULT_MAX_TOKENS: u32 = 4000;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MODEL_ID: &str = "llama-3-1-8b-instruct";

/// Values substituted for optional request fields that were left out.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationDefaults {
    pub max_tokens: u32,
    pub temperature: f64,
    pub model_id: String,
}

impl Default for GenerationDefaults {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            model_id: DEFAULT_MODEL_ID.to_string(),
        }
    }
}

impl GenerationDefaults {
    pub fn with_model_id(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            ..Self::default()
        }
    }
}

/// Fully resolved, immutable inference request.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub model_id: String,
}

pub fn resolve_parameters(
    draft: InferenceRequestDraft,
    defaults: &GenerationDefaults,
) -> Result<InferenceRequest, GatewayError> {
    let InferenceRequestDraft { prompt, optional } = draft;

    let max_tokens = match optional.max_tokens {
        None => defaults.max_tokens,
        Some(value) => parse_max_tokens(&value)?,
    };

    // The provider owns the valid temperature range
    let temperature = match optional.temperature {
        None => defaults.temperature,
        Some(value) => value
            .as_f64()
            .ok_or_else(|| GatewayError::validation("'temperature' must be a number"))?,
    };

    let model_id = match optional.model_id {
        None => defaults.model_id.clone(),
        Some(Value::String(model_id)) if !model_id.is_empty() => model_id,
        Some(_) => {
            return Err(GatewayError::validation(
                "'model_id' must be a non-empty string",
            ));
        }
    };

    Ok(InferenceRequest {
        prompt,
        max_tokens,
        temperature,
        model_id,
    })
}

fn parse_max_tokens(value: &Value) -> Result<u32, GatewayError> {
    value
        .as_u64()
        .filter(|n| *n > 0)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| GatewayError::validation("'max_tokens' must be a positive integer"))
}

#[cfg(test)]
mod unit_test {
    use super::*;
    use crate::error::GatewayErrorKind;
    use crate::logic::request::validate_request;

    fn resolve(body: &str) -> Result<InferenceRequest, GatewayError> {
        let draft = validate_request(body.as_bytes()).unwrap();
        resolve_parameters(draft, &GenerationDefaults::default())
    }

    #[test]
    fn test_prompt_only_gets_defaults() {
        let request = resolve(r#"{"prompt": "Hello"}"#).unwrap();

        assert_eq!(request.prompt, "Hello");
        assert_eq!(request.max_tokens, 4000);
        assert_eq!(request.temperature, 0.7);
        assert_eq!(request.model_id, DEFAULT_MODEL_ID);
    }

    #[test]
    fn test_explicit_values_pass_through() {
        let request =
            resolve(r#"{"prompt": "P", "max_tokens": 10, "temperature": 0.2, "model_id": "X"}"#)
                .unwrap();

        assert_eq!(
            request,
            InferenceRequest {
                prompt: "P".to_string(),
                max_tokens: 10,
                temperature: 0.2,
                model_id: "X".to_string(),
            }
        );
    }

    #[test]
    fn test_integer_temperature_is_accepted() {
        let request = resolve(r#"{"prompt": "P", "temperature": 1}"#).unwrap();
        assert_eq!(request.temperature, 1.0);
    }

    #[test]
    fn test_temperature_range_is_not_enforced_locally() {
        let request = resolve(r#"{"prompt": "P", "temperature": 7.5}"#).unwrap();
        assert_eq!(request.temperature, 7.5);
    }

    #[test]
    fn test_wrong_shapes_fail_validation() {
        let cases = [
            r#"{"prompt": "P", "max_tokens": "10"}"#,
            r#"{"prompt": "P", "max_tokens": 0}"#,
            r#"{"prompt": "P", "max_tokens": -5}"#,
            r#"{"prompt": "P", "max_tokens": 12.5}"#,
            r#"{"prompt": "P", "max_tokens": 99999999999}"#,
            r#"{"prompt": "P", "temperature": "hot"}"#,
            r#"{"prompt": "P", "model_id": 3}"#,
            r#"{"prompt": "P", "model_id": ""}"#,
        ];

        for body in cases {
            let err = resolve(body).unwrap_err();
            assert_eq!(err.kind(), GatewayErrorKind::Validation, "{body}");
        }
    }

    #[test]
    fn test_configured_default_model() {
        let draft = validate_request(br#"{"prompt": "Hello"}"#).unwrap();
        let request =
            resolve_parameters(draft, &GenerationDefaults::with_model_id("gemma-7b")).unwrap();
        assert_eq!(request.model_id, "gemma-7b");
        assert_eq!(request.max_tokens, DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let draft = validate_request(br#"{"prompt": "Hello", "max_tokens": 5}"#).unwrap();
        let defaults = GenerationDefaults::default();

        let first = resolve_parameters(draft.clone(), &defaults).unwrap();
        let second = resolve_parameters(draft, &defaults).unwrap();
        assert_eq!(first, second);
    }
}
