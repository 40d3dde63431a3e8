use serde::Serialize;
use thiserror::Error;

/// Unified API error type.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// An essential upstream call failed. `status` mirrors the provider's
    /// response when it sent one.
    #[error("upstream unavailable: {message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::NotFound(_) => "not_found",
            Self::Upstream { .. } => "upstream_unavailable",
            Self::Configuration(_) => "configuration_error",
            Self::Internal(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::NotFound(_) => 404,
            Self::Upstream { status, .. } => match status {
                Some(s) if (400..=599).contains(s) => *s,
                _ => 502,
            },
            Self::Configuration(_) => 503,
            Self::Internal(_) => 500,
        }
    }
}

/// JSON error envelope: `{ "error": { "code": "…", "message": "…", "details": {} } }`
#[derive(Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub details: serde_json::Value,
}

impl From<&ApiError> for ErrorEnvelope {
    fn from(e: &ApiError) -> Self {
        let details = match e {
            ApiError::Upstream {
                status: Some(status),
                ..
            } => serde_json::json!({ "upstream_status": status }),
            _ => serde_json::Value::Object(serde_json::Map::new()),
        };
        Self {
            error: ErrorBody {
                code: e.code().to_string(),
                message: e.to_string(),
                details,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_status_is_mirrored_when_it_is_an_error_status() {
        let e = ApiError::Upstream {
            status: Some(401),
            message: "TMDB returned 401".into(),
        };
        assert_eq!(e.status_code(), 401);
        assert_eq!(e.code(), "upstream_unavailable");

        let unreachable = ApiError::Upstream {
            status: None,
            message: "connection refused".into(),
        };
        assert_eq!(unreachable.status_code(), 502);

        let odd = ApiError::Upstream {
            status: Some(204),
            message: "empty".into(),
        };
        assert_eq!(odd.status_code(), 502);
    }

    #[test]
    fn envelope_carries_code_and_upstream_status() {
        let e = ApiError::Upstream {
            status: Some(503),
            message: "TMDB returned 503".into(),
        };
        let json = serde_json::to_value(ErrorEnvelope::from(&e)).unwrap();
        assert_eq!(json["error"]["code"], "upstream_unavailable");
        assert_eq!(json["error"]["details"]["upstream_status"], 503);

        let nf = ApiError::NotFound("movie not found".into());
        let json = serde_json::to_value(ErrorEnvelope::from(&nf)).unwrap();
        assert_eq!(json["error"]["code"], "not_found");
        assert_eq!(json["error"]["details"], serde_json::json!({}));
    }
}
