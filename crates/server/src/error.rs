use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use marquee_core::error::{ApiError, ErrorEnvelope};
use marquee_metadata::MetadataError;
use tracing::warn;

/// Newtype wrapper so we can implement `IntoResponse` in this crate.
#[derive(Debug)]
pub struct AppError(pub ApiError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let envelope = ErrorEnvelope::from(&self.0);
        (status, Json(envelope)).into_response()
    }
}

impl From<ApiError> for AppError {
    fn from(e: ApiError) -> Self {
        Self(e)
    }
}

impl From<MetadataError> for AppError {
    fn from(e: MetadataError) -> Self {
        let message = e.to_string();
        let api = match e {
            MetadataError::NotFound => ApiError::NotFound("title not found".into()),
            MetadataError::InvalidInput(msg) => ApiError::BadRequest(msg),
            MetadataError::Status {
                provider,
                status,
                body,
            } => {
                // The upstream body stays in the logs; clients get provider and status.
                warn!(%provider, status, body = %body, "upstream call failed");
                ApiError::Upstream {
                    status: Some(status),
                    message: format!("{provider} returned {status}"),
                }
            }
            MetadataError::Network { .. }
            | MetadataError::Decode { .. }
            | MetadataError::Empty(_) => ApiError::Upstream {
                status: None,
                message,
            },
            MetadataError::NotConfigured(_) => ApiError::Configuration(message),
            MetadataError::Db(err) => ApiError::Internal(format!("database error: {err}")),
        };
        Self(api)
    }
}
