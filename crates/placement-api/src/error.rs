//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Domain errors
//! (`PublishError`, `IntakeError`, `StoreError`) convert through `AppError`, so
//! status, body and log level all come from `ErrorMetadata`.

use axum::{
    extract::multipart::MultipartError,
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use placement_core::{AppError, ErrorMetadata, LogLevel};
use placement_db::StoreError;
use placement_services::{IntakeError, PublishError};
use serde::{de::DeserializeOwned, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

impl ErrorResponse {
    fn from_app_error(error: &AppError, with_details: bool) -> Self {
        Self {
            error: error.client_message(),
            details: with_details.then(|| error.detailed_message()),
            error_type: with_details.then(|| error.error_type().to_string()),
            code: error.error_code().to_string(),
            recoverable: error.is_recoverable(),
            suggested_action: error.suggested_action().map(String::from),
        }
    }
}

/// Wrapper type for AppError to implement IntoResponse
/// (IntoResponse and AppError are both foreign to this crate).
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<PublishError> for HttpAppError {
    fn from(err: PublishError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<IntakeError> for HttpAppError {
    fn from(err: IntakeError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<StoreError> for HttpAppError {
    fn from(err: StoreError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<MultipartError> for HttpAppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return HttpAppError(AppError::PayloadTooLarge(
                "Request body exceeds the upload limit".to_string(),
            ));
        }
        HttpAppError(AppError::InvalidInput(format!(
            "Failed to read multipart body: {}",
            err.body_text()
        )))
    }
}

/// Convert JSON body deserialization failures into a 400 with our ErrorResponse format.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// JSON body extractor that returns our ErrorResponse format (400 + JSON) on deserialization failure.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(
                error = %error.detailed_message(),
                error_type = error_type,
                "Error occurred"
            );
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // Server-side detail stays in the logs for sensitive errors and in production
        let with_details = !is_production_env() && !app_error.is_sensitive();
        let body = ErrorResponse::from_app_error(app_error, with_details);

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use placement_core::Violations;

    #[test]
    fn test_from_publish_error_validation() {
        let err = PublishError::Validation(Violations::single(
            "githubLink",
            "must be a GitHub repository URL",
        ));
        let HttpAppError(app_err) = err.into();
        match app_err {
            AppError::Validation(msg) => assert!(msg.contains("githubLink")),
            other => panic!("Expected Validation variant, got {:?}", other),
        }
    }

    #[test]
    fn test_from_intake_error_too_large() {
        let HttpAppError(app_err) = IntakeError::FileTooLarge {
            max_bytes: 5 * 1024 * 1024,
        }
        .into();
        assert_eq!(app_err.http_status_code(), 413);
        assert!(app_err.client_message().contains("5 MB"));
    }

    #[test]
    fn test_from_store_error_not_found() {
        let id = uuid::Uuid::new_v4();
        let HttpAppError(app_err) = StoreError::NotFound(id).into();
        assert_eq!(app_err.http_status_code(), 404);
    }

    #[test]
    fn test_sensitive_errors_hide_details() {
        let err = AppError::Persistence("connection reset by db-primary".to_string());
        let body = ErrorResponse::from_app_error(&err, !err.is_sensitive());
        assert_eq!(body.error, "Failed to save the record");
        assert!(body.details.is_none());
        assert!(body.error_type.is_none());
        assert!(body.recoverable);
    }

    #[test]
    fn test_error_response_shape() {
        let err = AppError::NotFound("Resource not found".to_string());
        let body = ErrorResponse::from_app_error(&err, true);
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["error"], "Resource not found");
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["errorType"], "NotFound");
        assert_eq!(json["recoverable"], false);
        assert!(json.get("suggestedAction").is_some());
    }
}
