use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every tailoring failure aborts the whole request; there is no partial
/// success. Variants carrying `details` surface diagnostics (renderer output,
/// file listings, offending YAML) to the caller.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    MissingInput(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("ANTHROPIC_API_KEY not configured")]
    MissingCredential,

    #[error("{0}")]
    TemplateNotFound(String),

    #[error("Text generation failed: {0}")]
    Generation(String),

    #[error("Generated {document} is not valid YAML: {message}")]
    MalformedGeneratedYaml {
        document: &'static str,
        message: String,
        excerpt: String,
    },

    #[error("Failed to render {document}")]
    Render { document: &'static str, details: Value },

    #[error("{message}")]
    ArtifactNotFound { message: String, details: Value },

    #[error("Failed to build archive: {0}")]
    Archive(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::MissingInput(_) => (StatusCode::BAD_REQUEST, "MISSING_INPUT"),
            AppError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            AppError::MissingCredential => {
                (StatusCode::INTERNAL_SERVER_ERROR, "MISSING_CREDENTIAL")
            }
            AppError::TemplateNotFound(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "TEMPLATE_NOT_FOUND")
            }
            AppError::Generation(_) => (StatusCode::INTERNAL_SERVER_ERROR, "GENERATION_FAILURE"),
            AppError::MalformedGeneratedYaml { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "MALFORMED_GENERATED_YAML")
            }
            AppError::Render { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "RENDER_FAILURE"),
            AppError::ArtifactNotFound { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "ARTIFACT_NOT_FOUND")
            }
            AppError::Archive(_) => (StatusCode::INTERNAL_SERVER_ERROR, "ARCHIVE_FAILURE"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            AppError::MalformedGeneratedYaml {
                document, excerpt, ..
            } => Some(json!({ "document": document, "yaml": excerpt })),
            AppError::Render { details, .. } | AppError::ArtifactNotFound { details, .. } => {
                Some(details.clone())
            }
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal server error occurred".to_string()
            }
            AppError::MissingInput(_) | AppError::InvalidInput(_) => self.to_string(),
            other => {
                tracing::error!("Tailoring failed: {other}");
                other.to_string()
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(details) = self.details() {
            body["details"] = details;
        }

        (status, Json(body)).into_response()
    }
}
