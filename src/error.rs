use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::views;

/// Message shown on an error page, attached to the response so the locale
/// layer can render the page again in the request's language.
#[derive(Debug, Clone)]
pub struct ErrorMessage(pub String);

const FALLBACK_LOCALE: &str = "en";

// Application-wide error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A unique column already holds the value; carries the column name.
    #[error("Duplicate value for {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Storage and internal details stay in the log, never in the page
        let message = match &self {
            AppError::DatabaseError(msg) => {
                tracing::error!("Database failure: {}", msg);
                "A database error occurred".to_string()
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal failure: {}", msg);
                "An internal server error occurred".to_string()
            }
            AppError::ValidationError(msg) | AppError::AuthError(msg) => {
                tracing::debug!("Request rejected: {}", msg);
                msg.clone()
            }
            AppError::NotFound(resource) => {
                tracing::debug!("Resource not found: {}", resource);
                format!("{} not found", resource)
            }
            AppError::Conflict(field) => {
                tracing::debug!("Duplicate value for {}", field);
                format!("This {} is already in use", field)
            }
        };

        let mut response = (status, Html(views::error_page(FALLBACK_LOCALE, status, &message))).into_response();
        response.extensions_mut().insert(ErrorMessage(message));
        response
    }
}

// Convenient Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::not_found("Word").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::AuthError("bad".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::DatabaseError("down".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Conflict("email".into()).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_database_details_are_not_rendered() {
        let response = AppError::DatabaseError("password=hunter2".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let ErrorMessage(message) = response.extensions().get::<ErrorMessage>().unwrap();
        assert_eq!(message, "A database error occurred");
    }
}
