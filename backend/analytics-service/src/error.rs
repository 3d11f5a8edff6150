use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// Failure modes of the analytics surface.
///
/// Validation variants carry the offending input so the 400 body is
/// self-explanatory. Infrastructure variants map to 500 and only ever
/// surface from the read endpoints; the tracking path absorbs them before
/// they can reach a response.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("events must contain between 1 and {max} items, got {got}")]
    BatchSize { got: usize, max: usize },

    #[error("limit must be between 1 and {max}, got {got}")]
    LimitOutOfRange { got: i64, max: i64 },

    #[error("{0} is required")]
    MissingParam(&'static str),

    #[error("{0} must be a valid UUID")]
    MalformedId(&'static str),

    #[error("manga {0} not found")]
    MangaNotFound(Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("cover storage error: {0}")]
    CoverStorage(String),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ResponseError for AnalyticsError {
    fn status_code(&self) -> StatusCode {
        match self {
            AnalyticsError::BatchSize { .. }
            | AnalyticsError::LimitOutOfRange { .. }
            | AnalyticsError::MissingParam(_)
            | AnalyticsError::MalformedId(_) => StatusCode::BAD_REQUEST,
            AnalyticsError::MangaNotFound(_) => StatusCode::NOT_FOUND,
            AnalyticsError::Database(_)
            | AnalyticsError::Redis(_)
            | AnalyticsError::CoverStorage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let code = self.status_code();
        HttpResponse::build(code).json(ErrorResponse {
            error: self.to_string(),
            code: code.as_u16(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_failures_are_client_errors() {
        assert_eq!(
            AnalyticsError::BatchSize { got: 51, max: 50 }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AnalyticsError::LimitOutOfRange { got: 0, max: 50 }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AnalyticsError::MissingParam("device_id").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AnalyticsError::MalformedId("manga_id").status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn unknown_subjects_are_not_found() {
        assert_eq!(
            AnalyticsError::MangaNotFound(Uuid::nil()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn infrastructure_failures_are_server_errors() {
        assert_eq!(
            AnalyticsError::Database(sqlx::Error::PoolTimedOut).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AnalyticsError::CoverStorage("signing failed".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_messages_name_the_offending_input() {
        let err = AnalyticsError::BatchSize { got: 51, max: 50 };
        assert_eq!(
            err.to_string(),
            "events must contain between 1 and 50 items, got 51"
        );

        let err = AnalyticsError::LimitOutOfRange { got: -3, max: 50 };
        assert_eq!(err.to_string(), "limit must be between 1 and 50, got -3");
    }
}
