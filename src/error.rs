use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Request-scoped failures. Scoring failures map to 400 on the assumption
/// that a nonzero exit from the script means the input curves were bad;
/// everything downstream of a successful script run is our fault and maps
/// to 500.
#[derive(Debug, Error)]
pub enum ScreenError {
    #[error("model '{requested}' is not supported; currently only '{supported}' is available")]
    UnsupportedModel { requested: String, supported: String },

    #[error("scoring process exited with status {status}")]
    ScoringFailed { status: i32 },

    #[error("could not decode scorer output: {0}")]
    Decode(String),

    #[error("scorer returned no records")]
    EmptyResult,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ResponseError for ScreenError {
    fn status_code(&self) -> StatusCode {
        match self {
            ScreenError::UnsupportedModel { .. } | ScreenError::ScoringFailed { .. } => {
                StatusCode::BAD_REQUEST
            }
            ScreenError::Decode(_) | ScreenError::EmptyResult | ScreenError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
