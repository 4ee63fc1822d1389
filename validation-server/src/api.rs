use std::collections::HashMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use feature_flags::flag_matching::FlagMatch;

/// A verdict rejection is a normal response, not an HTTP error; only
/// malformed requests map to error statuses here.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("failed to decode request: {0}")]
    RequestDecodingError(String),
    #[error("failed to parse request: {0}")]
    RequestParsingError(#[from] serde_json::Error),

    #[error("request submitted without a player id")]
    MissingPlayerId,
    #[error("session contains negative counters")]
    NegativeCounters,

    #[error("input timeline exceeds maximum length")]
    InputTimelineTooLong,
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        match self {
            ValidationError::RequestDecodingError(_)
            | ValidationError::RequestParsingError(_)
            | ValidationError::MissingPlayerId
            | ValidationError::NegativeCounters => (StatusCode::BAD_REQUEST, self.to_string()),

            ValidationError::InputTimelineTooLong => {
                (StatusCode::PAYLOAD_TOO_LARGE, self.to_string())
            }
        }
        .into_response()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagsResponse {
    pub feature_flags: HashMap<String, FlagMatch>,
    // kept for wire compat with the browser client; evaluation is total
    pub error_while_computing_flags: bool,
}
