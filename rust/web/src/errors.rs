//! Error responses for the hand API.
//!
//! Every failure a handler can hit implements [`IntoErrorResponse`], which
//! picks the HTTP status, a machine-readable code and the log level.
use handledger_engine::errors::{InputError, SettleError, Stage};
use handledger_engine::history::HistoryError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use thiserror::Error;
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::Reply;

/// Body of every non-2xx reply
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g. "hand_not_found")
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        error: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn into_response(self, status: StatusCode) -> Response {
        reply::with_status(reply::json(&self), status).into_response()
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Error classification for logging levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// 4xx, expected in normal operation
    Client,
    /// 5xx
    Server,
    /// Shared state is no longer trustworthy
    Critical,
}

pub trait IntoErrorResponse {
    fn status_code(&self) -> StatusCode;

    fn error_code(&self) -> &'static str;

    fn error_message(&self) -> String;

    fn error_details(&self) -> Option<serde_json::Value> {
        None
    }

    fn severity(&self) -> ErrorSeverity {
        if self.status_code().is_server_error() {
            ErrorSeverity::Server
        } else {
            ErrorSeverity::Client
        }
    }

    fn to_error_response(&self) -> ErrorResponse {
        match self.error_details() {
            Some(details) => {
                ErrorResponse::with_details(self.error_code(), self.error_message(), details)
            }
            None => ErrorResponse::new(self.error_code(), self.error_message()),
        }
    }

    /// Logs the error at its severity and renders the reply.
    fn into_http_response(self) -> Response
    where
        Self: Sized,
    {
        let status = self.status_code();
        let body = self.to_error_response();

        match self.severity() {
            ErrorSeverity::Client => tracing::info!(
                status = status.as_u16(),
                error = %body.error,
                detail = %body.message,
                "client error"
            ),
            ErrorSeverity::Server => tracing::error!(
                status = status.as_u16(),
                error = %body.error,
                detail = %body.message,
                "server error"
            ),
            ErrorSeverity::Critical => tracing::error!(
                status = status.as_u16(),
                error = %body.error,
                detail = %body.message,
                critical = true,
                "critical error"
            ),
        }

        body.into_response(status)
    }
}

impl IntoErrorResponse for SettleError {
    fn status_code(&self) -> StatusCode {
        match self {
            SettleError::Validation(_) | SettleError::Input(_) => StatusCode::BAD_REQUEST,
            SettleError::Engine { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            SettleError::Validation(_) => "invalid_action_sequence",
            SettleError::Input(_) => "inconsistent_hand",
            SettleError::Engine { .. } => "illegal_action",
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            SettleError::Engine { stage, .. } => Some(json!({ "stage": stage_name(*stage) })),
            _ => None,
        }
    }
}

fn stage_name(stage: Stage) -> &'static str {
    match stage {
        Stage::StateCreation => "state_creation",
        Stage::HoleCardDealing => "hole_card_dealing",
        Stage::ActionProcessing => "action_processing",
        Stage::PayoffExtraction => "payoff_extraction",
    }
}

impl IntoErrorResponse for HistoryError {
    fn status_code(&self) -> StatusCode {
        match self {
            HistoryError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            HistoryError::NotFound(_) => "hand_not_found",
            HistoryError::Duplicate(_) => "duplicate_hand",
            HistoryError::StoragePoisoned => "storage_poisoned",
            HistoryError::Storage(_) => "storage_error",
            HistoryError::Serialization(_) => "serialization_error",
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            HistoryError::NotFound(_) => ErrorSeverity::Client,
            HistoryError::StoragePoisoned => ErrorSeverity::Critical,
            _ => ErrorSeverity::Server,
        }
    }
}

/// Anything a hand endpoint can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("malformed request body: {0}")]
    MalformedBody(#[from] serde_json::Error),
    #[error("invalid hand: {0}")]
    Schema(#[from] InputError),
    #[error("hand `{0}` not found")]
    UnknownId(String),
    #[error(transparent)]
    Settle(#[from] SettleError),
    #[error(transparent)]
    History(#[from] HistoryError),
}

impl IntoErrorResponse for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MalformedBody(_) | ApiError::Schema(_) => StatusCode::BAD_REQUEST,
            ApiError::UnknownId(_) => StatusCode::NOT_FOUND,
            ApiError::Settle(err) => err.status_code(),
            ApiError::History(err) => err.status_code(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ApiError::MalformedBody(_) => "invalid_request",
            ApiError::Schema(_) => "invalid_hand",
            ApiError::UnknownId(_) => "hand_not_found",
            ApiError::Settle(err) => err.error_code(),
            ApiError::History(err) => err.error_code(),
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::MalformedBody(err) => Some(json!({
                "line": err.line(),
                "column": err.column(),
            })),
            ApiError::Settle(err) => err.error_details(),
            _ => None,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            ApiError::History(err) => err.severity(),
            _ if self.status_code().is_server_error() => ErrorSeverity::Server,
            _ => ErrorSeverity::Client,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handledger_engine::errors::{EngineError, ValidationError};
    use uuid::Uuid;

    #[test]
    fn error_response_serialization() {
        let error = ErrorResponse::new("hand_not_found", "hand abc not found");
        let json = serde_json::to_value(&error).expect("serialize");

        assert_eq!(json["error"], "hand_not_found");
        assert_eq!(json["message"], "hand abc not found");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn settle_errors_map_to_client_statuses() {
        let invalid = SettleError::Validation(ValidationError::Empty);
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.error_code(), "invalid_action_sequence");

        let illegal = SettleError::Engine {
            stage: Stage::ActionProcessing,
            source: EngineError::NeedlessFold(0),
        };
        assert_eq!(illegal.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = illegal.to_error_response();
        assert_eq!(body.details, Some(json!({"stage": "action_processing"})));
        assert!(body.message.contains("action processing"));
    }

    #[test]
    fn history_errors_map_to_404_and_500() {
        let missing = HistoryError::NotFound(Uuid::nil());
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(missing.severity(), ErrorSeverity::Client);

        assert_eq!(
            HistoryError::StoragePoisoned.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(HistoryError::StoragePoisoned).severity(),
            ErrorSeverity::Critical
        );
    }

    #[test]
    fn logged_event_keeps_its_own_message() {
        use crate::logging::TestLogSubscriber;
        use tracing::Level;

        let logs = TestLogSubscriber::new();
        let _guard = logs.set_default();
        let response = ApiError::UnknownId("hand-1".into()).into_http_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let entries = logs.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, Level::INFO);
        assert_eq!(entries[0].message, "client error");
        assert_eq!(entries[0].field("detail"), Some("hand `hand-1` not found"));
        assert_eq!(entries[0].field("error"), Some("hand_not_found"));
    }

    #[test]
    fn malformed_body_reports_position() {
        let err = serde_json::from_str::<serde_json::Value>("{\n  \"a\": }").unwrap_err();
        let api = ApiError::from(err);
        assert_eq!(api.status_code(), StatusCode::BAD_REQUEST);
        let details = api.error_details().unwrap();
        assert_eq!(details["line"], 2);
    }
}
