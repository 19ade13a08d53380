//! HTTP front end for the hand ledger.
//!
//! Routes: `POST /hands`, `GET /hands`, `GET /hands/{id}`, `GET /health`.

pub mod errors;
pub mod handlers;
pub mod logging;
pub mod server;

pub use errors::{ApiError, ErrorResponse, ErrorSeverity, IntoErrorResponse};
pub use logging::{init_logging, LogEntry, LogFormat, TestLogSubscriber};
pub use server::{AppContext, ServerConfig, ServerError, ServerHandle, WebServer};
