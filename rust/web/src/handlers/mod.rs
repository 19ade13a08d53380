pub mod hands;

pub use hands::{create_hand, get_hand, list_hands, HandListResponse};

/// Liveness check body.
pub fn health() -> warp::reply::Json {
    warp::reply::json(&serde_json::json!({ "status": "ok" }))
}
