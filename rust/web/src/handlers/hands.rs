use std::convert::Infallible;
use std::sync::Arc;

use handledger_engine::engine::NoLimitHoldem;
use handledger_engine::events::TracingSink;
use handledger_engine::history::HandRepository;
use handledger_engine::record::{process_hand, HandInput, HandRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::reply::{self, Response};
use warp::{Filter, Rejection, Reply};

use crate::errors::{ApiError, IntoErrorResponse};

const MAX_BODY_BYTES: u64 = 64 * 1024;

#[derive(Debug, Serialize, Deserialize)]
pub struct HandListResponse {
    pub hands: Vec<HandRecord>,
}

/// POST /hands
/// Settles the submitted hand and stores the record
pub fn create_hand(
    history: Arc<dyn HandRepository>,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path!("hands")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::bytes())
        .and(with_history(history))
        .and_then(|body: Bytes, history: Arc<dyn HandRepository>| async move {
            let result = record_hand(&body, history.as_ref());
            Ok::<_, Infallible>(respond(result, StatusCode::CREATED))
        })
}

/// GET /hands
pub fn list_hands(
    history: Arc<dyn HandRepository>,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path!("hands")
        .and(warp::get())
        .and(with_history(history))
        .and_then(|history: Arc<dyn HandRepository>| async move {
            let result = history
                .fetch_all()
                .map(|hands| HandListResponse { hands })
                .map_err(ApiError::from);
            Ok::<_, Infallible>(respond(result, StatusCode::OK))
        })
}

/// GET /hands/:id
pub fn get_hand(
    history: Arc<dyn HandRepository>,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path!("hands" / String)
        .and(warp::get())
        .and(with_history(history))
        .and_then(|id: String, history: Arc<dyn HandRepository>| async move {
            let result = find_hand(&id, history.as_ref());
            Ok::<_, Infallible>(respond(result, StatusCode::OK))
        })
}

fn with_history(
    history: Arc<dyn HandRepository>,
) -> impl Filter<Extract = (Arc<dyn HandRepository>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&history))
}

fn respond<T: Serialize>(result: Result<T, ApiError>, status: StatusCode) -> Response {
    match result {
        Ok(body) => reply::with_status(reply::json(&body), status).into_response(),
        Err(err) => err.into_http_response(),
    }
}

/// Parses, settles and stores one hand.
///
/// Nothing is stored unless settlement succeeds.
pub fn record_hand(body: &[u8], history: &dyn HandRepository) -> Result<HandRecord, ApiError> {
    let input: HandInput = serde_json::from_slice(body)?;
    input.check_schema()?;
    debug!(
        players = input.stack_settings.len(),
        sequence = %input.action_sequence,
        "settling submitted hand"
    );

    let record = process_hand::<NoLimitHoldem>(input, &mut TracingSink)?;
    let stored = history.store(record)?;
    info!(hand_id = %stored.id, "hand recorded");
    Ok(stored)
}

fn find_hand(id: &str, history: &dyn HandRepository) -> Result<HandRecord, ApiError> {
    let id: Uuid = id.parse().map_err(|_| ApiError::UnknownId(id.to_string()))?;
    Ok(history.fetch_by_id(&id)?)
}
