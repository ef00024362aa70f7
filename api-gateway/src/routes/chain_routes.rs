//! Full-chain inspection and inbound block broadcasts.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use chain::{Block, BlockOutcome};

use crate::state::SharedState;

/// `GET /chain`: the full local chain.
pub async fn get_chain(State(state): State<SharedState>) -> Json<Vec<Block>> {
    let engine = state.engine.lock().await;
    Json(engine.chain().to_vec())
}

#[derive(Deserialize)]
pub struct BroadcastBlockRequest {
    pub block: Block,
}

/// `POST /broadcast-block`: admits a block a peer mined, mapping the
/// outcome onto the 201/200/409 contract peers rely on to tell "accepted"
/// from "I'm behind" from "rejected".
pub async fn broadcast_block(
    State(state): State<SharedState>,
    Json(body): Json<BroadcastBlockRequest>,
) -> StatusCode {
    let mut engine = state.engine.lock().await;
    match engine.add_block(body.block) {
        Ok(BlockOutcome::Appended) => StatusCode::CREATED,
        Ok(BlockOutcome::Deferred) => StatusCode::OK,
        Ok(BlockOutcome::Rejected) => StatusCode::CONFLICT,
        Err(e) => {
            tracing::error!(error = %e, "failed to process inbound block");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
