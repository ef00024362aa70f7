//! Mining and conflict resolution endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use crate::state::SharedState;

fn message(msg: impl Into<String>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": msg.into() }))
}

#[derive(Serialize)]
struct MineResponse {
    message: String,
    block: chain::Block,
    funds: f64,
}

/// `POST /mine`: mines a block paying the reward to this node's own
/// wallet. Refused while a resolution is pending.
pub async fn mine(State(state): State<SharedState>) -> (StatusCode, Json<serde_json::Value>) {
    let wallet = state.wallet.lock().await;
    let Some(miner_key) = wallet.public_key().map(str::to_string) else {
        return (StatusCode::INTERNAL_SERVER_ERROR, message("no wallet set up"));
    };
    drop(wallet);

    let mut engine = state.engine.lock().await;
    if engine.resolve_pending() {
        return (StatusCode::CONFLICT, message("resolve pending, mining refused"));
    }

    match engine.mine_block(&miner_key) {
        Ok(block) => {
            let funds = engine.get_balance(&miner_key);
            (
                StatusCode::CREATED,
                Json(
                    serde_json::to_value(MineResponse {
                        message: "new block forged".to_string(),
                        block,
                        funds,
                    })
                    .unwrap(),
                ),
            )
        }
        Err(e) => {
            tracing::warn!(error = %e, "mining failed");
            (StatusCode::INTERNAL_SERVER_ERROR, message(e.to_string()))
        }
    }
}

/// `POST /resolve-conflicts`: pulls every peer's chain and adopts the
/// longest valid one.
pub async fn resolve_conflicts(State(state): State<SharedState>) -> Json<serde_json::Value> {
    let mut engine = state.engine.lock().await;
    let replaced = match engine.resolve() {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, "resolution failed");
            return message("resolution failed");
        }
    };
    if replaced {
        message("our chain was replaced")
    } else {
        message("our chain is authoritative")
    }
}
