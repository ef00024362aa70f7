//! Transaction submission, broadcast reception, and pool inspection.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use chain::EngineError;

use crate::state::SharedState;

#[derive(Deserialize)]
pub struct SubmitTransactionRequest {
    pub recipient: String,
    pub amount: f64,
}

#[derive(Deserialize)]
pub struct BroadcastTransactionRequest {
    pub sender: String,
    pub recipient: String,
    pub amount: f64,
    pub signature: String,
}

#[derive(Serialize)]
struct SubmitTransactionResponse {
    message: String,
    transaction: chain::Transaction,
    funds: f64,
}

fn message(msg: impl Into<String>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": msg.into() }))
}

/// `POST /transaction`: signs `{recipient, amount}` with this node's own
/// wallet and admits it into the open-transaction pool.
pub async fn submit_transaction(
    State(state): State<SharedState>,
    Json(body): Json<SubmitTransactionRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    let wallet = state.wallet.lock().await;
    let Some(sender) = wallet.public_key().map(str::to_string) else {
        return (StatusCode::BAD_REQUEST, message("no wallet set up"));
    };

    let signature = match wallet.sign_transaction(&sender, &body.recipient, body.amount) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "failed to sign transaction");
            return (StatusCode::INTERNAL_SERVER_ERROR, message(e.to_string()));
        }
    };
    drop(wallet);

    let mut engine = state.engine.lock().await;
    match engine.add_transaction(sender.clone(), body.recipient, body.amount, signature, false) {
        Ok(tx) => {
            let funds = engine.get_balance(&sender);
            (
                StatusCode::CREATED,
                Json(
                    serde_json::to_value(SubmitTransactionResponse {
                        message: "transaction successfully added to open transactions".to_string(),
                        transaction: tx,
                        funds,
                    })
                    .unwrap(),
                ),
            )
        }
        Err(e) => {
            tracing::warn!(error = %e, "transaction admission failed");
            (StatusCode::INTERNAL_SERVER_ERROR, message(e.to_string()))
        }
    }
}

/// `POST /broadcast-transaction`: admits a transaction a peer already
/// broadcast to us, without re-broadcasting it onward.
pub async fn broadcast_transaction(
    State(state): State<SharedState>,
    Json(body): Json<BroadcastTransactionRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    let mut engine = state.engine.lock().await;
    match engine.add_transaction(body.sender, body.recipient, body.amount, body.signature, true) {
        Ok(_) => (StatusCode::CREATED, message("successfully added transaction")),
        Err(EngineError::Validation(e)) => {
            tracing::warn!(error = %e, "declined broadcast transaction");
            (StatusCode::INTERNAL_SERVER_ERROR, message(e.to_string()))
        }
    }
}

/// `GET /transactions`: the open-transaction pool, in insertion order.
pub async fn list_transactions(State(state): State<SharedState>) -> Json<Vec<chain::Transaction>> {
    let engine = state.engine.lock().await;
    Json(engine.open_transactions().to_vec())
}
