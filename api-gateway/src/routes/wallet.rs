//! Wallet endpoints: key creation/loading and balance queries.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use chain::Wallet;

use crate::state::SharedState;

#[derive(Serialize)]
pub struct WalletResponse {
    public_key: String,
    private_key: String,
    funds: f64,
}

fn error(message: impl Into<String>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": message.into() }))
}

/// `POST /wallet`: generates a fresh keypair, persists it, and returns it
/// along with the new key's (zero) balance.
pub async fn create_wallet(State(state): State<SharedState>) -> (StatusCode, Json<serde_json::Value>) {
    let mut wallet = Wallet::new();
    if let Err(e) = wallet.create_keys() {
        tracing::error!(error = %e, "failed to generate wallet keys");
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(serde_json::json!({"message": e.to_string()})));
    }
    if let Err(e) = wallet.save_keys(&state.config.wallet_path()) {
        tracing::error!(error = %e, "failed to save wallet keys");
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(serde_json::json!({"message": e.to_string()})));
    }

    let funds = {
        let engine = state.engine.lock().await;
        engine.get_balance(wallet.public_key().expect("just generated"))
    };
    let response = WalletResponse {
        public_key: wallet.public_key().unwrap().to_string(),
        private_key: wallet.private_key().unwrap().to_string(),
        funds,
    };
    tracing::info!("wallet created");
    *state.wallet.lock().await = wallet;
    (StatusCode::CREATED, Json(serde_json::to_value(response).unwrap()))
}

/// `GET /wallet`: loads the keypair from disk, replacing any in-memory
/// keypair, and returns it (201, matching the source's non-idiomatic but
/// protocol-normative status code for this GET).
pub async fn load_wallet(State(state): State<SharedState>) -> (StatusCode, Json<serde_json::Value>) {
    let mut wallet = Wallet::new();
    if let Err(e) = wallet.load_keys(&state.config.wallet_path()) {
        tracing::error!(error = %e, "failed to load wallet keys");
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(serde_json::json!({"message": e.to_string()})));
    }

    let funds = {
        let engine = state.engine.lock().await;
        engine.get_balance(wallet.public_key().expect("just loaded"))
    };
    let response = WalletResponse {
        public_key: wallet.public_key().unwrap().to_string(),
        private_key: wallet.private_key().unwrap().to_string(),
        funds,
    };
    tracing::info!("wallet loaded");
    *state.wallet.lock().await = wallet;
    (StatusCode::CREATED, Json(serde_json::to_value(response).unwrap()))
}

#[derive(Serialize)]
struct BalanceResponse {
    message: String,
    funds: f64,
}

/// `GET /balance`: returns this node's current balance.
pub async fn balance(State(state): State<SharedState>) -> (StatusCode, Json<serde_json::Value>) {
    let wallet = state.wallet.lock().await;
    let Some(public_key) = wallet.public_key() else {
        return (StatusCode::INTERNAL_SERVER_ERROR, error("no wallet set up"));
    };
    let funds = {
        let engine = state.engine.lock().await;
        engine.get_balance(public_key)
    };
    (
        StatusCode::OK,
        Json(serde_json::to_value(BalanceResponse {
            message: "fetched balance successfully".to_string(),
            funds,
        })
        .unwrap()),
    )
}
