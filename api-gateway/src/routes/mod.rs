//! HTTP facade: translates the node's endpoints into engine/wallet calls.
//!
//! No blockchain logic lives here; every handler's job is to parse the
//! request, call into `chain`, and shape the response.

pub mod chain_routes;
pub mod mining;
pub mod nodes;
pub mod transactions;
pub mod ui;
pub mod wallet;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::SharedState;

/// Builds the full node router.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(ui::index))
        .route("/network", get(ui::network))
        .route("/wallet", post(wallet::create_wallet).get(wallet::load_wallet))
        .route("/balance", get(wallet::balance))
        .route("/transaction", post(transactions::submit_transaction))
        .route("/broadcast-transaction", post(transactions::broadcast_transaction))
        .route("/transactions", get(transactions::list_transactions))
        .route("/mine", post(mining::mine))
        .route("/resolve-conflicts", post(mining::resolve_conflicts))
        .route("/chain", get(chain_routes::get_chain))
        .route("/broadcast-block", post(chain_routes::broadcast_block))
        .route("/node", post(nodes::add_node))
        .route("/node/{url}", delete(nodes::remove_node))
        .route("/nodes", get(nodes::list_nodes))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    use chain::hashing::{hash_block, proof_of_work};
    use chain::{Block, BlockchainEngine, ConsensusConfig, FileChainStore, HttpBroadcaster, NodeConfig, Wallet};

    use crate::state::{AppState, SharedState};

    use super::build_router;

    /// A router backed by a freshly initialised engine and an empty wallet,
    /// persisting to a scratch directory that is cleaned up when `dir` drops.
    fn test_state(dir: &tempfile::TempDir) -> SharedState {
        let mut config = NodeConfig::for_port(15001);
        config.data_dir = dir.path().to_path_buf();

        let store = FileChainStore::new(config.chain_path());
        let broadcaster = HttpBroadcaster::new(Duration::from_secs(1)).unwrap();
        let engine = BlockchainEngine::new(config.consensus.clone(), store, broadcaster, Vec::new());

        Arc::new(AppState {
            engine: Mutex::new(engine),
            wallet: Mutex::new(Wallet::new()),
            config,
        })
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str) -> Request<Body> {
        Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, json: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(json).unwrap()))
            .unwrap()
    }

    #[tokio::test]
    async fn get_chain_starts_at_genesis() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(&dir));

        let response = app.oneshot(get("/chain")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn wallet_create_then_balance_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(&dir));

        let response = app.clone().oneshot(post("/wallet")).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["funds"], 0.0);
        assert!(!body["public_key"].as_str().unwrap().is_empty());

        let response = app.oneshot(get("/balance")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["funds"], 0.0);
    }

    #[tokio::test]
    async fn wallet_load_reads_persisted_keys() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(&dir));

        let response = app.clone().oneshot(post("/wallet")).await.unwrap();
        let created = body_json(response).await;

        let response = app
            .oneshot(Request::builder().method("GET").uri("/wallet").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let loaded = body_json(response).await;
        assert_eq!(loaded["public_key"], created["public_key"]);
    }

    #[tokio::test]
    async fn balance_without_wallet_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(&dir));

        let response = app.oneshot(get("/balance")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn submit_transaction_requires_a_wallet() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(&dir));

        let response = app
            .oneshot(post_json(
                "/transaction",
                &serde_json::json!({ "recipient": "bob-key", "amount": 1.0 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn submit_transaction_rejects_insufficient_funds() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(&dir));

        let response = app.clone().oneshot(post("/wallet")).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(post_json(
                "/transaction",
                &serde_json::json!({ "recipient": "bob-key", "amount": 5.0 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn mine_pays_reward_to_own_wallet() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(&dir));

        let response = app.clone().oneshot(post("/wallet")).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app.clone().oneshot(post("/mine")).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["funds"], 10.0);

        let response = app.oneshot(get("/balance")).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["funds"], 10.0);
    }

    #[tokio::test]
    async fn mine_without_wallet_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(&dir));

        let response = app.oneshot(post("/mine")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn broadcast_transaction_admits_without_rebroadcast_and_is_listed() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(&dir));

        let response = app.clone().oneshot(post("/wallet")).await.unwrap();
        let wallet_body = body_json(response).await;
        let sender = wallet_body["public_key"].as_str().unwrap().to_string();
        let private_key = wallet_body["private_key"].as_str().unwrap().to_string();

        let response = app.clone().oneshot(post("/mine")).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        // Re-derive the signing wallet from the keys the facade just
        // returned, as if this were the peer that originally signed it.
        let wallet_file = dir.path().join("peer-wallet.txt");
        std::fs::write(&wallet_file, format!("{sender}\n{private_key}\n")).unwrap();
        let mut wallet = Wallet::new();
        wallet.load_keys(&wallet_file).unwrap();
        let signature = wallet.sign_transaction(&sender, "bob-key", 3.0).unwrap();

        let response = app
            .clone()
            .oneshot(post_json(
                "/broadcast-transaction",
                &serde_json::json!({
                    "sender": sender,
                    "recipient": "bob-key",
                    "amount": 3.0,
                    "signature": signature,
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app.oneshot(get("/transactions")).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn node_add_list_and_remove_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(&dir));

        let response = app
            .clone()
            .oneshot(post_json("/node", &serde_json::json!({ "node": "127.0.0.1:5002" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app.clone().oneshot(get("/nodes")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["all_nodes"], serde_json::json!(["127.0.0.1:5002"]));

        let response = app
            .oneshot(Request::builder().method("DELETE").uri("/node/127.0.0.1:5002").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn resolve_conflicts_without_peers_keeps_local_chain() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(&dir));

        let response = app.oneshot(post("/resolve-conflicts")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], "our chain is authoritative");
    }

    /// The resolve-flag protocol depends entirely on this three-way split:
    /// a peer tells 201 (accepted) from 200 (I'm behind, go resolve) from
    /// 409 (rejected) purely by status code.
    #[tokio::test]
    async fn broadcast_block_status_codes_cover_appended_deferred_and_rejected() {
        let difficulty = ConsensusConfig::default().pow_difficulty;
        let genesis = Block::genesis();
        let last_hash = hash_block(&genesis);

        // Appended: a valid successor to genesis.
        {
            let dir = tempfile::tempdir().unwrap();
            let app = build_router(test_state(&dir));
            let proof = proof_of_work(&[], &last_hash, difficulty);
            let block = Block {
                index: 1,
                previous_hash: last_hash.clone(),
                timestamp: 1,
                transactions: Vec::new(),
                proof,
            };
            let response = app
                .oneshot(post_json("/broadcast-block", &serde_json::json!({ "block": block })))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        // Deferred: far ahead of the local tip, resolution is needed.
        {
            let dir = tempfile::tempdir().unwrap();
            let app = build_router(test_state(&dir));
            let block = Block {
                index: 5,
                previous_hash: "whatever".to_string(),
                timestamp: 1,
                transactions: Vec::new(),
                proof: 1,
            };
            let response = app
                .oneshot(post_json("/broadcast-block", &serde_json::json!({ "block": block })))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        // Rejected: right index, but the proof doesn't satisfy the difficulty.
        {
            let dir = tempfile::tempdir().unwrap();
            let app = build_router(test_state(&dir));
            let block = Block {
                index: 1,
                previous_hash: last_hash.clone(),
                timestamp: 1,
                transactions: Vec::new(),
                proof: 0,
            };
            let response = app
                .oneshot(post_json("/broadcast-block", &serde_json::json!({ "block": block })))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CONFLICT);
        }
    }
}
