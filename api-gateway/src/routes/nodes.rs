//! Peer set management.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::state::SharedState;

#[derive(Deserialize)]
pub struct AddNodeRequest {
    pub node: String,
}

#[derive(Serialize)]
struct NodesResponse {
    message: String,
    all_nodes: Vec<String>,
}

fn error(message: impl Into<String>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": message.into() }))
}

/// `POST /node`: registers a peer URL.
pub async fn add_node(
    State(state): State<SharedState>,
    Json(body): Json<AddNodeRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    if body.node.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, error("no node supplied"));
    }
    let mut engine = state.engine.lock().await;
    engine.add_peer_node(body.node.clone());
    (
        StatusCode::CREATED,
        Json(
            serde_json::to_value(NodesResponse {
                message: "node added successfully".to_string(),
                all_nodes: engine.peers(),
            })
            .unwrap(),
        ),
    )
}

/// `DELETE /node/:url`: removes a peer URL.
pub async fn remove_node(
    State(state): State<SharedState>,
    Path(url): Path<String>,
) -> (StatusCode, Json<serde_json::Value>) {
    if url.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, error("no node supplied"));
    }
    let mut engine = state.engine.lock().await;
    engine.remove_peer_node(&url);
    (
        StatusCode::OK,
        Json(
            serde_json::to_value(NodesResponse {
                message: "node removed successfully".to_string(),
                all_nodes: engine.peers(),
            })
            .unwrap(),
        ),
    )
}

#[derive(Serialize)]
struct AllNodesResponse {
    all_nodes: Vec<String>,
}

/// `GET /nodes`: lists every registered peer.
pub async fn list_nodes(State(state): State<SharedState>) -> Json<serde_json::Value> {
    let engine = state.engine.lock().await;
    Json(
        serde_json::to_value(AllNodesResponse {
            all_nodes: engine.peers(),
        })
        .unwrap(),
    )
}
