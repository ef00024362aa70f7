//! Static HTML UI. Out of scope beyond serving these two pages: no
//! client-side logic lives in this repo.

use axum::response::Html;

/// `GET /`: the wallet/mining console.
pub async fn index() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}

/// `GET /network`: the peer-list console.
pub async fn network() -> Html<&'static str> {
    Html(include_str!("../../static/network.html"))
}
