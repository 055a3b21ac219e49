use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::state::AppState;

/// Static pages and the status endpoint. The HTML lives in `templates/` and
/// is compiled into the binary.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(home))
        .route("/ui", get(ui))
        .route("/error", get(error_page))
        .route("/error/date-format", get(date_format_error))
        .route("/error/date-order", get(date_order_error))
}

async fn home() -> Json<Value> {
    Json(json!({
        "message": "Financial data service is running",
        "usage": "/download?ticker=AAPL&start=2020-01-01&end=2023-01-01",
    }))
}

async fn ui() -> Html<&'static str> {
    Html(include_str!("../../templates/index.html"))
}

async fn error_page() -> Html<&'static str> {
    Html(include_str!("../../templates/error.html"))
}

async fn date_format_error() -> Html<&'static str> {
    Html(include_str!("../../templates/error_date_format.html"))
}

async fn date_order_error() -> Html<&'static str> {
    Html(include_str!("../../templates/error_date_order.html"))
}
