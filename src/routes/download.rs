use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::AppError;
use crate::export;
use crate::provider::HistoryProvider;
use crate::state::AppState;

const DATE_FORMAT: &str = "%Y-%m-%d";

// ── Query params ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub ticker: String,
    pub start: String,
    pub end: String,
}

/// Which error page a rejected request is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPage {
    DateFormat,
    DateOrder,
    NoData,
}

impl ErrorPage {
    pub fn redirect_path(self) -> &'static str {
        match self {
            Self::DateFormat => "/error/date-format",
            Self::DateOrder => "/error/date-order",
            Self::NoData => "/error",
        }
    }
}

/// Result of the download path, before it becomes an HTTP response.
#[derive(Debug)]
pub enum DownloadOutcome {
    Redirect(ErrorPage),
    Csv { filename: String, body: Vec<u8> },
}

// ── Route definitions ────────────────────────────────────────────────────

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/download", get(download))
}

// ── Handlers ─────────────────────────────────────────────────────────────

async fn download(
    State(state): State<Arc<AppState>>,
    Query(q): Query<DownloadQuery>,
) -> Result<Response, AppError> {
    match prepare_download(state.provider.as_ref(), &q).await? {
        DownloadOutcome::Redirect(page) => {
            tracing::info!(
                ticker = %q.ticker,
                target = page.redirect_path(),
                "download rejected"
            );
            Ok(found(page.redirect_path()))
        }
        DownloadOutcome::Csv { filename, body } => Ok((
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename={filename}"),
                ),
            ],
            body,
        )
            .into_response()),
    }
}

/// The download path as a pure function over the provider capability:
/// validate dates, fetch, flatten hierarchical columns, serialize.
pub async fn prepare_download(
    provider: &dyn HistoryProvider,
    query: &DownloadQuery,
) -> Result<DownloadOutcome, AppError> {
    let start = NaiveDate::parse_from_str(&query.start, DATE_FORMAT);
    let end = NaiveDate::parse_from_str(&query.end, DATE_FORMAT);
    let (start, end) = match (start, end) {
        (Ok(s), Ok(e)) => (s, e),
        _ => return Ok(DownloadOutcome::Redirect(ErrorPage::DateFormat)),
    };

    if start >= end {
        return Ok(DownloadOutcome::Redirect(ErrorPage::DateOrder));
    }

    let mut table = provider.fetch(&query.ticker, start, end).await?;
    if table.is_empty() {
        return Ok(DownloadOutcome::Redirect(ErrorPage::NoData));
    }

    table.flatten_columns();
    let body = export::to_csv(&table)?;

    tracing::info!(
        ticker = %query.ticker,
        provider = provider.name(),
        rows = table.rows.len(),
        "serving csv download"
    );

    // Filename keeps the date strings as supplied, ticker uppercased.
    let filename = format!(
        "{}_{}_to_{}.csv",
        query.ticker.to_uppercase(),
        query.start,
        query.end
    );

    Ok(DownloadOutcome::Csv { filename, body })
}

fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
