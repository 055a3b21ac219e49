//! Yahoo Finance v8 chart API client.
//!
//! Yahoo has no official API; the chart endpoint is the same one its own
//! frontend uses and can change shape without notice, so decoding failures
//! are reported as `MalformedResponse` rather than panicking.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use super::{Cell, ColumnLabel, HistoryProvider, PriceRow, PriceTable, ProviderError};
use crate::config::HubConfig;

// ── Chart API response shape ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartSeries>>,
    error: Option<ChartApiError>,
}

#[derive(Debug, Deserialize)]
struct ChartApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartSeries {
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<QuoteBlock>,
    adjclose: Option<Vec<AdjCloseBlock>>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseBlock {
    adjclose: Vec<Option<f64>>,
}

// ── Provider ─────────────────────────────────────────────────────────────

/// Daily OHLCV history from Yahoo's chart endpoint.
pub struct YahooProvider {
    client: reqwest::Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new(config: &HubConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.http_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.provider_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `period1`/`period2` are the UTC midnights of `start` and `end`, so the
    /// returned bars cover `[start, end)` like the original service.
    fn chart_url(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> String {
        let period1 = start
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or(0);
        let period2 = end
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or(0);
        format!(
            "{}/v8/finance/chart/{ticker}?period1={period1}&period2={period2}\
             &interval=1d&includeAdjustedClose=true",
            self.base_url
        )
    }

    fn build_table(ticker: &str, envelope: ChartEnvelope) -> Result<PriceTable, ProviderError> {
        let series = match envelope.chart.result.and_then(|mut r| {
            if r.is_empty() {
                None
            } else {
                Some(r.remove(0))
            }
        }) {
            Some(s) => s,
            None => {
                // An unknown ticker comes back as a "Not Found" chart error;
                // the handler treats an empty table as "no data".
                return match envelope.chart.error {
                    Some(err) if err.code == "Not Found" => Ok(PriceTable::empty()),
                    Some(err) => Err(ProviderError::MalformedResponse(format!(
                        "{}: {}",
                        err.code, err.description
                    ))),
                    None => Ok(PriceTable::empty()),
                };
            }
        };

        let timestamps = match series.timestamp {
            Some(ts) if !ts.is_empty() => ts,
            _ => return Ok(PriceTable::empty()),
        };

        let quote = series
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::MalformedResponse("no quote block".to_string()))?;

        let adj_closes = series
            .indicators
            .adjclose
            .and_then(|blocks| blocks.into_iter().next())
            .map(|b| b.adjclose);

        let key = Some(ticker.to_uppercase());
        let mut columns = vec![
            ColumnLabel::new("Open", key.clone()),
            ColumnLabel::new("High", key.clone()),
            ColumnLabel::new("Low", key.clone()),
            ColumnLabel::new("Close", key.clone()),
        ];
        if adj_closes.is_some() {
            columns.push(ColumnLabel::new("Adj Close", key.clone()));
        }
        columns.push(ColumnLabel::new("Volume", key));

        let mut rows = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| {
                    ProviderError::MalformedResponse(format!("invalid timestamp {ts}"))
                })?;

            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten();

            // Holidays and half-session gaps come back as all-null rows.
            if open.is_none()
                && high.is_none()
                && low.is_none()
                && close.is_none()
                && volume.is_none()
            {
                continue;
            }

            let float_cell = |v: Option<f64>| v.map(Cell::Float).unwrap_or(Cell::Empty);

            let mut cells = vec![
                float_cell(open),
                float_cell(high),
                float_cell(low),
                float_cell(close),
            ];
            if let Some(adj) = &adj_closes {
                cells.push(float_cell(adj.get(i).copied().flatten()));
            }
            cells.push(volume.map(Cell::Int).unwrap_or(Cell::Empty));

            rows.push(PriceRow { date, cells });
        }

        Ok(PriceTable { columns, rows })
    }
}

#[async_trait]
impl HistoryProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    async fn fetch(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceTable, ProviderError> {
        let url = self.chart_url(ticker, start, end);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            // Yahoo answers unknown symbols with a 404 carrying a chart
            // error body; both paths end up as an empty table.
            if let Ok(envelope) = resp.json::<ChartEnvelope>().await {
                return Self::build_table(ticker, envelope);
            }
            return Ok(PriceTable::empty());
        }
        if !status.is_success() {
            return Err(ProviderError::Status {
                code: status.as_u16(),
            });
        }

        let envelope: ChartEnvelope = resp
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        Self::build_table(ticker, envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ChartEnvelope {
        serde_json::from_str(json).expect("test JSON must deserialize")
    }

    const TWO_DAYS: &str = r#"{
        "chart": {
            "result": [{
                "timestamp": [1577923200, 1578009600],
                "indicators": {
                    "quote": [{
                        "open": [74.06, 74.29],
                        "high": [75.15, 75.14],
                        "low": [73.8, 74.13],
                        "close": [75.09, 74.36],
                        "volume": [135480400, 146322800]
                    }],
                    "adjclose": [{ "adjclose": [72.88, 72.17] }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn build_table_decodes_rows_in_order() {
        let table = YahooProvider::build_table("aapl", parse(TWO_DAYS)).unwrap();

        assert_eq!(table.rows.len(), 2);
        assert_eq!(
            table.rows[0].date,
            NaiveDate::from_ymd_opt(2020, 1, 2).unwrap()
        );
        assert_eq!(
            table.rows[1].date,
            NaiveDate::from_ymd_opt(2020, 1, 3).unwrap()
        );

        let fields: Vec<&str> = table.columns.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["Open", "High", "Low", "Close", "Adj Close", "Volume"]
        );
        assert!(table
            .columns
            .iter()
            .all(|c| c.key.as_deref() == Some("AAPL")));

        assert_eq!(table.rows[0].cells[0], Cell::Float(74.06));
        assert_eq!(table.rows[0].cells[5], Cell::Int(135480400));
    }

    #[test]
    fn build_table_skips_all_null_rows() {
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1577923200, 1578009600],
                    "indicators": {
                        "quote": [{
                            "open": [74.06, null],
                            "high": [75.15, null],
                            "low": [73.8, null],
                            "close": [75.09, null],
                            "volume": [135480400, null]
                        }]
                    }
                }],
                "error": null
            }
        }"#;

        let table = YahooProvider::build_table("AAPL", parse(json)).unwrap();
        assert_eq!(table.rows.len(), 1);
        // No adjclose block: the column set shrinks accordingly.
        let fields: Vec<&str> = table.columns.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, vec!["Open", "High", "Low", "Close", "Volume"]);
    }

    #[test]
    fn build_table_maps_not_found_to_empty() {
        let json = r#"{
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found" }
            }
        }"#;

        let table = YahooProvider::build_table("NOPE", parse(json)).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn build_table_reports_other_chart_errors() {
        let json = r#"{
            "chart": {
                "result": null,
                "error": { "code": "Bad Request", "description": "invalid period" }
            }
        }"#;

        let err = YahooProvider::build_table("AAPL", parse(json)).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[test]
    fn chart_url_covers_half_open_range() {
        let cfg = HubConfig::default();
        let provider = YahooProvider::new(&cfg).unwrap();
        let url = provider.chart_url(
            "AAPL",
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 5).unwrap(),
        );

        assert!(url.contains("/v8/finance/chart/AAPL?"));
        assert!(url.contains("period1=1577836800"));
        assert!(url.contains("period2=1578182400"));
        assert!(url.contains("interval=1d"));
    }
}
