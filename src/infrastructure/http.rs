use crate::domain::{
    errors::FetchError,
    logging::{LogComponent, get_logger},
    market_data::{QueryRange, StockDataSource, StockQuery},
};
use futures::future::{FutureExt, LocalBoxFuture};
use gloo::net::http::Request;
use serde_json::Value;

/// HTTP client for the `/api/stock/{code}` endpoint
#[derive(Debug, Clone, Default)]
pub struct StockApiClient {
    base_url: String,
}

impl StockApiClient {
    /// An empty base URL targets the page's own origin.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into().trim_end_matches('/').to_string() }
    }

    pub fn url_for(&self, query: &StockQuery) -> String {
        let range = match &query.range {
            QueryRange::Period(period) => format!("period={}", period),
            QueryRange::Between { start, end } => format!("start={}&end={}", start, end),
        };
        format!("{}/api/stock/{}?{}", self.base_url, query.code, range)
    }

    pub async fn get_stock(&self, query: &StockQuery) -> Result<Value, FetchError> {
        let url = self.url_for(query);
        get_logger().info(
            LogComponent::Infrastructure("StockApiClient"),
            &format!("GET {}", url),
        );

        let response = Request::get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| FetchError::Transport(e.to_string()))?;

        if !response.ok() {
            return Err(status_error(status, &body, &response.status_text()));
        }

        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

/// Maps a non-2xx answer, preferring the server's `{"error": ...}` message.
pub fn status_error(status: u16, body: &str, status_text: &str) -> FetchError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| json.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| status_text.to_string());
    FetchError::Status { status, message }
}

impl StockDataSource for StockApiClient {
    fn fetch(&self, query: &StockQuery) -> LocalBoxFuture<'_, Result<Value, FetchError>> {
        let query = query.clone();
        async move { self.get_stock(&query).await }.boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market_data::{Period, StockCode};

    #[test]
    fn urls_carry_period_or_dates() {
        let client = StockApiClient::new("http://localhost:5000/");
        let code = StockCode::new("2330").unwrap();
        assert_eq!(
            client.url_for(&StockQuery::new(code.clone(), QueryRange::Period(Period::OneYear))),
            "http://localhost:5000/api/stock/2330?period=1y"
        );
        let range = QueryRange::between("2024-01-01", "2024-03-31").unwrap();
        assert_eq!(
            StockApiClient::default().url_for(&StockQuery::new(code, range)),
            "/api/stock/2330?start=2024-01-01&end=2024-03-31"
        );
    }

    #[test]
    fn error_bodies_are_surfaced() {
        assert_eq!(
            status_error(500, r#"{"error":"No data found"}"#, "Internal Server Error"),
            FetchError::Status { status: 500, message: "No data found".to_string() }
        );
        assert_eq!(
            status_error(502, "<html>", "Bad Gateway"),
            FetchError::Status { status: 502, message: "Bad Gateway".to_string() }
        );
    }
}
