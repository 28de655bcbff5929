use crate::domain::errors::FetchError;
use crate::domain::market_data::StockQuery;
use futures::future::LocalBoxFuture;
use serde_json::Value;

/// Source of raw chart payloads for one instrument query.
///
/// The payload is returned unvalidated; callers run it through the
/// `PayloadValidator`.
pub trait StockDataSource {
    fn fetch(&self, query: &StockQuery) -> LocalBoxFuture<'_, Result<Value, FetchError>>;
}
