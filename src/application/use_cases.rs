use crate::application::chart_service::{ChartSession, QueryOutcome};
use crate::domain::{
    errors::AppError,
    logging::{LogComponent, get_logger},
    market_data::{StockDataSource, StockQuery},
};
use std::cell::RefCell;
use std::rc::Rc;

/// Use Case: fetch one instrument and put it on the chart.
///
/// The session is only borrowed before and after the fetch, so other
/// requests and UI events can run while this one is in flight.
pub struct LoadChartUseCase<S: StockDataSource> {
    source: S,
    session: Rc<RefCell<ChartSession>>,
}

impl<S: StockDataSource> LoadChartUseCase<S> {
    pub fn new(source: S, session: Rc<RefCell<ChartSession>>) -> Self {
        Self { source, session }
    }

    pub fn session(&self) -> &Rc<RefCell<ChartSession>> {
        &self.session
    }

    pub async fn execute(&self, query: StockQuery) -> Result<QueryOutcome, AppError> {
        let ticket = self.session.borrow_mut().begin_query(query);
        get_logger().info(
            LogComponent::Application("LoadChart"),
            &format!("fetching {} (request #{})", ticket.query.code, ticket.id()),
        );

        let payload = self.source.fetch(&ticket.query).await;
        self.session.borrow_mut().complete_query(&ticket, payload)
    }

    /// Parses the raw code against the session's current range, then loads.
    pub async fn execute_code(&self, code: &str) -> Result<QueryOutcome, AppError> {
        let query = self.session.borrow().query_for(code)?;
        self.execute(query).await
    }

    /// Reloads an instrument picked from the history list.
    pub async fn execute_history(&self, code: &str) -> Result<Option<QueryOutcome>, AppError> {
        let query = self.session.borrow().select_history(code);
        match query {
            Some(query) => self.execute(query).await.map(Some),
            None => Ok(None),
        }
    }
}
