mod common;

use common::{RecordingNotifier, payload};
use futures::channel::oneshot;
use futures::executor::block_on;
use futures::future::{FutureExt, LocalBoxFuture};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use stock_chart_wasm::application::{ChartSession, LoadChartUseCase, QueryOutcome};
use stock_chart_wasm::config::ChartConfig;
use stock_chart_wasm::domain::errors::{AppError, FetchError};
use stock_chart_wasm::domain::market_data::{StockDataSource, StockQuery};

type Reply = Result<Value, FetchError>;

/// Answers each request with the next queued reply once it is released.
#[derive(Clone, Default)]
struct QueuedSource {
    replies: Rc<RefCell<VecDeque<oneshot::Receiver<Reply>>>>,
    requests: Rc<RefCell<Vec<StockQuery>>>,
}

impl QueuedSource {
    fn push(&self) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.replies.borrow_mut().push_back(rx);
        tx
    }
}

impl StockDataSource for QueuedSource {
    fn fetch(&self, query: &StockQuery) -> LocalBoxFuture<'_, Result<Value, FetchError>> {
        self.requests.borrow_mut().push(query.clone());
        let reply = self.replies.borrow_mut().pop_front();
        async move {
            match reply {
                Some(reply) => reply
                    .await
                    .unwrap_or_else(|_| Err(FetchError::Transport("reply dropped".into()))),
                None => Err(FetchError::Transport("no reply queued".into())),
            }
        }
        .boxed_local()
    }
}

fn setup() -> (LoadChartUseCase<QueuedSource>, QueuedSource, RecordingNotifier) {
    let notifier = RecordingNotifier::default();
    let session = ChartSession::new(ChartConfig::default(), Box::new(notifier.clone())).unwrap();
    let source = QueuedSource::default();
    let use_case = LoadChartUseCase::new(source.clone(), Rc::new(RefCell::new(session)));
    (use_case, source, notifier)
}

#[test]
fn loads_a_code_end_to_end() {
    let (use_case, source, _) = setup();
    source.push().send(Ok(payload(4))).unwrap();

    let outcome = block_on(use_case.execute_code("2330"));

    assert_eq!(outcome, Ok(QueryOutcome::Applied));
    let session = use_case.session().borrow();
    assert_eq!(session.layout().unwrap().categories.len(), 4);
    assert_eq!(source.requests.borrow()[0].code.value(), "2330");
}

#[test]
fn slower_earlier_response_is_dropped() {
    let (use_case, source, _) = setup();
    let first_reply = source.push();
    let second_reply = source.push();

    let (first, second, ()) = block_on(async {
        futures::join!(use_case.execute_code("2330"), use_case.execute_code("2317"), async move {
            second_reply.send(Ok(payload(2))).unwrap();
            first_reply.send(Ok(payload(5))).unwrap();
        })
    });

    assert_eq!(first, Ok(QueryOutcome::Stale));
    assert_eq!(second, Ok(QueryOutcome::Applied));
    let session = use_case.session().borrow();
    assert_eq!(session.current_code().unwrap().value(), "2317");
    assert_eq!(session.history().codes(), vec!["2317"]);
}

#[test]
fn network_error_surfaces_once() {
    let (use_case, source, notifier) = setup();
    source.push().send(Err(FetchError::Transport("offline".into()))).unwrap();

    let outcome = block_on(use_case.execute_code("2330"));

    assert!(matches!(outcome, Err(AppError::Fetch(FetchError::Transport(_)))));
    assert_eq!(notifier.errors.borrow().len(), 1);
    assert!(use_case.session().borrow().layout().is_none());
}

#[test]
fn history_selection_refetches_known_codes_only() {
    let (use_case, source, _) = setup();
    source.push().send(Ok(payload(3))).unwrap();
    source.push().send(Ok(payload(3))).unwrap();
    block_on(use_case.execute_code("2330")).unwrap();
    block_on(use_case.execute_code("2317")).unwrap();

    source.push().send(Ok(payload(6))).unwrap();
    assert_eq!(block_on(use_case.execute_history("2330")), Ok(Some(QueryOutcome::Applied)));
    assert_eq!(block_on(use_case.execute_history("1101")), Ok(None));

    assert_eq!(source.requests.borrow().len(), 3);
    assert_eq!(use_case.session().borrow().history().codes(), vec!["2330", "2317"]);
}
