use crate::{
    application::render_adapter::{RenderAdapter, ZoomResetHandle},
    config::ChartConfig,
    domain::{
        chart::{ChartLayout, ChartModelBuilder, DisplayParams, SharedZoom, SurfaceProvider, ZoomController},
        errors::{AppError, ConfigurationError, FetchError},
        history::HistoryStore,
        logging::LogComponent,
        market_data::{ChartDataset, MarketOutlook, PayloadValidator, QueryRange, StockCode, StockQuery},
    },
    infrastructure::ui::UiNotificationProvider,
};
use crate::{log_debug, log_info, log_warn};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// Issued per outgoing request; only the latest one is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    id: u64,
    pub query: StockQuery,
}

impl RequestTicket {
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// What happened to a completed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    Applied,
    /// A newer request was issued meanwhile; the response was dropped.
    Stale,
}

/// The dataset currently on screen and where it came from
#[derive(Debug, Clone)]
struct LoadedChart {
    code: StockCode,
    dataset: Rc<ChartDataset>,
    layout: Rc<ChartLayout>,
}

/// Application service for one chart on one page.
///
/// Owns the display parameters, the dataset on screen, the history list and
/// the render adapter. Failures are reported through the notifier exactly
/// once and leave the previous chart displayed.
pub struct ChartSession {
    config: ChartConfig,
    builder: ChartModelBuilder,
    params: DisplayParams,
    range: QueryRange,
    current: Option<LoadedChart>,
    zoom: SharedZoom,
    adapter: Rc<RefCell<RenderAdapter>>,
    history: HistoryStore,
    notifier: Box<dyn UiNotificationProvider>,
    issued: u64,
}

impl ChartSession {
    pub fn new(
        config: ChartConfig,
        notifier: Box<dyn UiNotificationProvider>,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let builder = config.model_builder()?;
        let zoom = ZoomController::shared();
        let adapter = Rc::new(RefCell::new(RenderAdapter::new(Rc::clone(&zoom))));
        Ok(Self {
            builder,
            params: DisplayParams::default(),
            range: QueryRange::Period(config.default_period),
            current: None,
            zoom,
            adapter,
            history: HistoryStore::new(config.history_capacity),
            notifier,
            issued: 0,
            config,
        })
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn params(&self) -> &DisplayParams {
        &self.params
    }

    pub fn range(&self) -> &QueryRange {
        &self.range
    }

    pub fn set_range(&mut self, range: QueryRange) {
        self.range = range;
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn zoom(&self) -> SharedZoom {
        Rc::clone(&self.zoom)
    }

    pub fn adapter(&self) -> Rc<RefCell<RenderAdapter>> {
        Rc::clone(&self.adapter)
    }

    pub fn reset_handle(&self) -> ZoomResetHandle {
        ZoomResetHandle::new(Rc::clone(&self.adapter))
    }

    pub fn layout(&self) -> Option<Rc<ChartLayout>> {
        self.current.as_ref().map(|loaded| Rc::clone(&loaded.layout))
    }

    pub fn dataset(&self) -> Option<Rc<ChartDataset>> {
        self.current.as_ref().map(|loaded| Rc::clone(&loaded.dataset))
    }

    pub fn current_code(&self) -> Option<&StockCode> {
        self.current.as_ref().map(|loaded| &loaded.code)
    }

    pub fn outlook(&self) -> Option<MarketOutlook> {
        self.current.as_ref().map(|loaded| MarketOutlook::assess(&loaded.dataset))
    }

    /// Raises one notification for `error` and hands it back.
    pub fn report(&self, error: impl Into<AppError>) -> AppError {
        let error = error.into();
        self.notifier.notify_error(&error);
        error
    }

    /// Query for `code` over the session's current range.
    pub fn query_for(&self, code: &str) -> Result<StockQuery, AppError> {
        let code = StockCode::new(code).map_err(|e| self.report(e))?;
        Ok(StockQuery::new(code, self.range.clone()))
    }

    pub fn begin_query(&mut self, query: StockQuery) -> RequestTicket {
        self.issued += 1;
        log_debug!(
            LogComponent::Application("ChartSession"),
            "request #{} for {}",
            self.issued,
            query.code
        );
        RequestTicket { id: self.issued, query }
    }

    pub fn is_latest(&self, ticket: &RequestTicket) -> bool {
        ticket.id == self.issued
    }

    /// Applies a fetched payload if `ticket` is still the latest request.
    pub fn complete_query(
        &mut self,
        ticket: &RequestTicket,
        payload: Result<Value, FetchError>,
    ) -> Result<QueryOutcome, AppError> {
        if !self.is_latest(ticket) {
            log_info!(
                LogComponent::Application("ChartSession"),
                "dropping stale response #{} for {} (latest is #{})",
                ticket.id,
                ticket.query.code,
                self.issued
            );
            return Ok(QueryOutcome::Stale);
        }

        let payload = payload.map_err(|e| self.report(e))?;
        let validator = PayloadValidator::requiring(self.params.active_indicators().iter().copied());
        let dataset = validator.validate(&payload).map_err(|e| self.report(e))?;
        self.notifier.clear_notifications();

        if self.config.reset_zoom_on_new_query {
            self.zoom.borrow_mut().reset_all();
        }

        let code = ticket.query.code.clone();
        self.history.record(code.clone(), dataset.display_name(&code).to_string());
        let dataset = Rc::new(dataset);
        let layout = Rc::new(self.builder.build_for(&code, &dataset, &self.params));
        log_info!(
            LogComponent::Application("ChartSession"),
            "loaded {} ({} sessions)",
            layout.title,
            dataset.len()
        );
        self.current = Some(LoadedChart { code, dataset, layout: Rc::clone(&layout) });
        self.push_layout(layout)?;
        Ok(QueryOutcome::Applied)
    }

    /// Replaces the display parameters and rebuilds the chart on screen.
    pub fn set_display_params(&mut self, params: DisplayParams) -> Result<(), AppError> {
        self.params = params;
        self.rebuild()
    }

    pub fn set_volume_scale(&mut self, percent: u32) -> Result<(), AppError> {
        let params = self.params.clone().with_volume_scale(percent).map_err(|e| self.report(e))?;
        self.set_display_params(params)
    }

    pub fn set_indicators<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), AppError> {
        let params = DisplayParams::from_names(self.params.volume_scale_percent(), names)
            .map_err(|e| self.report(e))?;
        self.set_display_params(params)
    }

    pub fn set_moving_average(&mut self, days: u32) -> Result<(), AppError> {
        let params = self.params.clone().with_moving_average(days).map_err(|e| self.report(e))?;
        self.set_display_params(params)
    }

    /// Query to submit when a history entry is picked; `None` for codes
    /// that are not in the history.
    pub fn select_history(&self, code: &str) -> Option<StockQuery> {
        let code = StockCode::new(code).ok()?;
        let entry = self.history.get(&code)?;
        Some(StockQuery::new(entry.code.clone(), self.range.clone()))
    }

    pub fn attach(&mut self, provider: Box<dyn SurfaceProvider>) -> Result<(), AppError> {
        self.adapter.borrow_mut().attach(provider).map_err(|e| self.report(e))
    }

    pub fn detach(&mut self) {
        self.adapter.borrow_mut().detach();
    }

    fn rebuild(&mut self) -> Result<(), AppError> {
        let Some(current) = self.current.as_mut() else {
            return Ok(());
        };
        let layout = Rc::new(self.builder.build_for(&current.code, &current.dataset, &self.params));
        current.layout = Rc::clone(&layout);
        self.push_layout(layout)
    }

    fn push_layout(&mut self, layout: Rc<ChartLayout>) -> Result<(), AppError> {
        let rendered = self.adapter.borrow_mut().render(layout);
        rendered.map_err(|e| {
            log_warn!(LogComponent::Application("ChartSession"), "render failed: {}", e);
            self.report(e)
        })
    }
}
