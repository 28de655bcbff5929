use crate::{
    application::{ChartSession, LoadChartUseCase, QueryOutcome, ZoomReset},
    config::ChartConfig,
    domain::{
        errors::{AppError, ValidationError},
        logging::{LogComponent, get_logger},
        market_data::{Period, QueryRange},
    },
    infrastructure::{StockApiClient, notifier_for, rendering::CanvasContainer},
    presentation::chart_view::ChartView,
};
use gloo::utils::format::JsValueSerdeExt;
use js_sys::{Array, Promise};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

fn to_js(error: AppError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn outcome_to_js(outcome: QueryOutcome) -> JsValue {
    JsValue::from_str(match outcome {
        QueryOutcome::Applied => "applied",
        QueryOutcome::Stale => "stale",
    })
}

/// Stock chart API exported to JavaScript.
///
/// Thin bridge: every call is forwarded to the chart session or the load
/// use case.
#[wasm_bindgen]
pub struct StockChartApi {
    session: Rc<RefCell<ChartSession>>,
    client: StockApiClient,
}

#[wasm_bindgen]
impl StockChartApi {
    /// `config_json` may be omitted or contain any subset of the settings.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<StockChartApi, JsValue> {
        let config = match config_json {
            Some(json) => ChartConfig::from_json(&json),
            None => Ok(ChartConfig::default()),
        }
        .map_err(|e| to_js(e.into()))?;
        let client = StockApiClient::new(config.api_base_url.clone());
        let notifier = notifier_for(&config.notification_container_id);
        let session = ChartSession::new(config, notifier).map_err(|e| to_js(e.into()))?;
        get_logger().info(LogComponent::Presentation("StockChartApi"), "chart api created");
        Ok(Self { session: Rc::new(RefCell::new(session)), client })
    }

    fn loader(&self) -> LoadChartUseCase<StockApiClient> {
        LoadChartUseCase::new(self.client.clone(), Rc::clone(&self.session))
    }

    /// Draws into an existing `<canvas>`.
    #[wasm_bindgen(js_name = attachCanvas)]
    pub fn attach_canvas(&self, canvas_id: String) -> Result<(), JsValue> {
        self.session
            .borrow_mut()
            .attach(Box::new(CanvasContainer::new(canvas_id)))
            .map_err(to_js)
    }

    /// Mounts a chart canvas inside the element `parent_id`.
    #[wasm_bindgen(js_name = mountView)]
    pub fn mount_view(&self, parent_id: &str, canvas_id: String) -> Result<(), JsValue> {
        let parent = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(parent_id))
            .ok_or_else(|| JsValue::from_str(&format!("element '{}' not found", parent_id)))?
            .dyn_into::<web_sys::HtmlElement>()
            .map_err(|_| JsValue::from_str(&format!("element '{}' is not an HTML element", parent_id)))?;
        let session = Rc::clone(&self.session);
        leptos::mount_to(parent, move || leptos::view! { <ChartView session=session canvas_id=canvas_id/> });
        Ok(())
    }

    /// Loads `code` over the current period or date range.
    pub fn submit(&self, code: String) -> Promise {
        let loader = self.loader();
        future_to_promise(async move {
            loader.execute_code(&code).await.map(outcome_to_js).map_err(to_js)
        })
    }

    /// Switches to an explicit date range, then loads `code`.
    #[wasm_bindgen(js_name = submitRange)]
    pub fn submit_range(&self, code: String, start: String, end: String) -> Promise {
        let range = QueryRange::between(&start, &end);
        let session = Rc::clone(&self.session);
        let loader = self.loader();
        future_to_promise(async move {
            let range = range.map_err(|e| to_js(session.borrow().report(e)))?;
            session.borrow_mut().set_range(range);
            loader.execute_code(&code).await.map(outcome_to_js).map_err(to_js)
        })
    }

    /// Period shorthand for later submits: `5d`, `1mo`, `3mo`, `6mo`, `1y`, `2y`, `5y`, `max`.
    #[wasm_bindgen(js_name = setPeriod)]
    pub fn set_period(&self, period: &str) -> Result<(), JsValue> {
        let parsed = period.parse::<Period>().map_err(|_| {
            to_js(self.session.borrow().report(ValidationError::WrongType(
                "period".to_string(),
                "one of 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, max",
            )))
        })?;
        self.session.borrow_mut().set_range(QueryRange::Period(parsed));
        Ok(())
    }

    #[wasm_bindgen(js_name = setVolumeScale)]
    pub fn set_volume_scale(&self, percent: u32) -> Result<(), JsValue> {
        self.session.borrow_mut().set_volume_scale(percent).map_err(to_js)
    }

    /// Replaces the active indicators, e.g. `["ma5", "rsi"]`.
    #[wasm_bindgen(js_name = setIndicators)]
    pub fn set_indicators(&self, names: Array) -> Result<(), JsValue> {
        let names: Vec<String> = names.iter().filter_map(|name| name.as_string()).collect();
        self.session.borrow_mut().set_indicators(&names).map_err(to_js)
    }

    #[wasm_bindgen(js_name = setMovingAverage)]
    pub fn set_moving_average(&self, days: u32) -> Result<(), JsValue> {
        self.session.borrow_mut().set_moving_average(days).map_err(to_js)
    }

    /// Gesture on one axis, e.g. `applyZoom("price.time", 20, 80)`.
    #[wasm_bindgen(js_name = applyZoom)]
    pub fn apply_zoom(&self, axis_id: &str, start: f64, end: f64) -> Result<bool, JsValue> {
        let adapter = self.session.borrow().adapter();
        let applied = adapter.borrow_mut().apply_gesture(axis_id, start, end);
        applied.map_err(|e| to_js(self.session.borrow().report(e)))
    }

    #[wasm_bindgen(js_name = resetHorizontalZoom)]
    pub fn reset_horizontal_zoom(&self) -> Result<(), JsValue> {
        let handle = self.session.borrow().reset_handle();
        handle.reset_horizontal_zoom().map_err(|e| to_js(self.session.borrow().report(e)))
    }

    #[wasm_bindgen(js_name = resetVerticalZoom)]
    pub fn reset_vertical_zoom(&self) -> Result<(), JsValue> {
        let handle = self.session.borrow().reset_handle();
        handle.reset_vertical_zoom().map_err(|e| to_js(self.session.borrow().report(e)))
    }

    /// History entries, newest first, as `[{code, name}]`.
    pub fn history(&self) -> Result<JsValue, JsValue> {
        let session = self.session.borrow();
        let entries: Vec<_> = session.history().entries().collect();
        JsValue::from_serde(&entries).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Reloads a history entry; resolves to `undefined` for unknown codes.
    #[wasm_bindgen(js_name = selectHistory)]
    pub fn select_history(&self, code: String) -> Promise {
        let loader = self.loader();
        future_to_promise(async move {
            match loader.execute_history(&code).await.map_err(to_js)? {
                Some(outcome) => Ok(outcome_to_js(outcome)),
                None => Ok(JsValue::UNDEFINED),
            }
        })
    }

    /// Next-session read of the chart on screen, e.g. `"bullish (MACD above signal)"`.
    pub fn outlook(&self) -> Option<String> {
        self.session.borrow().outlook().map(|outlook| outlook.to_string())
    }

    /// Current layout as plain JSON, `null` before the first load.
    pub fn layout(&self) -> Result<JsValue, JsValue> {
        match self.session.borrow().layout() {
            Some(layout) => JsValue::from_serde(&*layout).map_err(|e| JsValue::from_str(&e.to_string())),
            None => Ok(JsValue::NULL),
        }
    }

    /// Releases the surface and its resize listener.
    pub fn dispose(&self) {
        self.session.borrow_mut().detach();
        get_logger().info(LogComponent::Presentation("StockChartApi"), "chart api disposed");
    }
}
