#![allow(dead_code)]

use serde_json::{Value, json};
use std::cell::RefCell;
use std::rc::Rc;
use stock_chart_wasm::domain::chart::{
    RenderSurface, ResizeSubscription, SurfaceFrame, SurfaceProvider,
};
use stock_chart_wasm::domain::errors::{AppError, RenderError, RenderingResult};
use stock_chart_wasm::infrastructure::UiNotificationProvider;

/// Everything a recording surface saw
#[derive(Default)]
pub struct SurfaceLog {
    pub created: usize,
    pub frames: Vec<SurfaceFrame>,
    pub resized: usize,
    pub disposed: usize,
    pub subscriptions: usize,
    pub removed: usize,
    pub fail_apply: bool,
    pub resize_callbacks: Vec<Box<dyn FnMut()>>,
}

impl SurfaceLog {
    pub fn last_frame(&self) -> &SurfaceFrame {
        self.frames.last().expect("no frame applied yet")
    }
}

pub type SharedLog = Rc<RefCell<SurfaceLog>>;

pub struct RecordingSurface {
    log: SharedLog,
}

impl RenderSurface for RecordingSurface {
    fn apply(&mut self, frame: &SurfaceFrame) -> RenderingResult<()> {
        let mut log = self.log.borrow_mut();
        if log.fail_apply {
            return Err(RenderError::DrawFailed("recording surface refused".to_string()));
        }
        log.frames.push(frame.clone());
        Ok(())
    }

    fn resize(&mut self) -> RenderingResult<()> {
        self.log.borrow_mut().resized += 1;
        Ok(())
    }

    fn dispose(&mut self) {
        self.log.borrow_mut().disposed += 1;
    }
}

struct RecordingSubscription {
    log: SharedLog,
}

impl ResizeSubscription for RecordingSubscription {
    fn remove(self: Box<Self>) {
        self.log.borrow_mut().removed += 1;
    }
}

/// Container double that counts surfaces and listeners
pub struct RecordingProvider {
    log: SharedLog,
}

impl RecordingProvider {
    pub fn new() -> (Self, SharedLog) {
        let log = SharedLog::default();
        (Self { log: Rc::clone(&log) }, log)
    }
}

impl SurfaceProvider for RecordingProvider {
    fn create_surface(&mut self) -> RenderingResult<Box<dyn RenderSurface>> {
        self.log.borrow_mut().created += 1;
        Ok(Box::new(RecordingSurface { log: Rc::clone(&self.log) }))
    }

    fn watch_resize(&mut self, on_resize: Box<dyn FnMut()>) -> Box<dyn ResizeSubscription> {
        let mut log = self.log.borrow_mut();
        log.subscriptions += 1;
        log.resize_callbacks.push(on_resize);
        Box::new(RecordingSubscription { log: Rc::clone(&self.log) })
    }
}

/// Runs every resize callback ever registered, as a window resize would.
pub fn fire_resize(log: &SharedLog) {
    let mut callbacks = std::mem::take(&mut log.borrow_mut().resize_callbacks);
    for callback in callbacks.iter_mut() {
        callback();
    }
    log.borrow_mut().resize_callbacks = callbacks;
}

/// Notifier double keeping every message it was asked to show
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub errors: Rc<RefCell<Vec<String>>>,
    pub clears: Rc<RefCell<usize>>,
}

impl UiNotificationProvider for RecordingNotifier {
    fn notify_error(&self, error: &AppError) {
        self.errors.borrow_mut().push(error.to_string());
    }

    fn clear_notifications(&self) {
        *self.clears.borrow_mut() += 1;
    }
}

/// Rising candles over `len` sessions with volumes `100, 200, ...`.
pub fn payload(len: usize) -> Value {
    let dates: Vec<String> = (0..len).map(|i| format!("2024-01-{:02}", i + 1)).collect();
    let prices: Vec<[f64; 4]> = (0..len)
        .map(|i| {
            let open = 10.0 + i as f64;
            [open, open + 0.5, open - 1.0, open + 1.0]
        })
        .collect();
    let volumes: Vec<u64> = (0..len).map(|i| 100 * (i as u64 + 1)).collect();
    json!({
        "name": "Test Corp",
        "dates": dates,
        "kData": prices,
        "volumes": volumes,
    })
}

/// Adds one indicator series computed from the session index.
pub fn with_indicator(mut payload: Value, key: &str, value: impl Fn(usize) -> Option<f64>) -> Value {
    let len = payload["dates"].as_array().map(Vec::len).unwrap_or(0);
    let series: Vec<Option<f64>> = (0..len).map(value).collect();
    payload[key] = json!(series);
    payload
}

/// Payload carrying every supported indicator.
pub fn full_payload(len: usize) -> Value {
    let mut payload = payload(len);
    for key in ["ma5", "ma10", "ma15", "ma20"] {
        payload = with_indicator(payload, key, |i| Some(10.0 + i as f64));
    }
    payload = with_indicator(payload, "rsi", |i| Some(40.0 + i as f64));
    payload = with_indicator(payload, "macd", |i| Some(0.1 * i as f64));
    payload = with_indicator(payload, "signal", |i| Some(0.05 * i as f64));
    payload = with_indicator(payload, "hist", |i| Some(0.05 * i as f64));
    payload = with_indicator(payload, "k", |i| Some(50.0 + i as f64));
    with_indicator(payload, "d", |i| Some(45.0 + i as f64))
}
