use crate::domain::{
    chart::{
        Axis, ChartLayout, Panel, RangePolicy, RenderSurface, ResizeSubscription, SeriesData,
        SeriesKind, SeriesSpec, SurfaceFrame, SurfaceProvider, ZoomSnapshot,
    },
    errors::{RenderError, RenderingResult},
    logging::{LogComponent, get_logger},
};
use crate::event_utils::{EventOptions, WindowEventListenerHandle, window_event_listener_with_options};
use std::ops::Range;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

const TITLE_SPACE: f64 = 30.0;
const PADDING: f64 = 40.0;
const AXIS_TEXT_SPACE: f64 = 60.0;
const PANEL_GAP: f64 = 8.0;

/// Screen rectangle in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Splits the plot area top-to-bottom by each panel's height fraction.
pub fn panel_rects(layout: &ChartLayout, width: f64, height: f64) -> Vec<Rect> {
    let plot_width = (width - PADDING - AXIS_TEXT_SPACE).max(0.0);
    let plot_height = (height - TITLE_SPACE - PADDING).max(0.0);
    let mut y = TITLE_SPACE;
    layout
        .panels
        .iter()
        .map(|panel| {
            let full = plot_height * panel.height_fraction;
            let rect = Rect { x: PADDING, y, width: plot_width, height: (full - PANEL_GAP).max(0.0) };
            y += full;
            rect
        })
        .collect()
}

/// Value extent of an axis over the visible categories, before value zoom.
pub fn axis_extent(layout: &ChartLayout, axis: &Axis, window: Range<usize>) -> Option<(f64, f64)> {
    match axis.range {
        RangePolicy::Fixed { min, max } => return Some((min, max)),
        RangePolicy::FixedMax { max } => return Some((0.0, max)),
        RangePolicy::Auto => {}
    }
    let mut extent: Option<(f64, f64)> = None;
    let mut widen = |lo: f64, hi: f64| {
        extent = Some(match extent {
            Some((min, max)) => (min.min(lo), max.max(hi)),
            None => (lo, hi),
        });
    };
    for series in layout.series.iter().filter(|series| series.axis_id == axis.id) {
        match &series.data {
            SeriesData::Candles(points) => {
                for point in points.get(window.clone()).unwrap_or_default() {
                    widen(point.ohlc.low, point.ohlc.high);
                }
            }
            SeriesData::Values(values) => {
                let visible = values.get(window.clone()).unwrap_or_default();
                for value in visible.iter().flatten() {
                    widen(*value, *value);
                }
                if series.kind == SeriesKind::Bar {
                    widen(0.0, 0.0);
                }
            }
        }
    }
    extent.map(|(min, max)| if min == max { (min - 1.0, max + 1.0) } else { (min, max) })
}

/// Maps category index and value onto a panel rectangle
struct Projection {
    rect: Rect,
    window: Range<usize>,
    min: f64,
    max: f64,
}

impl Projection {
    fn slot_width(&self) -> f64 {
        self.rect.width / self.window.len().max(1) as f64
    }

    fn x(&self, index: usize) -> f64 {
        self.rect.x + (index - self.window.start) as f64 * self.slot_width() + self.slot_width() / 2.0
    }

    fn y(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span == 0.0 {
            return self.rect.y + self.rect.height / 2.0;
        }
        self.rect.y + (self.max - value) / span * self.rect.height
    }
}

/// Canvas 2D surface for one `<canvas>` element
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    frame: Option<SurfaceFrame>,
}

impl CanvasSurface {
    pub fn from_canvas(canvas: HtmlCanvasElement) -> RenderingResult<Self> {
        let context = canvas
            .get_context("2d")
            .map_err(|_| RenderError::SurfaceUnavailable("failed to get 2D context".to_string()))?
            .ok_or_else(|| RenderError::SurfaceUnavailable("2D context not supported".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| RenderError::SurfaceUnavailable("failed to cast to 2D context".to_string()))?;
        let surface = Self { canvas, context, frame: None };
        surface.fit_to_client();
        Ok(surface)
    }

    fn fit_to_client(&self) {
        let (width, height) = (self.canvas.client_width(), self.canvas.client_height());
        if width > 0 && height > 0 {
            self.canvas.set_width(width as u32);
            self.canvas.set_height(height as u32);
        }
    }

    fn draw(&self, frame: &SurfaceFrame) -> Result<(), JsValue> {
        let (width, height) = (self.canvas.width() as f64, self.canvas.height() as f64);
        let ctx = &self.context;
        let layout = &frame.layout;

        ctx.clear_rect(0.0, 0.0, width, height);
        ctx.set_fill_style(&JsValue::from("#ffffff"));
        ctx.fill_rect(0.0, 0.0, width, height);

        ctx.set_fill_style(&JsValue::from("#333333"));
        ctx.set_font("16px Arial");
        ctx.set_text_align("center");
        ctx.fill_text(&layout.title, width / 2.0, 20.0)?;
        ctx.set_text_align("start");

        for (panel, rect) in layout.panels.iter().zip(panel_rects(layout, width, height)) {
            self.draw_panel(layout, &frame.zoom, panel, rect)?;
        }
        Ok(())
    }

    fn draw_panel(
        &self,
        layout: &ChartLayout,
        zoom: &ZoomSnapshot,
        panel: &Panel,
        rect: Rect,
    ) -> Result<(), JsValue> {
        let ctx = &self.context;
        let window = zoom.range_for_axis(&panel.time_axis.id).index_window(layout.categories.len());

        ctx.set_stroke_style(&JsValue::from("#cccccc"));
        ctx.set_line_width(1.0);
        ctx.stroke_rect(rect.x, rect.y, rect.width, rect.height);

        for axis in &panel.value_axes {
            let Some((min, max)) = axis_extent(layout, axis, window.clone()) else { continue };
            let (min, max) = zoom.range_for_axis(&axis.id).apply_to_span(min, max);
            let projection = Projection { rect, window: window.clone(), min, max };

            if axis.show_split_line {
                ctx.set_stroke_style(&JsValue::from("#eeeeee"));
                for step in 1..4 {
                    let y = rect.y + rect.height * step as f64 / 4.0;
                    ctx.begin_path();
                    ctx.move_to(rect.x, y);
                    ctx.line_to(rect.x + rect.width, y);
                    ctx.stroke();
                }
            }
            if axis.show_label {
                ctx.set_fill_style(&JsValue::from("#666666"));
                ctx.set_font("11px Arial");
                ctx.fill_text(&format!("{:.2}", max), rect.x + rect.width + 4.0, rect.y + 10.0)?;
                ctx.fill_text(&format!("{:.2}", min), rect.x + rect.width + 4.0, rect.bottom())?;
            }

            for series in layout.series.iter().filter(|series| series.axis_id == axis.id) {
                self.draw_series(series, &projection)?;
            }
        }

        if panel.time_axis.show_label && !window.is_empty() {
            ctx.set_fill_style(&JsValue::from("#666666"));
            ctx.set_font("11px Arial");
            if let Some(first) = layout.categories.get(window.start) {
                ctx.fill_text(first, rect.x, rect.bottom() + 14.0)?;
            }
            if let Some(last) = layout.categories.get(window.end - 1) {
                ctx.set_text_align("end");
                ctx.fill_text(last, rect.x + rect.width, rect.bottom() + 14.0)?;
                ctx.set_text_align("start");
            }
        }
        Ok(())
    }

    fn draw_series(&self, series: &SeriesSpec, projection: &Projection) -> Result<(), JsValue> {
        let ctx = &self.context;
        let body_width = (projection.slot_width() * 0.6).max(1.0);
        match (&series.data, series.kind) {
            (SeriesData::Candles(points), _) => {
                for index in projection.window.clone() {
                    let Some(point) = points.get(index) else { break };
                    let x = projection.x(index);
                    let color = JsValue::from(point.color.to_css());
                    ctx.set_stroke_style(&color);
                    ctx.set_fill_style(&color);
                    ctx.begin_path();
                    ctx.move_to(x, projection.y(point.ohlc.high));
                    ctx.line_to(x, projection.y(point.ohlc.low));
                    ctx.stroke();
                    let (open_y, close_y) = (projection.y(point.ohlc.open), projection.y(point.ohlc.close));
                    let body_height = (open_y - close_y).abs().max(1.0);
                    ctx.fill_rect(x - body_width / 2.0, open_y.min(close_y), body_width, body_height);
                }
            }
            (SeriesData::Values(values), SeriesKind::Bar) => {
                ctx.set_fill_style(&JsValue::from("rgba(100, 100, 160, 0.5)"));
                let base = projection.y(0.0f64.clamp(projection.min, projection.max));
                for index in projection.window.clone() {
                    let Some(Some(value)) = values.get(index) else { continue };
                    let y = projection.y(*value);
                    ctx.fill_rect(projection.x(index) - body_width / 2.0, y.min(base), body_width, (y - base).abs());
                }
            }
            (SeriesData::Values(values), _) => {
                ctx.set_stroke_style(&JsValue::from(line_color(&series.name)));
                ctx.set_line_width(1.0);
                ctx.begin_path();
                let mut pen_down = false;
                for index in projection.window.clone() {
                    match values.get(index) {
                        Some(Some(value)) => {
                            let (x, y) = (projection.x(index), projection.y(*value));
                            if pen_down { ctx.line_to(x, y) } else { ctx.move_to(x, y) }
                            pen_down = true;
                        }
                        _ => pen_down = false,
                    }
                }
                ctx.stroke();
            }
        }
        Ok(())
    }
}

fn line_color(series_name: &str) -> &'static str {
    match series_name {
        "MA5" | "RSI" | "MACD" | "K" => "#1f77b4",
        "MA10" | "SIGNAL" | "D" => "#ff7f0e",
        "MA15" => "#9467bd",
        _ => "#8c564b",
    }
}

impl RenderSurface for CanvasSurface {
    fn apply(&mut self, frame: &SurfaceFrame) -> RenderingResult<()> {
        self.draw(frame).map_err(|e| RenderError::DrawFailed(format!("{:?}", e)))?;
        self.frame = Some(frame.clone());
        Ok(())
    }

    fn resize(&mut self) -> RenderingResult<()> {
        self.fit_to_client();
        match &self.frame {
            Some(frame) => self.draw(frame).map_err(|e| RenderError::DrawFailed(format!("{:?}", e))),
            None => Ok(()),
        }
    }

    fn dispose(&mut self) {
        let (width, height) = (self.canvas.width() as f64, self.canvas.height() as f64);
        self.context.clear_rect(0.0, 0.0, width, height);
        self.frame = None;
        get_logger().debug(LogComponent::Infrastructure("CanvasSurface"), "surface disposed");
    }
}

impl ResizeSubscription for WindowEventListenerHandle {
    fn remove(self: Box<Self>) {
        WindowEventListenerHandle::remove(*self);
    }
}

/// Surface provider for a `<canvas>` looked up by element id
pub struct CanvasContainer {
    canvas_id: String,
}

impl CanvasContainer {
    pub fn new(canvas_id: impl Into<String>) -> Self {
        Self { canvas_id: canvas_id.into() }
    }

    fn canvas(&self) -> RenderingResult<HtmlCanvasElement> {
        web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(&self.canvas_id))
            .ok_or_else(|| RenderError::SurfaceUnavailable(format!("element '{}' not found", self.canvas_id)))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| RenderError::SurfaceUnavailable(format!("element '{}' is not a canvas", self.canvas_id)))
    }
}

impl SurfaceProvider for CanvasContainer {
    fn create_surface(&mut self) -> RenderingResult<Box<dyn RenderSurface>> {
        Ok(Box::new(CanvasSurface::from_canvas(self.canvas()?)?))
    }

    fn watch_resize(&mut self, mut on_resize: Box<dyn FnMut()>) -> Box<dyn ResizeSubscription> {
        Box::new(window_event_listener_with_options(
            leptos::ev::resize,
            &EventOptions::default(),
            move |_| on_resize(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::ChartModelBuilder;
    use crate::domain::chart::DisplayParams;
    use crate::domain::market_data::{ChartDataset, IndicatorName, Ohlc};
    use std::collections::BTreeMap;

    fn layout() -> ChartLayout {
        let mut indicators = BTreeMap::new();
        indicators.insert(IndicatorName::Rsi, vec![None, Some(40.0), Some(60.0)]);
        let dataset = ChartDataset {
            name: Some("Demo".into()),
            dates: vec!["d1".into(), "d2".into(), "d3".into()],
            ohlc: vec![
                Ohlc::new(10.0, 11.0, 9.0, 12.0),
                Ohlc::new(11.0, 10.0, 8.0, 11.5),
                Ohlc::new(10.0, 13.0, 10.0, 14.0),
            ],
            volumes: vec![100, 200, 300],
            indicators,
        };
        let params = DisplayParams::from_names(100, &["rsi"]).unwrap();
        ChartModelBuilder::new().build(&dataset, &params)
    }

    #[test]
    fn panels_stack_by_height_fraction() {
        let rects = panel_rects(&layout(), 1000.0, 530.0);
        assert_eq!(rects.len(), 2);
        assert_eq!(rects[0].y, TITLE_SPACE);
        assert!((rects[1].y - (TITLE_SPACE + 460.0 * 0.8)).abs() < 1e-9);
        assert!(rects[0].bottom() < rects[1].y);
    }

    #[test]
    fn auto_extent_follows_visible_window() {
        let layout = layout();
        let price = layout.axis("price.value").unwrap();
        assert_eq!(axis_extent(&layout, price, 0..3), Some((8.0, 14.0)));
        assert_eq!(axis_extent(&layout, price, 1..2), Some((8.0, 11.5)));
        let volume = layout.axis("price.volume").unwrap();
        assert_eq!(axis_extent(&layout, volume, 0..3), Some((0.0, 360.0)));
        let rsi = layout.axis("rsi.value").unwrap();
        assert_eq!(axis_extent(&layout, rsi, 0..1), Some((0.0, 100.0)));
    }
}
