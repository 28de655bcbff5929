pub mod chart_view;
pub mod wasm_api;

pub use chart_view::ChartView;
pub use wasm_api::StockChartApi;
