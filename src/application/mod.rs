pub mod chart_service;
pub mod render_adapter;
pub mod use_cases;

pub use chart_service::*;
pub use render_adapter::*;
pub use use_cases::*;
