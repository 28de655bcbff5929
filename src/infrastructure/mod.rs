pub mod http;
pub mod rendering;
pub mod services;
pub mod ui;

pub use http::StockApiClient;
pub use services::{BrowserTimeProvider, ConsoleLogger};
pub use ui::{LogNotificationService, UiNotificationProvider, UiNotificationService, notifier_for};
