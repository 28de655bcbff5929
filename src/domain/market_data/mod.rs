//! Market data aggregate containing the dataset, its validator and value objects.

pub mod entities;
pub mod outlook;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use outlook::{Bias, MarketOutlook, Signal};
pub use repositories::StockDataSource;
pub use services::PayloadValidator;
pub use value_objects::*;
