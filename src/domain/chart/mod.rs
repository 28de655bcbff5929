//! Chart aggregate: layout model, its builder, zoom state and the surface port.

pub mod entities;
pub mod services;
pub mod surface;
pub mod value_objects;
pub mod zoom;

pub use entities::*;
pub use services::ChartModelBuilder;
pub use surface::{RenderSurface, ResizeSubscription, SurfaceFrame, SurfaceProvider};
pub use value_objects::*;
pub use zoom::{SharedZoom, ZoomController, ZoomRange, ZoomSnapshot};
