use super::entities::ChartLayout;
use super::zoom::ZoomSnapshot;
use crate::domain::errors::RenderingResult;
use std::rc::Rc;

/// Full configuration pushed to a surface on every update
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceFrame {
    pub layout: Rc<ChartLayout>,
    pub zoom: ZoomSnapshot,
}

/// A live drawing target bound to one container
pub trait RenderSurface {
    /// Replaces the whole configuration; nothing from an earlier frame is kept.
    fn apply(&mut self, frame: &SurfaceFrame) -> RenderingResult<()>;

    /// Container size changed.
    fn resize(&mut self) -> RenderingResult<()>;

    fn dispose(&mut self);
}

/// Active resize listener; removing it detaches the callback.
pub trait ResizeSubscription {
    fn remove(self: Box<Self>);
}

/// Creates surfaces and resize subscriptions for a container
pub trait SurfaceProvider {
    fn create_surface(&mut self) -> RenderingResult<Box<dyn RenderSurface>>;

    fn watch_resize(&mut self, on_resize: Box<dyn FnMut()>) -> Box<dyn ResizeSubscription>;
}
