use crate::domain::{
    chart::{
        AxisKind, ChartLayout, RenderSurface, ResizeSubscription, SharedZoom, SurfaceFrame,
        SurfaceProvider,
    },
    errors::{RenderError, RenderingResult},
    logging::{LogComponent, get_logger},
};
use crate::{log_debug, log_info};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

type SurfaceCell = Rc<RefCell<Box<dyn RenderSurface>>>;

/// A created surface plus its resize listener.
///
/// Dropping it removes the listener and disposes the surface, so every
/// path that lets go of a surface releases it.
struct LiveSurface {
    surface: SurfaceCell,
    resize: Option<Box<dyn ResizeSubscription>>,
}

impl LiveSurface {
    fn open(provider: &mut dyn SurfaceProvider) -> RenderingResult<Self> {
        let surface: SurfaceCell = Rc::new(RefCell::new(provider.create_surface()?));
        let weak: Weak<RefCell<Box<dyn RenderSurface>>> = Rc::downgrade(&surface);
        let resize = provider.watch_resize(Box::new(move || {
            let Some(surface) = weak.upgrade() else { return };
            let Ok(mut surface) = surface.try_borrow_mut() else { return };
            if let Err(e) = surface.resize() {
                get_logger().warn(
                    LogComponent::Application("RenderAdapter"),
                    &format!("resize failed: {}", e),
                );
            }
        }));
        Ok(Self { surface, resize: Some(resize) })
    }

    fn apply(&self, frame: &SurfaceFrame) -> RenderingResult<()> {
        self.surface
            .try_borrow_mut()
            .map_err(|_| RenderError::DrawFailed("surface is busy".to_string()))?
            .apply(frame)
    }
}

impl Drop for LiveSurface {
    fn drop(&mut self) {
        if let Some(resize) = self.resize.take() {
            resize.remove();
        }
        if let Ok(mut surface) = self.surface.try_borrow_mut() {
            surface.dispose();
        }
    }
}

/// Binds layouts and zoom state to one rendering surface.
///
/// The surface is created lazily on the first layout after `attach` and is
/// released on `detach`, on a failed first apply, or when the adapter drops.
pub struct RenderAdapter {
    zoom: SharedZoom,
    provider: Option<Box<dyn SurfaceProvider>>,
    live: Option<LiveSurface>,
    layout: Option<Rc<ChartLayout>>,
}

impl RenderAdapter {
    pub fn new(zoom: SharedZoom) -> Self {
        Self { zoom, provider: None, live: None, layout: None }
    }

    pub fn zoom(&self) -> SharedZoom {
        Rc::clone(&self.zoom)
    }

    pub fn layout(&self) -> Option<Rc<ChartLayout>> {
        self.layout.clone()
    }

    pub fn is_attached(&self) -> bool {
        self.provider.is_some()
    }

    pub fn has_surface(&self) -> bool {
        self.live.is_some()
    }

    /// Binds a container; a layout already held is drawn right away.
    pub fn attach(&mut self, provider: Box<dyn SurfaceProvider>) -> RenderingResult<()> {
        self.detach();
        self.provider = Some(provider);
        log_debug!(LogComponent::Application("RenderAdapter"), "container attached");
        self.refresh()
    }

    pub fn detach(&mut self) {
        if self.live.take().is_some() {
            log_info!(LogComponent::Application("RenderAdapter"), "surface disposed");
        }
        self.provider = None;
    }

    /// Adopts a new layout and pushes it with the current zoom windows.
    pub fn render(&mut self, layout: Rc<ChartLayout>) -> RenderingResult<()> {
        self.zoom.borrow_mut().sync_layout(&layout);
        self.layout = Some(layout);
        self.refresh()
    }

    /// Re-applies the held layout with a fresh zoom snapshot. Without a
    /// layout or a container this does nothing.
    pub fn refresh(&mut self) -> RenderingResult<()> {
        let (Some(layout), Some(provider)) = (self.layout.as_ref(), self.provider.as_mut()) else {
            return Ok(());
        };
        let frame = SurfaceFrame { layout: Rc::clone(layout), zoom: self.zoom.borrow().snapshot() };

        if let Some(live) = &self.live {
            return live.apply(&frame);
        }

        let live = LiveSurface::open(&mut **provider)?;
        // a surface that cannot take its first frame is dropped (and disposed) here
        live.apply(&frame)?;
        log_info!(
            LogComponent::Application("RenderAdapter"),
            "surface created for `{}`",
            frame.layout.title
        );
        self.live = Some(live);
        Ok(())
    }

    /// Pushes a gesture on one axis into the zoom state, then redraws so
    /// linked panels follow. Returns whether the gesture was accepted.
    pub fn apply_gesture(&mut self, axis_id: &str, start: f64, end: f64) -> RenderingResult<bool> {
        let accepted = self.zoom.borrow_mut().apply_axis_range(axis_id, start, end);
        if accepted {
            self.refresh()?;
        }
        Ok(accepted)
    }

    pub fn reset_axis_kind(&mut self, kind: AxisKind) -> RenderingResult<()> {
        self.zoom.borrow_mut().reset_axis_kind(kind);
        self.refresh()
    }
}

/// Imperative zoom reset, usable outside the render cycle
pub trait ZoomReset {
    fn reset_horizontal_zoom(&self) -> RenderingResult<()>;
    fn reset_vertical_zoom(&self) -> RenderingResult<()>;
}

/// Cloneable reset handle over a shared adapter
#[derive(Clone)]
pub struct ZoomResetHandle {
    adapter: Rc<RefCell<RenderAdapter>>,
}

impl ZoomResetHandle {
    pub fn new(adapter: Rc<RefCell<RenderAdapter>>) -> Self {
        Self { adapter }
    }
}

impl ZoomReset for ZoomResetHandle {
    fn reset_horizontal_zoom(&self) -> RenderingResult<()> {
        self.adapter.borrow_mut().reset_axis_kind(AxisKind::Time)
    }

    fn reset_vertical_zoom(&self) -> RenderingResult<()> {
        self.adapter.borrow_mut().reset_axis_kind(AxisKind::Value)
    }
}
