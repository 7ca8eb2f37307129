//! Shared view state for host callbacks
//!
//! Windowing hosts call into a view through `&self` and may re-enter it,
//! e.g. a layer display callback firing while a device is being bound.
//! Every access here is a `try_borrow_mut`, so a re-entrant call is turned
//! into a skipped frame or a `SurfaceError::Busy` instead of a panic that
//! would unwind across the Objective-C boundary.

use std::cell::RefCell;

use log::debug;

use super::backend::Backend;
use super::error::SurfaceError;
use super::types::ViewId;
use super::view::{LayerRedrawPolicy, SurfaceLifecycle, SurfaceView};
use crate::config::SurfaceConfig;

/// Interior-mutable [`SurfaceView`] owned by a host object
pub struct SharedSurface<B: Backend> {
    id: ViewId,
    view: RefCell<SurfaceView<B>>,
}

impl<B: Backend> SharedSurface<B> {
    pub fn new(config: SurfaceConfig) -> Self {
        let view = SurfaceView::new(config);
        Self {
            id: view.id(),
            view: RefCell::new(view),
        }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    /// Run `f` on the view, or return `None` if it is already borrowed
    pub fn with<R>(&self, f: impl FnOnce(&mut SurfaceView<B>) -> R) -> Option<R> {
        match self.view.try_borrow_mut() {
            Ok(mut view) => Some(f(&mut view)),
            Err(_) => {
                debug!("{} is busy, ignoring re-entrant call", self.id);
                None
            }
        }
    }

    /// Layer and redraw configuration the host applies at construction
    pub fn layer_settings(&self) -> (bool, LayerRedrawPolicy) {
        self.with(|view| (view.wants_layer(), view.redraw_policy()))
            .unwrap_or((true, LayerRedrawPolicy::DuringViewResize))
    }

    /// Create the backing layer and map it with `f`
    pub fn attach_layer<R>(&self, f: impl FnOnce(&B::Layer) -> R) -> Option<R> {
        self.with(|view| f(view.on_attach_to_surface()))
    }

    pub fn move_to_display(&self) {
        self.with(|view| view.on_move_to_display());
    }

    pub fn assign_device(&self, device: B::Device) -> Result<(), SurfaceError> {
        self.with(|view| view.assign_device(device))
            .unwrap_or(Err(SurfaceError::Busy))
    }

    /// Redraw, skipping the frame if the view is busy
    pub fn redraw(&self) {
        self.with(|view| view.redraw());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::headless::{HeadlessBackend, HeadlessDevice};
    use crate::surface::{PixelFormat, RenderingLayer};

    fn surface() -> SharedSurface<HeadlessBackend> {
        SharedSurface::new(SurfaceConfig::default())
    }

    #[test]
    fn test_callbacks_drive_the_view() {
        let surface = surface();
        let (wants_layer, policy) = surface.layer_settings();
        assert!(wants_layer);
        assert_eq!(policy, LayerRedrawPolicy::DuringViewResize);

        let format = surface.attach_layer(|layer| layer.pixel_format());
        assert_eq!(format, Some(PixelFormat::Bgra8Unorm));

        let device = HeadlessDevice::new("gpu");
        surface.assign_device(device.clone()).unwrap();
        surface.move_to_display();
        surface.redraw();
        assert_eq!(device.commits(), 2);
    }

    #[test]
    fn test_reentrant_calls_do_not_panic() {
        let surface = surface();
        surface.attach_layer(|_| ());
        let device = HeadlessDevice::new("gpu");

        surface.with(|_view| {
            assert_eq!(surface.attach_layer(|_| ()), None);
            assert_eq!(
                surface.assign_device(device.clone()),
                Err(SurfaceError::Busy)
            );
            surface.redraw();
            surface.move_to_display();
            assert_eq!(
                surface.layer_settings(),
                (true, LayerRedrawPolicy::DuringViewResize)
            );
        });

        assert_eq!(device.commits(), 0);
        let bound = surface.with(|view| view.layer().and_then(|l| l.device()).is_some());
        assert_eq!(bound, Some(false));
    }
}
