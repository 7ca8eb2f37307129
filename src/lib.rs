//! Clearview - a Metal-backed view that clears its surface every redraw
//!
//! The view owns a swappable-drawable layer, accepts a rendering device and
//! on each redraw clears the layer's next drawable to a fixed color and
//! presents it. Nothing is ever drawn besides the clear.
//!
//! # Architecture
//!
//! - **Surface Core**: `SurfaceView` and the `Backend`/`RenderingLayer` seams
//! - **Renderers**: Metal on macOS, a headless CPU renderer everywhere
//! - **Cocoa Backend**: NSView subclass, NSWindow and NSApplication glue
//!
//! # Example
//!
//! ```
//! use clearview::config::SurfaceConfig;
//! use clearview::renderer::headless::{HeadlessBackend, HeadlessDevice};
//! use clearview::surface::{SurfaceLifecycle, SurfaceView};
//!
//! let mut view = SurfaceView::<HeadlessBackend>::new(SurfaceConfig::default());
//! view.on_attach_to_surface();
//! view.assign_device(HeadlessDevice::new("cpu")).unwrap();
//! view.redraw();
//! assert_eq!(view.layer().unwrap().frames_presented(), 1);
//! ```

pub mod backend;
pub mod config;
pub mod renderer;
pub mod surface;
