//! Surface core
//!
//! This module contains the platform independent part of the view:
//! - The `Backend` and `RenderingLayer` seams a graphics host implements
//! - Render pass configuration types (clear color, load/store actions)
//! - `SurfaceView`, which owns the layer and drives the clear/present cycle
//! - `SharedSurface`, the re-entrancy safe handle host callbacks go through

pub mod backend;
pub mod error;
pub mod shared;
pub mod types;
pub mod view;

pub use backend::{Backend, RenderingLayer};
pub use error::SurfaceError;
pub use shared::SharedSurface;
pub use types::{ClearColor, ColorAttachment, LoadAction, PixelFormat, StoreAction, ViewId};
pub use view::{LayerRedrawPolicy, ResourcePolicy, SurfaceLifecycle, SurfaceView};
