//! Layer-owning view and its clear/present cycle

use log::{debug, info, warn};

use super::backend::{Backend, RenderingLayer};
use super::error::SurfaceError;
use super::types::{ColorAttachment, PixelFormat, ViewId};
use crate::config::SurfaceConfig;

/// Lifetime of the command queue and pass descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResourcePolicy {
    /// Derive a queue from the layer's device and build a descriptor on every redraw
    PerFrame,
    /// Build queue and descriptor once when a device is assigned
    #[default]
    Cached,
}

/// How the host treats layer contents while the view is resized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerRedrawPolicy {
    /// Scale the previous frame
    Never,
    /// Regenerate contents on every resize
    DuringViewResize,
}

/// Lifecycle hooks a windowing host invokes on a layer-backed view
pub trait SurfaceLifecycle {
    type Layer;

    /// The host needs a composited layer for this view
    fn on_attach_to_surface(&mut self) -> &Self::Layer;

    /// The view was attached to or detached from a window
    fn on_move_to_display(&mut self);
}

/// Backing layer, detached until the host asks for one
struct LayerSlot<L> {
    attached: Option<L>,
}

impl<L> LayerSlot<L> {
    fn detached() -> Self {
        Self { attached: None }
    }

    fn is_attached(&self) -> bool {
        self.attached.is_some()
    }

    /// Attach `layer`, dropping any previous one
    fn attach(&mut self, layer: L) -> &L {
        self.attached.insert(layer)
    }

    fn get(&self) -> Option<&L> {
        self.attached.as_ref()
    }

    fn get_mut(&mut self) -> Option<&mut L> {
        self.attached.as_mut()
    }
}

enum FrameResources<B: Backend> {
    Uninitialized,
    Ready {
        queue: B::CommandQueue,
        pass: B::PassDescriptor,
    },
}

/// A window-embedded drawing surface
///
/// Owns the rendering layer once the host asked for one and clears the
/// layer's next drawable to a fixed color on every redraw. A frame whose
/// resources are unavailable is skipped without error.
pub struct SurfaceView<B: Backend> {
    id: ViewId,
    config: SurfaceConfig,
    layer: LayerSlot<B::Layer>,
    resources: FrameResources<B>,
}

impl<B: Backend> SurfaceView<B> {
    /// Create a view with no layer and no device
    pub fn new(config: SurfaceConfig) -> Self {
        Self {
            id: ViewId::new(),
            config,
            layer: LayerSlot::detached(),
            resources: FrameResources::Uninitialized,
        }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn policy(&self) -> ResourcePolicy {
        self.config.policy
    }

    /// The view always asks the host for a backing layer
    pub fn wants_layer(&self) -> bool {
        true
    }

    pub fn redraw_policy(&self) -> LayerRedrawPolicy {
        LayerRedrawPolicy::DuringViewResize
    }

    /// The backing layer, if the host has requested one
    pub fn layer(&self) -> Option<&B::Layer> {
        self.layer.get()
    }

    /// Whether a queue and pass descriptor are cached
    pub fn has_cached_resources(&self) -> bool {
        matches!(self.resources, FrameResources::Ready { .. })
    }

    /// Bind a rendering device to the backing layer
    ///
    /// With [`ResourcePolicy::Cached`] this also builds the command queue and
    /// pass descriptor, replacing any built by an earlier call. If the device
    /// cannot create a queue the previous cache is discarded as well, so no
    /// frame is rendered until a working device is assigned.
    pub fn assign_device(&mut self, device: B::Device) -> Result<(), SurfaceError> {
        let layer = self.layer.get_mut().ok_or(SurfaceError::NoBackingLayer)?;
        let name = B::device_name(&device);

        let queue = match self.config.policy {
            ResourcePolicy::Cached => B::new_command_queue(&device),
            ResourcePolicy::PerFrame => None,
        };

        layer.set_device(device);
        info!("Device {} has been set to {}", name, self.id);

        if self.config.policy == ResourcePolicy::Cached {
            // Resources built on the previous device must not outlive it
            self.resources = FrameResources::Uninitialized;
            let queue = queue.ok_or(SurfaceError::CommandQueueUnavailable)?;
            let pass = B::new_pass_descriptor(&self.attachment());
            self.resources = FrameResources::Ready { queue, pass };
            debug!("Cached command queue and pass descriptor for {}", self.id);
        }

        Ok(())
    }

    /// Clear the next drawable and present it
    pub fn redraw(&mut self) {
        let Some(layer) = self.layer.get() else {
            debug!("Skipping frame for {}: no backing layer", self.id);
            return;
        };

        match self.config.policy {
            ResourcePolicy::PerFrame => {
                let Some(device) = layer.device() else {
                    debug!("Skipping frame for {}: no device", self.id);
                    return;
                };
                let Some(queue) = B::new_command_queue(device) else {
                    debug!("Skipping frame for {}: no command queue", self.id);
                    return;
                };
                let Some(drawable) = layer.next_drawable() else {
                    debug!("Skipping frame for {}: no drawable", self.id);
                    return;
                };
                let mut pass = B::new_pass_descriptor(&self.attachment());
                encode_clear::<B>(self.id, &queue, &mut pass, drawable);
            }
            ResourcePolicy::Cached => {
                let FrameResources::Ready { queue, pass } = &mut self.resources else {
                    debug!("Skipping frame for {}: no cached command queue", self.id);
                    return;
                };
                let Some(drawable) = layer.next_drawable() else {
                    debug!("Skipping frame for {}: no drawable", self.id);
                    return;
                };
                encode_clear::<B>(self.id, queue, pass, drawable);
            }
        }
    }

    fn attachment(&self) -> ColorAttachment {
        ColorAttachment::clearing(self.config.clear_color)
    }
}

impl<B: Backend> SurfaceLifecycle for SurfaceView<B> {
    type Layer = B::Layer;

    fn on_attach_to_surface(&mut self) -> &B::Layer {
        let mut layer = <B::Layer as RenderingLayer<B>>::new();
        layer.set_pixel_format(PixelFormat::Bgra8Unorm);
        layer.set_delegate(self.id);

        if self.layer.is_attached() {
            warn!("Replacing existing backing layer of {}", self.id);
        } else {
            debug!("Created backing layer for {}", self.id);
        }

        self.layer.attach(layer)
    }

    fn on_move_to_display(&mut self) {
        self.redraw();
    }
}

/// Encode an empty clearing pass into `drawable`, present it and commit
fn encode_clear<B: Backend>(
    view: ViewId,
    queue: &B::CommandQueue,
    pass: &mut B::PassDescriptor,
    drawable: B::Drawable,
) {
    let texture = B::drawable_texture(&drawable);
    B::set_render_target(pass, &texture);

    let Some(buffer) = B::new_command_buffer(queue) else {
        debug!("Skipping frame for {}: no command buffer", view);
        return;
    };
    let Some(encoder) = B::begin_render_pass(&buffer, pass) else {
        debug!("Skipping frame for {}: no render encoder", view);
        return;
    };
    B::end_encoding(encoder);

    B::present(&buffer, drawable);
    B::commit(buffer);
}
