//! Graphics host seams
//!
//! A `Backend` bundles the command objects of one graphics API. The view
//! only ever talks to the host through these two traits, so the same
//! clear/present cycle drives Metal on macOS and the headless renderer
//! everywhere else.

use super::types::{ColorAttachment, PixelFormat, ViewId};

/// Command submission objects of a graphics API
pub trait Backend: Sized {
    /// Rendering device
    type Device;
    /// Command queue created from a device
    type CommandQueue;
    /// One-shot command buffer created from a queue
    type CommandBuffer;
    /// Render command encoder for a single pass
    type RenderEncoder;
    /// Render target texture
    type Texture;
    /// One-shot presentable drawable
    type Drawable;
    /// Reusable render pass descriptor with one color attachment
    type PassDescriptor;
    /// Compositor-facing surface handing out drawables
    type Layer: RenderingLayer<Self>;

    /// Human readable device name
    fn device_name(device: &Self::Device) -> String;

    /// Create a command queue on `device`
    fn new_command_queue(device: &Self::Device) -> Option<Self::CommandQueue>;

    /// Create a command buffer on `queue`
    fn new_command_buffer(queue: &Self::CommandQueue) -> Option<Self::CommandBuffer>;

    /// Create a pass descriptor whose color attachment 0 uses `attachment`
    fn new_pass_descriptor(attachment: &ColorAttachment) -> Self::PassDescriptor;

    /// Point color attachment 0 of `pass` at `texture`
    fn set_render_target(pass: &mut Self::PassDescriptor, texture: &Self::Texture);

    /// Texture backing a drawable
    fn drawable_texture(drawable: &Self::Drawable) -> Self::Texture;

    /// Begin a render pass described by `pass`
    fn begin_render_pass(
        buffer: &Self::CommandBuffer,
        pass: &Self::PassDescriptor,
    ) -> Option<Self::RenderEncoder>;

    /// Finish encoding a pass
    fn end_encoding(encoder: Self::RenderEncoder);

    /// Schedule `drawable` for presentation once `buffer` completes
    fn present(buffer: &Self::CommandBuffer, drawable: Self::Drawable);

    /// Submit `buffer` for execution without waiting on it
    fn commit(buffer: Self::CommandBuffer);
}

/// Compositor surface owned by a view
pub trait RenderingLayer<B: Backend> {
    /// Create an unconfigured layer
    fn new() -> Self;

    fn pixel_format(&self) -> PixelFormat;

    fn set_pixel_format(&mut self, format: PixelFormat);

    /// View registered for layout and redraw callbacks
    fn delegate(&self) -> Option<ViewId>;

    fn set_delegate(&mut self, view: ViewId);

    /// Device drawables are allocated on, absent until assigned
    fn device(&self) -> Option<&B::Device>;

    fn set_device(&mut self, device: B::Device);

    /// Next free drawable, absent while the surface is hidden or busy
    fn next_drawable(&self) -> Option<B::Drawable>;
}
