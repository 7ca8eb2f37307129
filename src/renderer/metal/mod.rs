//! Metal backend for macOS
//!
//! Maps the surface seams onto Apple's Metal API and `CAMetalLayer`.

pub mod device;
pub mod layer;
pub mod pass;

pub use device::MetalDevice;
pub use layer::MetalLayer;

use objc2::rc::Retained;
use objc2::runtime::ProtocolObject;
use objc2_metal::{
    MTLCommandBuffer, MTLCommandEncoder, MTLCommandQueue, MTLDevice, MTLDrawable,
    MTLRenderCommandEncoder, MTLRenderPassDescriptor, MTLTexture,
};
use objc2_quartz_core::CAMetalDrawable;

use crate::surface::{Backend, ColorAttachment};

/// Metal backend marker
pub struct MetalBackend;

impl Backend for MetalBackend {
    type Device = MetalDevice;
    type CommandQueue = Retained<ProtocolObject<dyn MTLCommandQueue>>;
    type CommandBuffer = Retained<ProtocolObject<dyn MTLCommandBuffer>>;
    type RenderEncoder = Retained<ProtocolObject<dyn MTLRenderCommandEncoder>>;
    type Texture = Retained<ProtocolObject<dyn MTLTexture>>;
    type Drawable = Retained<ProtocolObject<dyn CAMetalDrawable>>;
    type PassDescriptor = Retained<MTLRenderPassDescriptor>;
    type Layer = MetalLayer;

    fn device_name(device: &MetalDevice) -> String {
        device.name()
    }

    fn new_command_queue(device: &MetalDevice) -> Option<Self::CommandQueue> {
        device.raw().newCommandQueue()
    }

    fn new_command_buffer(queue: &Self::CommandQueue) -> Option<Self::CommandBuffer> {
        queue.commandBuffer()
    }

    fn new_pass_descriptor(attachment: &ColorAttachment) -> Self::PassDescriptor {
        pass::clear_pass_descriptor(attachment)
    }

    fn set_render_target(pass: &mut Self::PassDescriptor, texture: &Self::Texture) {
        pass::set_color_target(pass, texture);
    }

    fn drawable_texture(drawable: &Self::Drawable) -> Self::Texture {
        unsafe { drawable.texture() }
    }

    fn begin_render_pass(
        buffer: &Self::CommandBuffer,
        pass: &Self::PassDescriptor,
    ) -> Option<Self::RenderEncoder> {
        buffer.renderCommandEncoderWithDescriptor(pass)
    }

    fn end_encoding(encoder: Self::RenderEncoder) {
        encoder.endEncoding();
    }

    fn present(buffer: &Self::CommandBuffer, drawable: Self::Drawable) {
        // CAMetalDrawable conforms to MTLDrawable
        let mtl_drawable: &ProtocolObject<dyn MTLDrawable> =
            unsafe { &*(&*drawable as *const _ as *const ProtocolObject<dyn MTLDrawable>) };
        buffer.presentDrawable(mtl_drawable);
    }

    fn commit(buffer: Self::CommandBuffer) {
        buffer.commit();
    }
}
