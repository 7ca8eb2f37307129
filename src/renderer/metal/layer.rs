//! `CAMetalLayer` wrapper

use objc2::rc::Retained;
use objc2::runtime::ProtocolObject;
use objc2_metal::MTLPixelFormat;
use objc2_quartz_core::{CAMetalDrawable, CAMetalLayer};

use super::{MetalBackend, MetalDevice};
use crate::surface::{PixelFormat, RenderingLayer, ViewId};

/// Backing layer of a Metal view
#[derive(Debug)]
pub struct MetalLayer {
    layer: Retained<CAMetalLayer>,
    pixel_format: PixelFormat,
    delegate: Option<ViewId>,
    device: Option<MetalDevice>,
}

impl MetalLayer {
    /// Get a retained handle to the Metal layer
    pub fn retained(&self) -> Retained<CAMetalLayer> {
        self.layer.clone()
    }
}

fn format_to_metal(format: PixelFormat) -> MTLPixelFormat {
    match format {
        PixelFormat::Bgra8Unorm => MTLPixelFormat::BGRA8Unorm,
    }
}

impl RenderingLayer<MetalBackend> for MetalLayer {
    fn new() -> Self {
        Self {
            layer: unsafe { CAMetalLayer::new() },
            pixel_format: PixelFormat::default(),
            delegate: None,
            device: None,
        }
    }

    fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    fn set_pixel_format(&mut self, format: PixelFormat) {
        unsafe { self.layer.setPixelFormat(format_to_metal(format)) };
        self.pixel_format = format;
    }

    fn delegate(&self) -> Option<ViewId> {
        self.delegate
    }

    // The Objective-C delegate is wired by the owning NSView
    fn set_delegate(&mut self, view: ViewId) {
        self.delegate = Some(view);
    }

    fn device(&self) -> Option<&MetalDevice> {
        self.device.as_ref()
    }

    fn set_device(&mut self, device: MetalDevice) {
        unsafe { self.layer.setDevice(Some(device.raw())) };
        self.device = Some(device);
    }

    fn next_drawable(&self) -> Option<Retained<ProtocolObject<dyn CAMetalDrawable>>> {
        unsafe { self.layer.nextDrawable() }
    }
}
