//! Metal device setup

use log::{debug, info};
use objc2::rc::Retained;
use objc2::runtime::ProtocolObject;
use objc2_metal::{MTLCreateSystemDefaultDevice, MTLDevice};

/// Metal device wrapper
#[derive(Debug, Clone)]
pub struct MetalDevice {
    /// The Metal device
    device: Retained<ProtocolObject<dyn MTLDevice>>,
}

impl MetalDevice {
    /// Get the system default Metal device
    pub fn system_default() -> anyhow::Result<Self> {
        info!("Creating Metal device");

        let device = MTLCreateSystemDefaultDevice()
            .ok_or_else(|| anyhow::anyhow!("Failed to create Metal device"))?;

        debug!("Metal device: {:?}", device.name());

        Ok(Self { device })
    }

    /// Get the raw Metal device
    pub fn raw(&self) -> &ProtocolObject<dyn MTLDevice> {
        &self.device
    }

    /// Get device name
    pub fn name(&self) -> String {
        self.device.name().to_string()
    }
}
