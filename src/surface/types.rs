//! Render pass and layer configuration types

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for views
///
/// A layer remembers the id of the view registered as its delegate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(pub u64);

impl ViewId {
    pub(crate) fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        ViewId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

/// Pixel format of a layer's drawables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// 32-bit BGRA, unsigned normalized
    #[default]
    Bgra8Unorm,
}

impl PixelFormat {
    /// Bytes per pixel
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Bgra8Unorm => 4,
        }
    }
}

/// Color a render target is cleared to at the start of a pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearColor {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl ClearColor {
    /// Opaque-red channels with zero alpha
    pub const RED: ClearColor = ClearColor::new(1.0, 0.0, 0.0, 0.0);

    pub const fn new(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Quantize to a BGRA8 unorm pixel
    pub fn to_bgra8(self) -> [u8; 4] {
        fn unorm(channel: f64) -> u8 {
            (channel.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        [
            unorm(self.blue),
            unorm(self.green),
            unorm(self.red),
            unorm(self.alpha),
        ]
    }
}

impl Default for ClearColor {
    fn default() -> Self {
        Self::RED
    }
}

/// How an attachment's previous contents are treated when a pass begins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadAction {
    DontCare,
    Load,
    Clear,
}

/// How an attachment's contents are treated when a pass ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreAction {
    DontCare,
    Store,
}

/// Configuration of color attachment 0 of the clear pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorAttachment {
    pub clear_color: ClearColor,
    pub load_action: LoadAction,
    pub store_action: StoreAction,
}

impl ColorAttachment {
    /// Attachment that clears to `clear_color` and stores the result
    pub fn clearing(clear_color: ClearColor) -> Self {
        Self {
            clear_color,
            load_action: LoadAction::Clear,
            store_action: StoreAction::Store,
        }
    }
}

impl Default for ColorAttachment {
    fn default() -> Self {
        Self::clearing(ClearColor::RED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_id_unique() {
        let id1 = ViewId::new();
        let id2 = ViewId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_red_to_bgra8() {
        assert_eq!(ClearColor::RED.to_bgra8(), [0, 0, 255, 0]);
    }

    #[test]
    fn test_out_of_range_channels_clamp() {
        let color = ClearColor::new(2.0, -1.0, 0.5, 1.0);
        assert_eq!(color.to_bgra8(), [128, 0, 255, 255]);
    }

    #[test]
    fn test_default_attachment() {
        let attachment = ColorAttachment::default();
        assert_eq!(attachment.clear_color, ClearColor::RED);
        assert_eq!(attachment.load_action, LoadAction::Clear);
        assert_eq!(attachment.store_action, StoreAction::Store);
    }
}
