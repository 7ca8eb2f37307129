//! Rendering module
//!
//! Backends implementing the surface seams:
//! - `headless`: a CPU renderer that records presented frames
//! - `metal`: Apple's Metal API on macOS

pub mod headless;
#[cfg(target_os = "macos")]
pub mod metal;

pub use headless::HeadlessBackend;

// Re-export the Metal backend on macOS
#[cfg(target_os = "macos")]
pub use metal::{MetalBackend, MetalDevice, MetalLayer};
