//! Backend module
//!
//! Platform windowing backends. Only Cocoa on macOS is provided; other
//! hosts drive a headless surface directly.

#[cfg(target_os = "macos")]
pub mod cocoa;
