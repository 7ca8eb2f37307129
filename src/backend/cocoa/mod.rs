//! Cocoa backend for macOS
//!
//! This module provides the macOS-specific implementation using:
//! - NSApplication for the application lifecycle
//! - NSWindow hosting the view
//! - NSView whose backing layer is a CAMetalLayer

pub mod app;
pub mod view;
pub mod window;

pub use app::ClearApp;
pub use view::ClearMetalView;
pub use window::ClearWindow;
