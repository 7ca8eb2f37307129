//! Surface errors

/// Errors raised while binding a device to a surface
///
/// Redrawing never fails; an unavailable resource skips the frame instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    #[error("view has no backing layer yet")]
    NoBackingLayer,
    #[error("device could not create a command queue")]
    CommandQueueUnavailable,
    #[error("view is already handling a host callback")]
    Busy,
}
