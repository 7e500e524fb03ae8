//! Host surface interface
//!
//! The host owns the drawable, the raw event streams and the frame clock.
//! The engine borrows a drawing context from it, subscribes listeners that
//! feed an [`EventSender`], and asks it to schedule frames. When a scheduled
//! frame fires the host calls [`crate::engine::Engine::frame`].

use crate::canvas::Canvas2D;
use crate::error::HostError;
use crate::events::{EventKind, EventSender};
use crate::node::SurfaceSize;

/// Everything the engine needs from the surface it is mounted on
pub trait Host {
    /// 2D drawing context for the drawable
    type Context: Canvas2D;
    /// Identifies a scheduled frame so it can be cancelled
    type FrameHandle;
    /// An attached event listener; handed back to detach it
    type Listener;

    /// The drawable's 2D context, or `None` if the drawable or its
    /// context is unavailable
    fn acquire_context(&mut self) -> Option<Self::Context>;

    /// Size the drawable to the viewport and report the new size
    fn fit_surface(&mut self) -> SurfaceSize;

    /// Wall-clock time in milliseconds
    fn now_ms(&self) -> f64;

    /// Attach a listener that forwards `kind` events into `sender`
    fn subscribe(&mut self, kind: EventKind, sender: EventSender)
    -> Result<Self::Listener, HostError>;

    /// Detach a listener returned by [`Host::subscribe`]
    fn unsubscribe(&mut self, listener: Self::Listener);

    /// Schedule one call of the engine's frame callback
    fn request_frame(&mut self) -> Result<Self::FrameHandle, HostError>;

    /// Cancel a frame that has not fired yet
    fn cancel_frame(&mut self, handle: Self::FrameHandle);
}
