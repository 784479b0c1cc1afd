//! Per-frame policy objects.

use crate::runtime::{FrameHandle, OwnedFrame};
use crate::suspend::Awaiter;

use std::any::Any;
use std::panic;

/// Customizes how a frame starts, ends and fails.
///
/// The promise lives inside the frame for the frame's whole lifetime. The
/// runtime consults it at three points:
///
/// - before any body code runs ([`initial_suspend`](Self::initial_suspend)),
/// - after the body returns ([`final_suspend`](Self::final_suspend)),
/// - when the body panics ([`unhandled_panic`](Self::unhandled_panic)).
pub trait Promise: 'static {
    /// Awaited before the body starts.
    type InitialSuspend: Awaiter<Output = ()>;

    /// Awaited after the body ends.
    type FinalSuspend: Awaiter<Output = ()>;

    fn initial_suspend(&self) -> Self::InitialSuspend;

    fn final_suspend(&self) -> Self::FinalSuspend;

    /// Receives a panic raised by the body. The frame is already finished.
    ///
    /// The default rethrows, so the panic surfaces from the resume call that
    /// ran the failing step. When an implementation returns instead, the final
    /// suspension runs next, as if the body had returned.
    fn unhandled_panic(&self, payload: Box<dyn Any + Send>) {
        panic::resume_unwind(payload)
    }
}

/// A value that owns exactly one frame.
///
/// [`from_frame`](Self::from_frame) plays the role of the promise's result
/// object: it is what a suspending function hands back to its caller.
pub trait FrameOwner: Sized {
    type Promise: Promise;

    /// Wraps a freshly created frame.
    fn from_frame(frame: OwnedFrame<Self::Promise>) -> Self;

    /// The owned frame, or `None` when ownership was given away.
    fn frame(&self) -> Option<&OwnedFrame<Self::Promise>>;

    /// Non-owning handle to the frame; null when nothing is owned.
    fn handle(&self) -> FrameHandle {
        self.frame().map_or(FrameHandle::null(), OwnedFrame::raw)
    }

    /// Returns true when the frame has finished or nothing is owned.
    fn is_done(&self) -> bool {
        self.frame().is_none_or(OwnedFrame::is_done)
    }
}
