//! Suspension points and the awaiter contract.
//!
//! Every `.await` inside a frame body that involves this runtime goes through
//! an [`Awaiter`]: it is asked whether it is already ready, then told which
//! frame is suspending, then asked for the value the frame resumes with.
//! [`Await`] adapts that three-step contract to Rust's `Future`.
//!
//! [`SuspendNever`] and [`SuspendAlways`] are the two trivial policies. Promises
//! use them for their initial and final suspension points, and bodies can await
//! them directly:
//!
//! ```
//! use resumable::{SuspendAlways, Task};
//!
//! let mut task = Task::new(async {
//!     SuspendAlways.await;
//!     7
//! });
//!
//! task.resume().unwrap();
//! assert!(!task.is_done());
//! task.resume().unwrap();
//! assert_eq!(task.take_output(), Some(7));
//! ```

use crate::runtime::waker::frame_of;
use crate::runtime::{FrameHandle, context};

use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::task::{Context, Poll};

/// Where control goes after a frame suspends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transfer {
    /// Return to whoever resumed the suspending frame.
    Park,
    /// Resume this frame once the suspending one has parked.
    Resume(FrameHandle),
}

/// The three-part contract a frame consults at a suspension point.
///
/// # Safety
/// Any handle returned in [`Transfer::Resume`] must refer to a live frame that
/// is parked and not finished by the time the suspending frame has returned.
pub unsafe trait Awaiter {
    /// Value produced when the frame resumes.
    type Output;

    /// Returns true when suspending is unnecessary.
    fn await_ready(&self) -> bool;

    /// Called once the frame `awaiting` is committed to suspending.
    fn await_suspend(&mut self, awaiting: FrameHandle) -> Transfer;

    /// Produces the result of the await.
    fn await_resume(&mut self) -> Self::Output;
}

/// Suspension point that never suspends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SuspendNever;

// SAFETY: never transfers control.
unsafe impl Awaiter for SuspendNever {
    type Output = ();

    fn await_ready(&self) -> bool {
        true
    }

    fn await_suspend(&mut self, _awaiting: FrameHandle) -> Transfer {
        Transfer::Park
    }

    fn await_resume(&mut self) {}
}

impl IntoFuture for SuspendNever {
    type Output = ();
    type IntoFuture = Await<Self>;

    fn into_future(self) -> Self::IntoFuture {
        Await::new(self)
    }
}

/// Suspension point that always parks the frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SuspendAlways;

// SAFETY: never transfers control.
unsafe impl Awaiter for SuspendAlways {
    type Output = ();

    fn await_ready(&self) -> bool {
        false
    }

    fn await_suspend(&mut self, _awaiting: FrameHandle) -> Transfer {
        Transfer::Park
    }

    fn await_resume(&mut self) {}
}

impl IntoFuture for SuspendAlways {
    type Output = ();
    type IntoFuture = Await<Self>;

    fn into_future(self) -> Self::IntoFuture {
        Await::new(self)
    }
}

/// Parks the current frame once, handing control back to its resumer.
///
/// Outside a frame this behaves like a cooperative yield: the future wakes
/// itself and completes on the next poll.
pub fn suspend_always() -> Await<SuspendAlways> {
    Await::new(SuspendAlways)
}

/// Completes immediately without suspending.
pub fn suspend_never() -> Await<SuspendNever> {
    Await::new(SuspendNever)
}

/// Future driving an [`Awaiter`] through one suspension.
///
/// Inside a frame body, the first poll either completes (the awaiter is
/// ready) or suspends the frame and schedules the awaiter's transfer; the
/// next poll, which happens when the frame is resumed, produces the output.
///
/// Polled by a foreign executor there is no frame to park, so the awaiter is
/// told the noop frame is suspending, its transfer runs inline, and the
/// future wakes itself to complete on the next poll.
#[must_use = "an awaiter does nothing unless awaited"]
#[derive(Debug)]
pub struct Await<A> {
    awaiter: A,
    suspended: bool,
}

impl<A: Awaiter> Await<A> {
    /// Wraps an awaiter.
    pub fn new(awaiter: A) -> Self {
        Self {
            awaiter,
            suspended: false,
        }
    }
}

impl<A: Awaiter + Unpin> Future for Await<A> {
    type Output = A::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if this.suspended || this.awaiter.await_ready() {
            this.suspended = false;
            return Poll::Ready(this.awaiter.await_resume());
        }

        this.suspended = true;

        match frame_of(cx) {
            Some(frame) => {
                if let Transfer::Resume(next) = this.awaiter.await_suspend(frame) {
                    context::schedule(next);
                }
            }
            None => {
                if let Transfer::Resume(next) = this.awaiter.await_suspend(FrameHandle::noop()) {
                    // SAFETY: `Awaiter` implementors only hand out live, parked frames.
                    unsafe { next.resume() };
                }
                cx.waker().wake_by_ref();
            }
        }

        Poll::Pending
    }
}
