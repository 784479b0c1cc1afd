//! Frame subsystem: storage, handles, the frame waker and the resume chain.

pub(crate) mod context;
pub(crate) mod frame;
pub(crate) mod handle;
pub(crate) mod waker;

pub use frame::OwnedFrame;
pub use handle::{FrameHandle, PromiseHandle};

/// Resumes `start`, then every frame it transfers control to.
///
/// Transfers are run one after another from this loop rather than by nested
/// calls, so a chain of tasks awaiting tasks unwinds in constant stack depth.
///
/// # Safety
/// `start` and every frame transferred to must be alive.
pub(crate) unsafe fn resume_chain(start: FrameHandle) {
    context::enter_chain(|| {
        let mut next = Some(start);

        while let Some(handle) = next {
            unsafe { handle.resume_once() };
            next = context::take_scheduled();
        }
    })
}
