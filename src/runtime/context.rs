//! Thread-local transfer slot for the active resume chain.
//!
//! When a frame hands control to another frame (an await starting a task, a
//! finished task waking its awaiter), the target cannot be resumed on the spot:
//! the requesting frame is still inside its own poll. Instead the target is
//! parked in this slot and the innermost [`resume_chain`] picks it up once the
//! requesting frame has returned.
//!
//! Each resume chain saves the slot on entry and restores it on exit, including
//! on unwind, so a frame body that drives another generator or task gets a
//! fresh slot and cannot steal its caller's pending transfer.
//!
//! [`resume_chain`]: crate::runtime::resume_chain

use crate::runtime::handle::FrameHandle;

use std::cell::Cell;

thread_local! {
    /// Frame to resume once the current frame has parked or finished.
    static NEXT_FRAME: Cell<Option<FrameHandle>> = const { Cell::new(None) };
}

/// Requests that `handle` be resumed after the current frame returns.
///
/// A frame suspends at one point at a time, so at most one transfer can be
/// pending per chain.
///
/// # Arguments
/// * `handle` - The parked frame to resume next
///
/// # Panics
/// Panics if a transfer is already pending in the current chain.
pub(crate) fn schedule(handle: FrameHandle) {
    NEXT_FRAME.with(|next| {
        let previous = next.replace(Some(handle));

        assert!(
            previous.is_none(),
            "a frame requested two transfers from a single suspension"
        );
    })
}

/// Takes the pending transfer, if any.
///
/// Leaves the slot empty, so each requested transfer runs exactly once.
///
/// # Returns
/// The frame to resume next, or `None` when the chain is over
pub(crate) fn take_scheduled() -> Option<FrameHandle> {
    NEXT_FRAME.with(Cell::take)
}

/// Runs `function` with an empty transfer slot, restoring the previous one
/// afterwards.
///
/// Every resume chain runs inside this scope. A frame body that resumes
/// another generator or task therefore starts a nested chain whose transfers
/// stay separate from the outer one.
///
/// # Arguments
/// * `function` - The chain to run
///
/// # Returns
/// Whatever `function` returns
pub(crate) fn enter_chain<F, R>(function: F) -> R
where
    F: FnOnce() -> R,
{
    let _scope = ChainScope {
        previous: NEXT_FRAME.with(Cell::take),
    };

    function()
}

// Puts the outer chain's pending transfer back, even when unwinding.
struct ChainScope {
    previous: Option<FrameHandle>,
}

impl Drop for ChainScope {
    fn drop(&mut self) {
        NEXT_FRAME.with(|next| next.set(self.previous));
    }
}
