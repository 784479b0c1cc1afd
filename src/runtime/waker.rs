//! Waker that tells an awaiter which frame is polling it.
//!
//! Frames are resumed by their owners and by continuations, never by wake-ups,
//! so waking is a no-op here. What the waker carries is identity: its data
//! pointer is the frame address, which lets [`Await`](crate::Await) find the
//! frame it has to suspend without any extra bookkeeping.

use crate::runtime::handle::FrameHandle;

use std::ptr;
use std::task::{Context, RawWaker, RawWakerVTable, Waker};

use tracing::trace;

/// Virtual method table for frame wakers.
static FRAME_WAKER_VTABLE: RawWakerVTable =
    RawWakerVTable::new(clone_raw, wake_raw, wake_by_ref_raw, drop_raw);

/// Raw waker clone function for the frame vtable.
///
/// The data pointer is the frame address and is never owned, so a clone is a
/// new `RawWaker` around the same address.
fn clone_raw(ptr: *const ()) -> RawWaker {
    RawWaker::new(ptr, &FRAME_WAKER_VTABLE)
}

/// Raw waker wake function for the frame vtable.
///
/// Wake-ups are ignored: a parked frame waits for its owner or continuation.
/// The ignored wake-up is traced with the frame address.
fn wake_raw(ptr: *const ()) {
    trace!(frame = ?ptr, "ignoring wake-up of a cooperative frame");
}

/// Raw waker wake-by-reference function. Same as [`wake_raw`].
fn wake_by_ref_raw(ptr: *const ()) {
    wake_raw(ptr);
}

fn drop_raw(_: *const ()) {}

/// Creates the waker a frame is polled with.
///
/// # Arguments
/// * `handle` - The frame being resumed
///
/// # Returns
/// A `Waker` whose data pointer is the frame address
pub(crate) fn frame_waker(handle: FrameHandle) -> Waker {
    let raw = RawWaker::new(handle.address() as *const (), &FRAME_WAKER_VTABLE);

    // SAFETY: every vtable function ignores or copies the pointer, never
    // dereferences it.
    unsafe { Waker::from_raw(raw) }
}

/// Returns the frame being polled, if `cx` comes from a frame.
///
/// The waker is recognized by its vtable, then its data pointer is read back
/// as a frame address.
///
/// # Arguments
/// * `cx` - The context the current future is polled with
///
/// # Returns
/// The polling frame, or `None` for futures polled by a foreign executor
pub(crate) fn frame_of(cx: &Context<'_>) -> Option<FrameHandle> {
    let waker = cx.waker();

    if !ptr::eq(waker.vtable(), &FRAME_WAKER_VTABLE) {
        return None;
    }

    // SAFETY: frame wakers are only built from frame addresses, and the frame
    // is alive while it is being polled.
    Some(unsafe { FrameHandle::from_address(waker.data() as *mut ()) })
}
