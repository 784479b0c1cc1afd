//! The process-wide noop frame.
//!
//! It is never done, and resuming or destroying it does nothing. A task's
//! continuation starts out as this frame, so a task nobody awaits can finish
//! without special-casing a missing continuation.

use crate::runtime::FrameHandle;
use crate::runtime::handle::{FrameHeader, FrameVTable};

use std::ptr::NonNull;

static NOOP_VTABLE: FrameVTable = FrameVTable {
    resume: noop_resume,
    destroy: noop_destroy,
    done: noop_done,
};

static NOOP_FRAME: FrameHeader = FrameHeader {
    vtable: &NOOP_VTABLE,
};

static NOOP_PROMISE: NoopPromise = NoopPromise;

unsafe fn noop_resume(_: NonNull<FrameHeader>) {}

unsafe fn noop_destroy(_: NonNull<FrameHeader>) {}

unsafe fn noop_done(_: NonNull<FrameHeader>) -> bool {
    false
}

/// Promise type of the noop frame. It holds nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoopPromise;

/// Handle to the noop frame, with safe operations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NoopHandle;

impl NoopHandle {
    /// Always valid.
    pub fn is_valid(&self) -> bool {
        true
    }

    /// Never done.
    pub fn done(&self) -> bool {
        false
    }

    /// Does nothing.
    pub fn resume(&self) {}

    /// Does nothing.
    pub fn destroy(&self) {}

    pub fn promise(&self) -> &'static NoopPromise {
        &NOOP_PROMISE
    }

    /// The erased handle, equal to [`FrameHandle::noop`].
    pub fn raw(&self) -> FrameHandle {
        FrameHandle::from_header(NonNull::from(&NOOP_FRAME))
    }
}

impl From<NoopHandle> for FrameHandle {
    fn from(handle: NoopHandle) -> Self {
        handle.raw()
    }
}

/// Returns the handle to the noop frame.
pub fn noop_frame() -> NoopHandle {
    NoopHandle
}

impl FrameHandle {
    /// The erased handle of the noop frame.
    pub fn noop() -> Self {
        NoopHandle.raw()
    }
}
