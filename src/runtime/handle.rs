//! Non-owning references to suspended frames.
//!
//! A [`FrameHandle`] is the erased view of a frame: it can resume, destroy and
//! query a frame without knowing its promise type. A [`PromiseHandle`] carries
//! the promise type as well and can reach the promise stored in the frame.
//!
//! Handles are plain addresses. Copying one never copies the frame, and nothing
//! stops a handle from outliving the frame it points to, which is why the
//! operations that touch the frame are `unsafe`. Owners ([`Generator`],
//! [`Task`], [`OwnedFrame`]) wrap these operations in a safe API.
//!
//! [`Generator`]: crate::Generator
//! [`Task`]: crate::Task
//! [`OwnedFrame`]: crate::OwnedFrame

use crate::promise::Promise;
use crate::runtime::frame::Frame;
use crate::runtime::resume_chain;

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ptr::{self, NonNull};

/// Operations every frame provides through its header.
pub(crate) struct FrameVTable {
    /// Runs the frame up to its next suspension point.
    pub(crate) resume: unsafe fn(NonNull<FrameHeader>),
    /// Releases the frame storage.
    pub(crate) destroy: unsafe fn(NonNull<FrameHeader>),
    /// Reports whether the frame passed its final suspension point.
    pub(crate) done: unsafe fn(NonNull<FrameHeader>) -> bool,
}

/// First field of every frame, so an erased pointer can reach the vtable.
#[repr(C)]
pub(crate) struct FrameHeader {
    pub(crate) vtable: &'static FrameVTable,
}

/// Erased, copyable reference to a suspended frame.
///
/// Two handles are equal when they point at the same frame; ordering and
/// hashing follow the frame address, so handles can key hash and tree maps.
///
/// A handle can only be rebuilt from an untyped address. Handing it any other
/// pointer type is rejected by the compiler:
///
/// ```compile_fail
/// use resumable::FrameHandle;
///
/// let value = 7_u32;
/// let _handle = unsafe { FrameHandle::from_address(&value as *const u32) };
/// ```
#[derive(Clone, Copy, Default)]
pub struct FrameHandle {
    ptr: Option<NonNull<FrameHeader>>,
}

impl FrameHandle {
    /// A handle that refers to no frame.
    pub const fn null() -> Self {
        Self { ptr: None }
    }

    pub(crate) fn from_header(header: NonNull<FrameHeader>) -> Self {
        Self { ptr: Some(header) }
    }

    /// Rebuilds a handle from a value previously returned by [`Self::address`].
    ///
    /// # Safety
    /// `address` must be null or the address of a frame created by this crate.
    pub unsafe fn from_address(address: *mut ()) -> Self {
        Self {
            ptr: NonNull::new(address.cast::<FrameHeader>()),
        }
    }

    /// The frame address, or a null pointer.
    pub fn address(&self) -> *mut () {
        self.ptr
            .map_or(ptr::null_mut(), |header| header.as_ptr().cast::<()>())
    }

    /// Returns true when the handle refers to no frame.
    pub fn is_null(&self) -> bool {
        self.ptr.is_none()
    }

    /// Returns true when the handle refers to the process-wide noop frame.
    pub fn is_noop(&self) -> bool {
        *self == Self::noop()
    }

    /// Resumes the frame at its current suspension point.
    ///
    /// Returns once the frame parks again or finishes, and once every control
    /// transfer requested along the way (awaited tasks starting, finished tasks
    /// resuming their awaiters) has run.
    ///
    /// # Panics
    /// Panics if the handle is null, or if the frame is running or finished.
    ///
    /// # Safety
    /// The frame must not have been destroyed.
    pub unsafe fn resume(self) {
        assert!(!self.is_null(), "resume() called on a null frame handle");

        unsafe { resume_chain(self) }
    }

    /// Releases the frame storage, dropping whatever the body still holds.
    ///
    /// # Panics
    /// Panics if the handle is null or the frame is currently running.
    ///
    /// # Safety
    /// The frame must not have been destroyed, and the caller must be its
    /// owner: no other handle to it may be used afterwards.
    pub unsafe fn destroy(self) {
        let Some(header) = self.ptr else {
            panic!("destroy() called on a null frame handle");
        };

        unsafe { (header.as_ref().vtable.destroy)(header) }
    }

    /// Returns true once the frame has run past its final suspension point.
    ///
    /// # Panics
    /// Panics if the handle is null.
    ///
    /// # Safety
    /// The frame must not have been destroyed.
    pub unsafe fn done(self) -> bool {
        let Some(header) = self.ptr else {
            panic!("done() called on a null frame handle");
        };

        unsafe { (header.as_ref().vtable.done)(header) }
    }

    pub(crate) fn header(self) -> Option<NonNull<FrameHeader>> {
        self.ptr
    }

    // Runs exactly one step of the frame, without draining transfers.
    pub(crate) unsafe fn resume_once(self) {
        if let Some(header) = self.ptr {
            unsafe { (header.as_ref().vtable.resume)(header) }
        }
    }
}

impl PartialEq for FrameHandle {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl Eq for FrameHandle {}

impl PartialOrd for FrameHandle {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrameHandle {
    fn cmp(&self, other: &Self) -> Ordering {
        self.address().cmp(&other.address())
    }
}

impl Hash for FrameHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}

impl fmt::Debug for FrameHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("FrameHandle(null)")
        } else if self.is_noop() {
            f.write_str("FrameHandle(noop)")
        } else {
            write!(f, "FrameHandle({:p})", self.address())
        }
    }
}

/// Frame handle that also knows the frame's promise type.
///
/// Erases into a [`FrameHandle`] with `From`. There is no conversion between
/// handles of different promise types.
pub struct PromiseHandle<P> {
    raw: FrameHandle,
    _promise: PhantomData<*const P>,
}

impl<P: Promise> PromiseHandle<P> {
    pub(crate) fn from_raw(raw: FrameHandle) -> Self {
        Self {
            raw,
            _promise: PhantomData,
        }
    }

    /// The erased handle.
    pub fn raw(&self) -> FrameHandle {
        self.raw
    }

    /// The promise stored in the frame.
    ///
    /// # Panics
    /// Panics if the handle is null.
    ///
    /// # Safety
    /// The frame must not be destroyed while the returned reference is alive,
    /// and it must have been created with promise type `P`.
    pub unsafe fn promise<'a>(&self) -> &'a P {
        let Some(header) = self.raw.ptr else {
            panic!("promise() called on a null frame handle");
        };

        unsafe { header.cast::<Frame<P>>().as_ref().promise() }
    }
}

impl<P> Clone for PromiseHandle<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for PromiseHandle<P> {}

impl<P> PartialEq for PromiseHandle<P> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<P> Eq for PromiseHandle<P> {}

impl<P> Hash for PromiseHandle<P> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<P> From<PromiseHandle<P>> for FrameHandle {
    fn from(handle: PromiseHandle<P>) -> Self {
        handle.raw
    }
}

impl<P> fmt::Debug for PromiseHandle<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PromiseHandle").field(&self.raw).finish()
    }
}
