//! Heap-resident frame storage and the owner that releases it.
//!
//! A frame pairs the compiler-generated state machine of an `async` body with a
//! promise. Resuming a frame polls the body once under a waker that identifies
//! the frame; the body either parks (`Poll::Pending`) or runs to its end, at
//! which point the promise's final-suspension awaiter decides where control
//! goes next.

use crate::promise::Promise;
use crate::runtime::context;
use crate::runtime::handle::{FrameHandle, FrameHeader, FrameVTable, PromiseHandle};
use crate::runtime::waker::frame_waker;
use crate::suspend::{Awaiter, Transfer};

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::ptr::NonNull;
use std::rc::Rc;
use std::task::{Context, Poll};

use tracing::{debug, trace, trace_span, warn};

type Body = Pin<Box<dyn Future<Output = ()>>>;

/// Lifecycle of a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FrameState {
    /// Parked at a suspension point, ready to be resumed.
    Suspended,
    /// Being polled right now.
    Running,
    /// Past the final suspension point. The body has been dropped.
    Finished,
}

#[repr(C)]
pub(crate) struct Frame<P: Promise> {
    header: FrameHeader,
    state: Cell<FrameState>,
    name: Option<Cow<'static, str>>,
    promise: Rc<P>,
    body: RefCell<Option<Body>>,
}

impl<P: Promise> Frame<P> {
    const VTABLE: FrameVTable = FrameVTable {
        resume: Self::resume_raw,
        destroy: Self::destroy_raw,
        done: Self::done_raw,
    };

    pub(crate) fn promise(&self) -> &P {
        &self.promise
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }

    unsafe fn resume_raw(header: NonNull<FrameHeader>) {
        let frame = unsafe { header.cast::<Self>().as_ref() };
        let handle = FrameHandle::from_header(header);

        assert_eq!(
            frame.state.get(),
            FrameState::Suspended,
            "resume() called on a frame that is not parked"
        );

        let _span = trace_span!("frame", frame = ?handle, label = frame.label()).entered();
        frame.state.set(FrameState::Running);
        trace!("resuming");

        let outcome = {
            let mut slot = frame.body.borrow_mut();
            let Some(body) = slot.as_mut() else {
                unreachable!("suspended frame without a body");
            };

            let waker = frame_waker(handle);
            let mut cx = Context::from_waker(&waker);

            panic::catch_unwind(AssertUnwindSafe(|| body.as_mut().poll(&mut cx)))
        };

        match outcome {
            Ok(Poll::Pending) => {
                frame.state.set(FrameState::Suspended);
                trace!("parked");
            }
            Ok(Poll::Ready(())) => {
                frame.finish();
                debug!("frame ran to completion");

                frame.final_suspend(handle);
            }
            Err(payload) => {
                frame.finish();
                warn!("frame body panicked");

                frame.promise.unhandled_panic(payload);
                frame.final_suspend(handle);
            }
        }
    }

    // Runs only when the promise did not rethrow a panic.
    fn final_suspend(&self, handle: FrameHandle) {
        let mut last = self.promise.final_suspend();
        if !last.await_ready()
            && let Transfer::Resume(next) = last.await_suspend(handle)
        {
            trace!(next = ?next, "transferring from final suspension");
            context::schedule(next);
        }
    }

    unsafe fn destroy_raw(header: NonNull<FrameHeader>) {
        let frame = unsafe { header.cast::<Self>().as_ref() };

        assert_ne!(
            frame.state.get(),
            FrameState::Running,
            "destroy() called on a running frame"
        );
        trace!(
            frame = ?FrameHandle::from_header(header),
            label = frame.label(),
            "destroying frame"
        );

        drop(unsafe { Box::from_raw(header.cast::<Self>().as_ptr()) });
    }

    unsafe fn done_raw(header: NonNull<FrameHeader>) -> bool {
        let frame = unsafe { header.cast::<Self>().as_ref() };

        frame.state.get() == FrameState::Finished
    }

    // Drops the body outside the borrow: it may own other frames.
    fn finish(&self) {
        self.state.set(FrameState::Finished);
        let body = self.body.borrow_mut().take();
        drop(body);
    }
}

/// Sole owner of a frame.
///
/// Creating an `OwnedFrame` allocates the frame and runs the promise's
/// initial-suspension policy; dropping it destroys the frame. This is the
/// building block for [`Generator`](crate::Generator) and
/// [`Task`](crate::Task), and for frames with custom promise types.
pub struct OwnedFrame<P: Promise> {
    handle: PromiseHandle<P>,
}

impl<P: Promise> OwnedFrame<P> {
    /// Allocates a frame around `body` and applies the initial suspension.
    ///
    /// With a lazy policy ([`SuspendAlways`](crate::SuspendAlways)) no body code
    /// runs until the first resume. With an eager one
    /// ([`SuspendNever`](crate::SuspendNever)) the body runs here up to its
    /// first suspension point.
    pub fn new<F>(promise: Rc<P>, body: F, name: Option<Cow<'static, str>>) -> Self
    where
        F: Future<Output = ()> + 'static,
    {
        let frame = Box::new(Frame {
            header: FrameHeader {
                vtable: &Frame::<P>::VTABLE,
            },
            state: Cell::new(FrameState::Suspended),
            name,
            promise,
            body: RefCell::new(Some(Box::pin(body) as Body)),
        });

        let header = NonNull::from(Box::leak(frame)).cast::<FrameHeader>();
        let owned = Self {
            handle: PromiseHandle::from_raw(FrameHandle::from_header(header)),
        };
        trace!(frame = ?owned.raw(), label = ?owned.name(), "allocated frame");

        let mut initial = owned.promise().initial_suspend();
        if initial.await_ready() {
            owned.resume();
        } else if let Transfer::Resume(next) = initial.await_suspend(owned.raw()) {
            // SAFETY: `Awaiter` implementors only hand out live, parked frames.
            unsafe { next.resume() };
        }

        owned
    }

    /// The typed handle of the owned frame.
    pub fn handle(&self) -> PromiseHandle<P> {
        self.handle
    }

    /// The erased handle of the owned frame.
    pub fn raw(&self) -> FrameHandle {
        self.handle.raw()
    }

    /// The promise stored in the frame.
    pub fn promise(&self) -> &P {
        // SAFETY: the frame lives until `self` is dropped.
        unsafe { self.handle.promise() }
    }

    /// The name given through [`Builder::name`](crate::Builder::name).
    pub fn name(&self) -> Option<&str> {
        self.frame().name.as_deref()
    }

    /// Returns true once the body has run past its final suspension point.
    pub fn is_done(&self) -> bool {
        self.frame().state.get() == FrameState::Finished
    }

    /// Resumes the frame, draining any transfers it requests.
    ///
    /// # Panics
    /// Panics if the frame is running or finished, and rethrows a body panic
    /// when the promise chooses to.
    pub fn resume(&self) {
        // SAFETY: the frame lives until `self` is dropped.
        unsafe { self.raw().resume() }
    }

    fn frame(&self) -> &Frame<P> {
        let Some(header) = self.raw().header() else {
            unreachable!("owned frame with a null handle");
        };

        // SAFETY: the frame lives until `self` is dropped.
        unsafe { header.cast::<Frame<P>>().as_ref() }
    }
}

impl<P: Promise> Drop for OwnedFrame<P> {
    fn drop(&mut self) {
        // SAFETY: this is the only owner, and the frame has not been destroyed.
        unsafe { self.raw().destroy() }
    }
}

impl<P: Promise> fmt::Debug for OwnedFrame<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedFrame")
            .field("handle", &self.raw())
            .field("name", &self.name())
            .field("state", &self.frame().state.get())
            .finish()
    }
}
