//! Lazy tasks that resume whoever awaited them.
//!
//! A task owns a frame that does nothing until the task is awaited. Awaiting a
//! task from inside another frame records that frame as the task's
//! continuation, parks it, and starts the task. When the task's body returns,
//! its final suspension hands control straight back to the continuation, so
//! chains of tasks awaiting tasks unwind without anyone polling for
//! completion.
//!
//! ```
//! use resumable::Task;
//!
//! fn leaf(x: u32) -> Task<u32> {
//!     Task::new(async move { x * 2 })
//! }
//!
//! fn root() -> Task<u32> {
//!     Task::new(async {
//!         let a = leaf(1).await;
//!         let b = leaf(20).await;
//!         a + b
//!     })
//! }
//!
//! let mut task = root();
//! task.resume().unwrap();
//! assert_eq!(task.take_output(), Some(42));
//! ```
//!
//! # How awaiting works
//!
//! 1. The awaiting frame polls the task's awaiter, which stores the frame's
//!    handle in the task's promise and asks for control to move to the task.
//! 2. The awaiting frame parks; the resume chain starts the task's frame.
//! 3. The task runs, possibly awaiting further tasks the same way.
//! 4. The task's body returns; its final awaiter moves control to the stored
//!    continuation, which picks up the task's output and carries on.
//!
//! A panic in an awaited task takes the same route: the task keeps the payload,
//! control moves to the continuation, and the awaiting body rethrows it from
//! its `.await`. Every frame on the chain finishes, and each applies its own
//! panic policy. A task nobody awaits rethrows from [`Task::resume`].

use crate::builder::Builder;
use crate::error::{FrameError, Result};
use crate::promise::{FrameOwner, Promise};
use crate::runtime::{FrameHandle, OwnedFrame};
use crate::suspend::{Await, Awaiter, SuspendAlways, Transfer};

use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::future::{Future, IntoFuture};
use std::panic;
use std::rc::Rc;

/// Promise of a task frame: the continuation to resume, the output, and a
/// panic waiting to be rethrown in the awaiting frame.
pub struct TaskPromise<T> {
    continuation: Cell<FrameHandle>,
    output: Cell<Option<T>>,
    panic: Cell<Option<Box<dyn Any + Send>>>,
}

impl<T> TaskPromise<T> {
    fn new() -> Self {
        Self {
            continuation: Cell::new(FrameHandle::noop()),
            output: Cell::new(None),
            panic: Cell::new(None),
        }
    }

    /// Records the frame to resume once the task finishes.
    pub fn set_continuation(&self, continuation: FrameHandle) {
        self.continuation.set(continuation);
    }

    /// The frame that will be resumed once the task finishes.
    pub fn continuation(&self) -> FrameHandle {
        self.continuation.get()
    }

    fn return_value(&self, value: T) {
        self.output.set(Some(value));
    }

    fn take_output(&self) -> Option<T> {
        self.output.take()
    }

    fn take_panic(&self) -> Option<Box<dyn Any + Send>> {
        self.panic.take()
    }
}

impl<T: 'static> Promise for TaskPromise<T> {
    type InitialSuspend = SuspendAlways;
    type FinalSuspend = FinalAwaiter;

    fn initial_suspend(&self) -> SuspendAlways {
        SuspendAlways
    }

    // The continuation is read once; later completions go nowhere.
    fn final_suspend(&self) -> FinalAwaiter {
        FinalAwaiter {
            continuation: self.continuation.replace(FrameHandle::noop()),
        }
    }

    // A root task rethrows at its own resume. An awaited one keeps the panic
    // for its awaiter, which rethrows it from inside its own body.
    fn unhandled_panic(&self, payload: Box<dyn Any + Send>) {
        if self.continuation.get().is_noop() {
            panic::resume_unwind(payload);
        }

        self.panic.set(Some(payload));
    }
}

/// Final suspension of a task: transfers control to the continuation.
#[derive(Debug)]
pub struct FinalAwaiter {
    continuation: FrameHandle,
}

// SAFETY: the continuation is the frame that awaited the task. It stays parked
// until this transfer resumes it, and it owns the task, so it outlives it.
unsafe impl Awaiter for FinalAwaiter {
    type Output = ();

    fn await_ready(&self) -> bool {
        false
    }

    fn await_suspend(&mut self, _finished: FrameHandle) -> Transfer {
        Transfer::Resume(self.continuation)
    }

    fn await_resume(&mut self) {}
}

/// Deferred computation that can be awaited once.
///
/// Awaiting consumes the task (`Task<T>: IntoFuture`), so a task cannot be
/// awaited twice. A task that is never awaited can be driven directly with
/// [`Task::resume`]. Dropping a task destroys its frame.
pub struct Task<T: 'static = ()> {
    frame: Option<OwnedFrame<TaskPromise<T>>>,
}

impl<T: 'static> Task<T> {
    /// Wraps `body` into a task without running it.
    pub fn new<Fut>(body: Fut) -> Self
    where
        Fut: Future<Output = T> + 'static,
    {
        Builder::new().task(body)
    }

    pub(crate) fn with_builder<Fut>(builder: Builder, body: Fut) -> Self
    where
        Fut: Future<Output = T> + 'static,
    {
        let promise = Rc::new(TaskPromise::new());
        let slot = Rc::clone(&promise);
        let body = async move {
            let value = body.await;
            slot.return_value(value);
        };

        Self::from_frame(OwnedFrame::new(promise, body, builder.into_name()))
    }

    /// Resumes the task's frame directly.
    ///
    /// The first call starts the body. Further calls continue a body that
    /// parked on its own (for example on [`SuspendAlways`]).
    ///
    /// # Errors
    /// [`FrameError::Null`] when nothing is owned, [`FrameError::Finished`]
    /// once the body has returned.
    ///
    /// # Panics
    /// Rethrows a panic raised by the body, or by any task it awaits.
    pub fn resume(&mut self) -> Result<()> {
        let frame = self.frame.as_ref().ok_or(FrameError::Null)?;

        if frame.is_done() {
            return Err(FrameError::Finished);
        }

        frame.resume();
        Ok(())
    }

    /// Returns true once the body has returned, or when nothing is owned.
    pub fn is_done(&self) -> bool {
        FrameOwner::is_done(self)
    }

    /// Non-owning handle to the task's frame; null when nothing is owned.
    pub fn handle(&self) -> FrameHandle {
        FrameOwner::handle(self)
    }

    /// Takes the body's return value once it has finished.
    pub fn take_output(&mut self) -> Option<T> {
        self.frame.as_ref()?.promise().take_output()
    }

    /// Name given through [`Builder::name`].
    pub fn name(&self) -> Option<&str> {
        self.frame.as_ref().and_then(OwnedFrame::name)
    }
}

impl<T: 'static> FrameOwner for Task<T> {
    type Promise = TaskPromise<T>;

    fn from_frame(frame: OwnedFrame<TaskPromise<T>>) -> Self {
        Self { frame: Some(frame) }
    }

    fn frame(&self) -> Option<&OwnedFrame<TaskPromise<T>>> {
        self.frame.as_ref()
    }
}

impl<T: 'static> Default for Task<T> {
    /// A task that owns nothing.
    fn default() -> Self {
        Self { frame: None }
    }
}

impl<T: 'static> IntoFuture for Task<T> {
    type Output = T;
    type IntoFuture = Await<TaskAwaiter<T>>;

    fn into_future(self) -> Self::IntoFuture {
        Await::new(TaskAwaiter { task: self })
    }
}

impl<T: 'static> fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("frame", &self.handle())
            .field("name", &self.name())
            .field("done", &self.is_done())
            .finish()
    }
}

/// Awaiter of a task. Owns the task until the await completes.
pub struct TaskAwaiter<T: 'static> {
    task: Task<T>,
}

// SAFETY: the task frame is owned by this awaiter and is parked at its initial
// suspension point, or at a point of its own, whenever it is not finished.
unsafe impl<T: 'static> Awaiter for TaskAwaiter<T> {
    type Output = T;

    fn await_ready(&self) -> bool {
        self.task.is_done()
    }

    fn await_suspend(&mut self, awaiting: FrameHandle) -> Transfer {
        let Some(frame) = self.task.frame.as_ref() else {
            panic!("awaited a task that owns no frame");
        };

        frame.promise().set_continuation(awaiting);
        Transfer::Resume(frame.raw())
    }

    fn await_resume(&mut self) -> T {
        let panicked = self.task.frame.as_ref().and_then(|frame| frame.promise().take_panic());
        if let Some(payload) = panicked {
            panic::resume_unwind(payload);
        }

        match self.task.take_output() {
            Some(value) => value,
            None => panic!("awaited task finished without an output (empty task, or resumed early)"),
        }
    }
}

impl<T: 'static> fmt::Debug for TaskAwaiter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskAwaiter").field("task", &self.task).finish()
    }
}
