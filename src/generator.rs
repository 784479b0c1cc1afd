//! Lazy, single-pass generators.
//!
//! A generator owns a frame whose body produces values through a [`Yielder`].
//! Nothing runs until the first value is pulled; each pull resumes the body
//! exactly once, up to its next yield or its end.
//!
//! ```
//! use resumable::Generator;
//!
//! fn iota(n: u32) -> Generator<u32> {
//!     Generator::new(move |co| async move {
//!         for i in 0..n {
//!             co.yield_value(i).await;
//!         }
//!     })
//! }
//!
//! let values: Vec<u32> = iota(10).collect();
//! assert_eq!(values, (0..10).collect::<Vec<_>>());
//! ```
//!
//! Besides [`Iterator`], a generator can be walked with a [`Cursor`] that
//! reads the current value in place:
//!
//! ```
//! use resumable::Generator;
//!
//! let mut words = Generator::new(|co| async move {
//!     co.yield_value(String::from("first")).await;
//!     co.yield_value(String::from("second")).await;
//! });
//!
//! let mut cursor = words.begin();
//! assert_eq!(cursor.get().as_deref().map(String::as_str), Some("first"));
//! cursor.advance();
//! assert_eq!(cursor.get().as_deref().map(String::as_str), Some("second"));
//! cursor.advance();
//! assert!(cursor.is_end());
//! ```

use crate::builder::Builder;
use crate::error::{FrameError, Result};
use crate::promise::{FrameOwner, Promise};
use crate::runtime::{FrameHandle, OwnedFrame};
use crate::suspend::{Await, SuspendAlways};

use std::any::Any;
use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::future::Future;
use std::iter::FusedIterator;
use std::panic;
use std::rc::Rc;

/// Promise of a generator frame: the last yielded value and a stashed panic.
pub struct GeneratorPromise<T> {
    value: RefCell<Option<T>>,
    panic: Cell<Option<Box<dyn Any + Send>>>,
}

impl<T> GeneratorPromise<T> {
    fn new() -> Self {
        Self {
            value: RefCell::new(None),
            panic: Cell::new(None),
        }
    }

    /// Stores a yielded value, replacing the previous one.
    pub fn yield_value(&self, value: T) {
        self.value.replace(Some(value));
    }

    /// Borrows the last yielded value.
    pub fn value(&self) -> Option<Ref<'_, T>> {
        Ref::filter_map(self.value.borrow(), Option::as_ref).ok()
    }

    fn take_value(&self) -> Option<T> {
        self.value.borrow_mut().take()
    }

    fn take_panic(&self) -> Option<Box<dyn Any + Send>> {
        self.panic.take()
    }
}

impl<T> Default for GeneratorPromise<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Promise for GeneratorPromise<T> {
    type InitialSuspend = SuspendAlways;
    type FinalSuspend = SuspendAlways;

    fn initial_suspend(&self) -> SuspendAlways {
        SuspendAlways
    }

    // The frame stays allocated after the body ends, until the generator drops.
    fn final_suspend(&self) -> SuspendAlways {
        SuspendAlways
    }

    // Kept until the consumer's resume call returns, then rethrown there.
    fn unhandled_panic(&self, payload: Box<dyn Any + Send>) {
        self.panic.set(Some(payload));
    }
}

/// Handed to a generator body to produce values.
pub struct Yielder<T> {
    promise: Rc<GeneratorPromise<T>>,
}

impl<T> Yielder<T> {
    /// Publishes `value` to the consumer; awaiting the result parks the body
    /// until the next value is requested.
    pub fn yield_value(&self, value: T) -> Await<SuspendAlways> {
        self.promise.yield_value(value);
        Await::new(SuspendAlways)
    }
}

impl<T> fmt::Debug for Yielder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Yielder").finish_non_exhaustive()
    }
}

/// Lazy sequence produced by a suspending body.
///
/// The generator is the only owner of its frame. Moving it moves the frame;
/// [`std::mem::take`] leaves an empty generator behind. Dropping it destroys
/// the frame, whether or not the body ran to the end.
pub struct Generator<T: 'static> {
    frame: Option<OwnedFrame<GeneratorPromise<T>>>,
    started: bool,
    buffered: bool,
}

impl<T: 'static> Generator<T> {
    /// Wraps `producer` into a generator without running it.
    pub fn new<F, Fut>(producer: F) -> Self
    where
        F: FnOnce(Yielder<T>) -> Fut,
        Fut: Future<Output = ()> + 'static,
    {
        Builder::new().generator(producer)
    }

    pub(crate) fn with_builder<F, Fut>(builder: Builder, producer: F) -> Self
    where
        F: FnOnce(Yielder<T>) -> Fut,
        Fut: Future<Output = ()> + 'static,
    {
        let promise = Rc::new(GeneratorPromise::new());
        let body = producer(Yielder {
            promise: Rc::clone(&promise),
        });

        Self::from_frame(OwnedFrame::new(promise, body, builder.into_name()))
    }

    /// Starts iteration.
    ///
    /// The first call resumes the body to produce the first value. Later calls
    /// return a cursor at the current position without resuming. On a finished
    /// or empty generator the cursor is already at the end.
    ///
    /// # Panics
    /// Rethrows a panic raised by the body.
    pub fn begin(&mut self) -> Cursor<'_, T> {
        if !self.started {
            self.step();
        }

        Cursor { generator: self }
    }

    /// Returns true once the body has run to its end, or when nothing is owned.
    pub fn is_empty(&self) -> bool {
        self.is_done()
    }

    /// Non-owning handle to the generator's frame; null when nothing is owned.
    pub fn handle(&self) -> FrameHandle {
        FrameOwner::handle(self)
    }

    /// Name given through [`Builder::name`].
    pub fn name(&self) -> Option<&str> {
        self.frame.as_ref().and_then(OwnedFrame::name)
    }

    /// Like [`Iterator::next`], but reports a body panic as an error.
    ///
    /// The panic is reported once; afterwards the generator is finished and
    /// yields `Ok(None)`.
    pub fn try_next(&mut self) -> Result<Option<T>> {
        if self.frame.is_none() {
            return Err(FrameError::Null);
        }

        if !self.buffered {
            self.pull().map_err(FrameError::from_panic)?;
        }

        Ok(self.take_buffered())
    }

    // Resumes once unless finished; returns the body's panic, if any.
    fn pull(&mut self) -> std::result::Result<(), Box<dyn Any + Send>> {
        let Some(frame) = self.frame.as_ref() else {
            return Ok(());
        };

        if frame.is_done() {
            self.buffered = false;
            return Ok(());
        }

        self.started = true;
        frame.resume();
        self.buffered = !frame.is_done();

        match frame.promise().take_panic() {
            Some(payload) => Err(payload),
            None => Ok(()),
        }
    }

    fn step(&mut self) {
        if let Err(payload) = self.pull() {
            panic::resume_unwind(payload);
        }
    }

    fn take_buffered(&mut self) -> Option<T> {
        if !self.buffered {
            return None;
        }

        self.buffered = false;
        self.frame.as_ref()?.promise().take_value()
    }
}

impl<T: 'static> FrameOwner for Generator<T> {
    type Promise = GeneratorPromise<T>;

    fn from_frame(frame: OwnedFrame<GeneratorPromise<T>>) -> Self {
        Self {
            frame: Some(frame),
            started: false,
            buffered: false,
        }
    }

    fn frame(&self) -> Option<&OwnedFrame<GeneratorPromise<T>>> {
        self.frame.as_ref()
    }
}

impl<T: 'static> Default for Generator<T> {
    /// A generator that owns nothing and yields nothing.
    fn default() -> Self {
        Self {
            frame: None,
            started: false,
            buffered: false,
        }
    }
}

impl<T: 'static> Iterator for Generator<T> {
    type Item = T;

    /// Takes the value produced by the last resume if nobody took it yet,
    /// otherwise resumes the body once.
    fn next(&mut self) -> Option<T> {
        if !self.buffered {
            self.step();
        }

        self.take_buffered()
    }
}

impl<T: 'static> FusedIterator for Generator<T> {}

impl<T: 'static> fmt::Debug for Generator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("frame", &self.handle())
            .field("name", &self.name())
            .field("started", &self.started)
            .field("done", &self.is_done())
            .finish()
    }
}

/// Position in a generator, in begin/advance/dereference style.
///
/// A cursor borrows its generator exclusively. Taking a second cursor later
/// continues from the same place: generators are single-pass.
pub struct Cursor<'g, T: 'static> {
    generator: &'g mut Generator<T>,
}

impl<T: 'static> Cursor<'_, T> {
    /// Returns true once the body has run to its end.
    pub fn is_end(&self) -> bool {
        self.generator.is_empty()
    }

    /// The current value, or `None` at the end.
    ///
    /// Also `None` when the value was already taken through [`Iterator::next`].
    pub fn get(&self) -> Option<Ref<'_, T>> {
        if self.is_end() {
            return None;
        }

        self.generator.frame.as_ref()?.promise().value()
    }

    /// Moves to the next value. Does nothing at the end.
    ///
    /// # Panics
    /// Rethrows a panic raised by the body.
    pub fn advance(&mut self) {
        if !self.is_end() {
            self.generator.step();
        }
    }

    /// Current frame handle, shared with the generator.
    pub fn handle(&self) -> FrameHandle {
        self.generator.handle()
    }
}

impl<T: 'static> fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("frame", &self.handle())
            .field("end", &self.is_end())
            .finish()
    }
}
