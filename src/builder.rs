//! Fluent builder for generators and tasks.
//!
//! Configures a frame before it is created. The configuration currently
//! covers the frame's name, which shows up in `Debug` output and in the
//! `frame` tracing span of every resume.

use crate::generator::{Generator, Yielder};
use crate::task::Task;

use std::borrow::Cow;
use std::future::Future;

/// Builder for [`Generator`] and [`Task`] frames.
///
/// # Example
/// ```
/// use resumable::Builder;
///
/// let countdown = Builder::new().name("countdown").generator(|co| async move {
///     for i in (1..=3).rev() {
///         co.yield_value(i).await;
///     }
/// });
///
/// assert_eq!(countdown.name(), Some("countdown"));
/// assert_eq!(countdown.collect::<Vec<_>>(), vec![3, 2, 1]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Builder {
    name: Option<Cow<'static, str>>,
}

impl Builder {
    /// Creates a builder with no name set.
    pub fn new() -> Self {
        Self { name: None }
    }

    /// Names the frame being built.
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builds a generator around `producer`. The producer body does not run
    /// until the first value is requested.
    pub fn generator<T, F, Fut>(self, producer: F) -> Generator<T>
    where
        T: 'static,
        F: FnOnce(Yielder<T>) -> Fut,
        Fut: Future<Output = ()> + 'static,
    {
        Generator::with_builder(self, producer)
    }

    /// Builds a task around `body`. The body does not run until the task is
    /// awaited or resumed.
    pub fn task<T, Fut>(self, body: Fut) -> Task<T>
    where
        T: 'static,
        Fut: Future<Output = T> + 'static,
    {
        Task::with_builder(self, body)
    }

    pub(crate) fn into_name(self) -> Option<Cow<'static, str>> {
        self.name
    }
}
