//! Minimal cooperative coroutine runtime: suspended frames, lazy generators and
//! tasks that resume their awaiters.
//!
//! A suspending body is an `async` block. The runtime wraps it in a
//! heap-allocated frame and drives it by hand: resuming a frame runs it to its
//! next suspension point, on the calling thread, and returns. There is no
//! scheduler and no thread pool; control only moves when someone resumes a
//! frame or a finished task hands control back to its awaiter.
//!
//! # Architecture
//!
//! - **FrameHandle**: Copyable, non-owning reference to a frame (resume, destroy, done, identity)
//! - **OwnedFrame**: Sole owner of a frame; allocates it and destroys it on drop
//! - **Promise**: Per-frame policy for initial suspension, final suspension and panics
//! - **SuspendAlways / SuspendNever**: The two trivial suspension points
//! - **Generator**: Lazy, single-pass sequence produced by a body through a `Yielder`
//! - **Task**: Lazy computation that resumes whoever awaited it when it finishes
//! - **NoopHandle**: Process-wide frame that is never done and ignores resumes
//! - **Builder**: Fluent configuration for generators and tasks
//!
//! # Example
//!
//! ```
//! use resumable::{Generator, Task};
//!
//! fn squares(n: u64) -> Generator<u64> {
//!     Generator::new(move |co| async move {
//!         for i in 0..n {
//!             co.yield_value(i * i).await;
//!         }
//!     })
//! }
//!
//! fn sum_of_squares(n: u64) -> Task<u64> {
//!     Task::new(async move { squares(n).sum() })
//! }
//!
//! let mut task = Task::new(async { sum_of_squares(4).await + 1 });
//! task.resume().unwrap();
//! assert_eq!(task.take_output(), Some(15));
//! ```

mod builder;
mod error;
mod generator;
pub mod logger;
mod noop;
mod promise;
mod runtime;
mod suspend;
mod task;

pub use builder::Builder;
pub use error::{FrameError, Result};
pub use generator::{Cursor, Generator, GeneratorPromise, Yielder};
pub use noop::{NoopHandle, NoopPromise, noop_frame};
pub use promise::{FrameOwner, Promise};
pub use runtime::{FrameHandle, OwnedFrame, PromiseHandle};
pub use suspend::{Await, Awaiter, SuspendAlways, SuspendNever, Transfer, suspend_always, suspend_never};
pub use task::{FinalAwaiter, Task, TaskAwaiter, TaskPromise};
