use resumable::{FrameError, Generator, Task, logger, suspend_always};
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

type Log = Rc<RefCell<Vec<String>>>;

fn record(log: &Log, line: &str) {
    log.borrow_mut().push(line.to_owned());
}

fn leaf(value: u32) -> Task<u32> {
    Task::new(async move { value * 2 })
}

fn chain(depth: u64) -> Task<u64> {
    Task::new(async move {
        if depth == 0 {
            0
        } else {
            chain(depth - 1).await + 1
        }
    })
}

struct DropCounter(Rc<Cell<u32>>);

impl Drop for DropCounter {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

#[test]
fn test_task_is_lazy() {
    logger::init_for_tests();

    let ran = Rc::new(Cell::new(false));
    let flag = ran.clone();
    let mut task = Task::new(async move {
        flag.set(true);
        3
    });

    assert!(!ran.get(), "Body should not run at construction");
    assert!(!task.is_done());

    task.resume().unwrap();

    assert!(ran.get());
    assert!(task.is_done());
    assert_eq!(task.take_output(), Some(3));
}

#[test]
fn test_awaited_task_produces_value() {
    logger::init_for_tests();

    let mut root = Task::new(async { leaf(1).await + leaf(20).await });

    root.resume().unwrap();

    assert_eq!(root.take_output(), Some(42));
}

#[test]
fn test_chain_resumes_in_reverse_await_order() {
    logger::init_for_tests();

    let log: Log = Rc::default();

    let c_log = log.clone();
    let c = Task::new(async move {
        record(&c_log, "c: run");
    });

    let b_log = log.clone();
    let b = Task::new(async move {
        record(&b_log, "b: start");
        c.await;
        record(&b_log, "b: resumed");
    });

    let a_log = log.clone();
    let mut a = Task::new(async move {
        record(&a_log, "a: start");
        b.await;
        record(&a_log, "a: resumed");
    });

    a.resume().unwrap();

    assert!(a.is_done());
    assert_eq!(
        *log.borrow(),
        vec!["a: start", "b: start", "c: run", "b: resumed", "a: resumed"]
    );
}

#[test]
fn test_deep_chain_unwinds() {
    logger::init_for_tests();

    let mut root = chain(10_000);

    root.resume().unwrap();

    assert!(root.is_done());
    assert_eq!(root.take_output(), Some(10_000));
}

#[test]
fn test_resume_after_completion_reports_finished() {
    let mut task = leaf(4);

    task.resume().unwrap();

    assert_eq!(task.resume(), Err(FrameError::Finished));
    assert_eq!(task.take_output(), Some(8));
    assert_eq!(task.take_output(), None, "Output is taken once");
}

#[test]
fn test_panic_is_rethrown_at_resume() {
    logger::init_for_tests();

    let mut task: Task<u32> = Task::new(async { panic!("task failed") });

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| task.resume()));
    let payload = outcome.expect_err("Resume should rethrow the body panic");

    assert_eq!(payload.downcast_ref::<&str>(), Some(&"task failed"));
    assert!(task.is_done(), "Task is finished after the panic");
    assert_eq!(task.resume(), Err(FrameError::Finished));
    assert_eq!(task.take_output(), None);
}

#[test]
fn test_nested_panic_reaches_root_resume() {
    logger::init_for_tests();

    let reached_after = Rc::new(Cell::new(false));
    let flag = reached_after.clone();

    let failing: Task<u32> = Task::new(async { panic!("inner failed") });
    let mut root = Task::new(async move {
        let value = failing.await;
        flag.set(true);
        value
    });

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| root.resume()));
    let payload = outcome.expect_err("Inner panic should surface at the root resume");

    assert_eq!(payload.downcast_ref::<&str>(), Some(&"inner failed"));
    assert!(!reached_after.get(), "Code after the failed await never ran");
    assert!(root.is_done(), "Awaiting frame finishes with the failure");
    assert_eq!(root.resume(), Err(FrameError::Finished), "Failure surfaces only once");
    assert_eq!(root.take_output(), None);
}

#[test]
fn test_panic_unwinds_every_link_of_a_chain() {
    logger::init_for_tests();

    let log: Log = Rc::default();

    let inner: Task<u32> = Task::new(async { panic!("deepest failed") });

    let middle_log = log.clone();
    let middle = Task::new(async move {
        record(&middle_log, "middle: start");
        let value = inner.await;
        record(&middle_log, "middle: resumed");
        value
    });

    let root_log = log.clone();
    let mut root = Task::new(async move {
        record(&root_log, "root: start");
        let value = middle.await;
        record(&root_log, "root: resumed");
        value
    });

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| root.resume()));
    let payload = outcome.expect_err("Deepest panic should surface at the root resume");

    assert_eq!(payload.downcast_ref::<&str>(), Some(&"deepest failed"));
    assert_eq!(*log.borrow(), vec!["root: start", "middle: start"]);
    assert!(root.is_done());
}

#[test]
fn test_generator_awaiting_failing_task_finishes() {
    logger::init_for_tests();

    let mut numbers = Generator::new(|co| async move {
        co.yield_value(1).await;
        let value: u32 = Task::new(async { panic!("inner failed") }).await;
        co.yield_value(value).await;
    });

    assert_eq!(numbers.try_next(), Ok(Some(1)));
    assert_eq!(
        numbers.try_next(),
        Err(FrameError::Panicked {
            message: "inner failed".to_owned()
        })
    );
    assert!(numbers.is_empty(), "Generator is finished after the failure");
    assert_eq!(numbers.try_next(), Ok(None), "Failure surfaces only once");
}

#[test]
fn test_generator_rethrows_failing_task_at_next() {
    logger::init_for_tests();

    let mut numbers = Generator::new(|co| async move {
        let value: u32 = Task::new(async { panic!("inner failed") }).await;
        co.yield_value(value).await;
    });

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| numbers.next()));
    let payload = outcome.expect_err("Awaited task panic should surface at next()");

    assert_eq!(payload.downcast_ref::<&str>(), Some(&"inner failed"));
    assert!(numbers.is_empty());
    assert_eq!(numbers.next(), None);
}

#[test]
fn test_block_on_rethrows_task_panic() {
    let outcome = panic::catch_unwind(|| {
        futures::executor::block_on(Task::<u8>::new(async { panic!("executor failed") }).into_future())
    });
    let payload = outcome.expect_err("Panic should surface from block_on");

    assert_eq!(payload.downcast_ref::<&str>(), Some(&"executor failed"));
}

#[test]
fn test_default_task_owns_nothing() {
    let mut task = Task::<u8>::default();

    assert_eq!(task.resume(), Err(FrameError::Null));
    assert!(task.is_done());
    assert!(task.handle().is_null());
    assert_eq!(task.take_output(), None);
}

#[test]
fn test_task_parks_on_suspend_always() {
    logger::init_for_tests();

    let steps = Rc::new(Cell::new(0));
    let counter = steps.clone();
    let mut task = Task::new(async move {
        counter.set(1);
        suspend_always().await;
        counter.set(2);
        suspend_always().await;
        counter.set(3);
        "finished"
    });

    task.resume().unwrap();
    assert_eq!(steps.get(), 1);
    assert!(!task.is_done());

    task.resume().unwrap();
    assert_eq!(steps.get(), 2);
    assert!(!task.is_done());

    task.resume().unwrap();
    assert_eq!(steps.get(), 3);
    assert_eq!(task.take_output(), Some("finished"));
}

#[test]
fn test_generator_body_awaits_tasks() {
    logger::init_for_tests();

    let doubled = Generator::new(|co| async move {
        for i in 0..3 {
            let value = leaf(i).await;
            co.yield_value(value).await;
        }
    });

    assert_eq!(doubled.collect::<Vec<_>>(), vec![0, 2, 4]);
}

#[test]
fn test_drop_unawaited_task() {
    let drops = Rc::new(Cell::new(0));
    let guard = DropCounter(drops.clone());

    let task = Task::new(async move {
        let _guard = guard;
    });
    drop(task);

    assert_eq!(drops.get(), 1);
}

#[test]
fn test_drop_parent_mid_await_destroys_both_frames() {
    logger::init_for_tests();

    let drops = Rc::new(Cell::new(0));

    let child_guard = DropCounter(drops.clone());
    let child = Task::new(async move {
        let _guard = child_guard;
        suspend_always().await;
    });

    let parent_guard = DropCounter(drops.clone());
    let mut parent = Task::new(async move {
        let _guard = parent_guard;
        child.await;
    });

    parent.resume().unwrap();
    assert!(!parent.is_done(), "Parent waits on the parked child");

    drop(parent);

    assert_eq!(drops.get(), 2, "Both frames released exactly once");
}

#[test]
fn test_continuation_starts_as_noop() {
    use resumable::FrameOwner;

    let task = leaf(1);
    let continuation = task.frame().map(|frame| frame.promise().continuation());

    assert!(continuation.is_some_and(|handle| handle.is_noop()));
}

#[test]
fn test_block_on_awaits_task() {
    logger::init_for_tests();

    let value = futures::executor::block_on(Task::new(async { 5 }).into_future());

    assert_eq!(value, 5);
}

#[test]
fn test_block_on_awaits_chained_task() {
    logger::init_for_tests();

    let root = Task::new(async { leaf(10).await + chain(50).await as u32 });

    assert_eq!(futures::executor::block_on(root.into_future()), 70);
}

#[test]
fn test_block_on_drives_suspend_always() {
    let value = futures::executor::block_on(async {
        suspend_always().await;
        9
    });

    assert_eq!(value, 9);
}
