use resumable::{FrameHandle, NoopHandle, NoopPromise, noop_frame};

#[test]
fn test_noop_operations_are_inert() {
    let noop = noop_frame();

    assert!(noop.is_valid());
    assert!(!noop.done(), "Noop frame is never done");

    noop.resume();
    noop.resume();
    noop.destroy();

    assert!(noop.is_valid(), "Destroy leaves the noop frame in place");
    assert!(!noop.done());
}

#[test]
fn test_noop_erased_handle() {
    let raw: FrameHandle = noop_frame().into();

    assert_eq!(raw, FrameHandle::noop());
    assert_eq!(raw, NoopHandle.raw());
    assert!(raw.is_noop());
    assert!(!raw.is_null());
    assert_eq!(format!("{raw:?}"), "FrameHandle(noop)");
}

#[test]
fn test_noop_raw_operations() {
    let raw = FrameHandle::noop();

    // SAFETY: the noop frame is static and its operations do nothing.
    unsafe {
        raw.resume();
        assert!(!raw.done());
        raw.destroy();
        assert!(!raw.done());
    }
}

#[test]
fn test_noop_is_process_wide() {
    let here = FrameHandle::noop();
    let there = std::thread::spawn(|| FrameHandle::noop().address() as usize)
        .join()
        .unwrap();

    assert_eq!(here.address() as usize, there);
}

#[test]
fn test_noop_promise() {
    let promise: &'static NoopPromise = noop_frame().promise();

    assert_eq!(*promise, NoopPromise);
    assert!(std::ptr::eq(promise, NoopHandle.promise()));
}
