use resumable::{Builder, Generator, Task};

#[test]
fn test_builder_names_generator() {
    let letters = Builder::new().name("letters").generator(|co| async move {
        co.yield_value('a').await;
    });

    assert_eq!(letters.name(), Some("letters"));
    assert!(format!("{letters:?}").contains("letters"));
    assert_eq!(letters.collect::<String>(), "a");
}

#[test]
fn test_builder_names_task() {
    let mut task = Builder::new().name(String::from("answer")).task(async { 42 });

    assert_eq!(task.name(), Some("answer"));
    assert!(format!("{task:?}").contains("answer"));

    task.resume().unwrap();
    assert_eq!(task.name(), Some("answer"), "Name survives completion");
    assert_eq!(task.take_output(), Some(42));
}

#[test]
fn test_default_frames_are_anonymous() {
    let task = Task::new(async {});
    let numbers: Generator<u8> = Generator::new(|_co| async {});

    assert_eq!(task.name(), None);
    assert_eq!(numbers.name(), None);
    assert_eq!(Generator::<u8>::default().name(), None);
}

#[test]
fn test_builder_is_reusable() {
    let builder = Builder::new().name("worker");

    let first = builder.clone().task(async { 1 });
    let second = builder.task(async { 2 });

    assert_eq!(first.name(), Some("worker"));
    assert_eq!(second.name(), Some("worker"));
    assert_ne!(first.handle(), second.handle());
}
