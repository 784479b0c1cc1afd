use proptest::prelude::*;
use resumable::{Generator, Task};
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

fn counted(n: u32, resumes: Rc<Cell<u32>>) -> Generator<u32> {
    Generator::new(move |co| async move {
        resumes.set(resumes.get() + 1);
        for i in 0..n {
            co.yield_value(i).await;
            resumes.set(resumes.get() + 1);
        }
    })
}

fn sum_chain(depth: u32) -> Task<u64> {
    Task::new(async move {
        if depth == 0 {
            0
        } else {
            sum_chain(depth - 1).await + u64::from(depth)
        }
    })
}

proptest! {
    #[test]
    fn prop_yields_exactly_the_bound(n in 0u32..200) {
        let values: Vec<u32> = counted(n, Rc::default()).collect();

        prop_assert_eq!(values, (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn prop_iteration_resumes_n_plus_one_times(n in 0u32..200) {
        let resumes = Rc::new(Cell::new(0));
        let count = counted(n, resumes.clone()).count();

        prop_assert_eq!(count as u32, n);
        prop_assert_eq!(resumes.get(), n + 1);
    }

    #[test]
    fn prop_partial_iteration_resumes_once_per_value(n in 1u32..100, take in 0usize..100) {
        let resumes = Rc::new(Cell::new(0));
        let mut numbers = counted(n, resumes.clone());

        let taken = numbers.by_ref().take(take).count();

        prop_assert_eq!(taken, take.min(n as usize));
        prop_assert!(resumes.get() as usize <= taken + 1);
    }

    #[test]
    fn prop_chain_sums_depths(depth in 0u32..500) {
        let mut root = sum_chain(depth);
        root.resume().unwrap();

        let expected = u64::from(depth) * (u64::from(depth) + 1) / 2;
        prop_assert_eq!(root.take_output(), Some(expected));
    }

    #[test]
    fn prop_panic_after_k_values(k in 0u32..50) {
        let mut numbers = Generator::new(move |co| async move {
            for i in 0..k {
                co.yield_value(i).await;
            }
            panic!("producer failed");
        });

        let mut seen = Vec::new();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            for value in numbers.by_ref() {
                seen.push(value);
            }
        }));

        prop_assert!(outcome.is_err());
        prop_assert_eq!(seen, (0..k).collect::<Vec<_>>());
        prop_assert!(numbers.is_empty());
        prop_assert_eq!(numbers.next(), None);
    }
}
