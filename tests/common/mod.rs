use cas2::AtomicArray;
use tracing::debug;

cfg_if::cfg_if! {
    if #[cfg(loom)] {
        pub(crate) use loom::sync::Arc;
        pub(crate) use loom::thread;
    } else if #[cfg(feature = "shuttle")] {
        pub(crate) use shuttle::sync::Arc;
        pub(crate) use shuttle::thread;
    } else {
        pub(crate) use std::sync::Arc;
        pub(crate) use std::thread;
    }
}

/// Every thread tries the same `cas2(0, 0, 1, 1, 0, 1)` on a fresh `[0, 0]` array. Exactly one of
/// them may win.
pub(crate) fn concurrency_test<const NUM_THREADS: usize>() {
    let array: Arc<AtomicArray<usize>> = Arc::new(AtomicArray::new(2, 0));

    let join_handles: Vec<thread::JoinHandle<bool>> = (0..NUM_THREADS)
        .map(|i| {
            let array: Arc<AtomicArray<usize>> = array.clone();
            thread::spawn(move || {
                // alternate the argument order so both orderings race
                if i % 2 == 0 {
                    array.cas2(0, 0, 1, 1, 0, 1)
                } else {
                    array.cas2(1, 0, 1, 0, 0, 1)
                }
            })
        })
        .collect();

    let num_successes: usize = join_handles
        .into_iter()
        .map(|join_handle| join_handle.join().expect("A thread panicked"))
        .filter(|succeeded| *succeeded)
        .count();
    debug!("{num_successes} of {NUM_THREADS} threads succeeded");

    assert_eq!(num_successes, 1);
    assert_eq!(array.get(0), 1);
    assert_eq!(array.get(1), 1);
}
