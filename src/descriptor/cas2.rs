use crate::cell::{Cell, Slot};
use crate::descriptor::{DependentCas, Descriptor};
use crate::status::{AtomicStatus, Status};
use crate::types::{order_words, CasWord};
use crossbeam_epoch::Guard;
use std::sync::Arc;
use tracing::{instrument, trace};

/// The shared record of one double-compare double-swap.
///
/// The secondary word is claimed by the originating thread before the descriptor is completed.
/// Completion, which any thread may run, claims the primary word through a [DependentCas],
/// resolves the status once, and then writes the final value of both cells.
#[derive(Debug)]
pub(crate) struct Cas2Descriptor<T> {
    secondary: CasWord<T>,
    primary: CasWord<T>,
    status: AtomicStatus,
}

impl<T> Cas2Descriptor<T> {
    /// `secondary` must have the lower cell index. See [order_words](crate::types::order_words).
    pub(crate) fn new(secondary: CasWord<T>, primary: CasWord<T>) -> Self {
        Self {
            secondary,
            primary,
            status: AtomicStatus::new(),
        }
    }

    pub(crate) fn status(&self) -> Status {
        self.status.load()
    }

    pub(crate) fn address(&self) -> *const () {
        self as *const Self as *const ()
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Cas2Descriptor<T> {
    /// Resolve this operation and remove it from both cells. Returns the resolved status.
    #[instrument(
        level = "trace",
        skip_all,
        fields(secondary = self.secondary.index, primary = self.primary.index)
    )]
    pub(crate) fn complete(self: &Arc<Self>, cells: &[Cell<T>], guard: &Guard) -> Status {
        let owns_primary: bool = if cells[self.primary.index].holds(self.address(), guard) {
            true
        } else {
            self.claim_primary(cells, guard)
        };

        let outcome: Status = if owns_primary {
            Status::Success
        } else {
            Status::Failure
        };
        let status: Status = self.status.resolve(outcome);
        trace!(%status, "resolved cas2 descriptor");

        let (secondary_value, primary_value): (T, T) = match status {
            Status::Success => (self.secondary.desired.clone(), self.primary.desired.clone()),
            // resolve never hands back Pending
            Status::Pending | Status::Failure => {
                (self.secondary.expected.clone(), self.primary.expected.clone())
            }
        };
        cells[self.secondary.index].release(self.address(), Slot::Value(secondary_value), guard);
        cells[self.primary.index].release(self.address(), Slot::Value(primary_value), guard);
        status
    }

    /// Try to hand the primary cell over to this descriptor.
    fn claim_primary(self: &Arc<Self>, cells: &[Cell<T>], guard: &Guard) -> bool {
        let dependent: Arc<DependentCas<T>> = Arc::new(DependentCas::new(
            self.primary.index,
            self.primary.expected.clone(),
            Arc::clone(self),
        ));
        let installed: bool = cells[self.primary.index].compare_and_set(
            cells,
            &self.primary.expected,
            Slot::Descriptor(Descriptor::Dependent(Arc::clone(&dependent))),
            guard,
        );
        if !installed {
            trace!("primary cell did not hold the expected value");
            return false;
        }
        dependent.complete(cells, guard) == Status::Success
    }
}

/// Publish a CAS2 over `first` and `second` into `cells` and drive it to completion. Returns
/// whether both cells were updated.
///
/// The words may be passed in either order. Their indices must differ.
pub(crate) fn perform_cas2<T: Clone + PartialEq + Send + Sync + 'static>(
    cells: &[Cell<T>],
    first: CasWord<T>,
    second: CasWord<T>,
    guard: &Guard,
) -> bool {
    let (secondary, primary) = order_words(first, second);
    let descriptor: Arc<Cas2Descriptor<T>> = Arc::new(Cas2Descriptor::new(secondary, primary));

    let secondary: &CasWord<T> = &descriptor.secondary;
    let installed: bool = cells[secondary.index].compare_and_set(
        cells,
        &secondary.expected,
        Slot::Descriptor(Descriptor::Cas2(Arc::clone(&descriptor))),
        guard,
    );
    if !installed {
        trace!("secondary cell did not hold the expected value");
        return false;
    }
    trace!("published cas2 descriptor");
    descriptor.complete(cells, guard) == Status::Success
}


#[cfg(all(test, any(loom, feature = "shuttle")))]
mod model_tests {
    use crate::cell::{Cell, Slot};
    use crate::descriptor::cas2::perform_cas2;
    use crate::descriptor::{Cas2Descriptor, Descriptor};
    use crate::status::Status;
    use crate::types::CasWord;
    use crossbeam_epoch::{self as epoch, Guard};
    use std::sync::Arc;

    cfg_if::cfg_if! {
        if #[cfg(loom)] {
            use loom::thread;

            fn check<F: Fn() + Send + Sync + 'static>(f: F) {
                let mut builder = loom::model::Builder::new();
                builder.preemption_bound = Some(3);
                builder.check(f);
            }
        } else {
            use shuttle::thread;

            fn check<F: Fn() + Send + Sync + 'static>(f: F) {
                shuttle::check_random(f, 10_000);
            }
        }
    }

    /// Set up `[0, 0]` with a descriptor over `(0: 0 -> 1, 1: 0 -> 1)` which already succeeded
    /// before both cells were written back to 0.
    fn recycled_cells() -> (Arc<Vec<Cell<u64>>>, Arc<Cas2Descriptor<u64>>) {
        let cells: Arc<Vec<Cell<u64>>> = Arc::new(vec![Cell::new(0), Cell::new(0)]);
        let guard: Guard = epoch::pin();
        let descriptor: Arc<Cas2Descriptor<u64>> = Arc::new(Cas2Descriptor::new(
            CasWord::new(0, 0, 1),
            CasWord::new(1, 0, 1),
        ));
        let installed: bool = cells[0].compare_and_set(
            &cells,
            &0,
            Slot::Descriptor(Descriptor::Cas2(Arc::clone(&descriptor))),
            &guard,
        );
        assert!(installed);
        assert_eq!(descriptor.complete(&cells, &guard), Status::Success);
        cells[0].write(&cells, 0, &guard);
        cells[1].write(&cells, 0, &guard);
        (cells, descriptor)
    }

    #[test]
    fn stale_helper_races_live_cas2() {
        check(|| {
            let (cells, stale) = recycled_cells();

            let helper = {
                let cells: Arc<Vec<Cell<u64>>> = Arc::clone(&cells);
                thread::spawn(move || stale.complete(&cells, &epoch::pin()))
            };
            let live = {
                let cells: Arc<Vec<Cell<u64>>> = Arc::clone(&cells);
                thread::spawn(move || {
                    perform_cas2(
                        &cells,
                        CasWord::new(0, 0, 5),
                        CasWord::new(1, 0, 5),
                        &epoch::pin(),
                    )
                })
            };

            assert_eq!(helper.join().expect("A thread panicked"), Status::Success);
            assert!(live.join().expect("A thread panicked"));

            let guard: Guard = epoch::pin();
            assert_eq!(cells[0].read(&cells, &guard), 5);
            assert_eq!(cells[1].read(&cells, &guard), 5);
        });
    }
}
