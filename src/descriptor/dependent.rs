use crate::cell::{Cell, Slot};
use crate::descriptor::{Cas2Descriptor, Descriptor};
use crate::status::{AtomicStatus, Status};
use crate::types::CellIndex;
use crossbeam_epoch::Guard;
use std::sync::Arc;
use tracing::{instrument, trace};

/// A restricted double-compare single-swap on the primary cell of a CAS2.
///
/// Once installed, the cell is handed over to the controlling [Cas2Descriptor] only if the
/// controller is still `Pending` when this descriptor is resolved. Otherwise the cell gets its
/// expected value back. This keeps a late helper from claiming a cell on behalf of an operation
/// which has already finished, even if the cell has since returned to the expected value.
#[derive(Debug)]
pub(crate) struct DependentCas<T> {
    index: CellIndex,
    expected: T,
    controller: Arc<Cas2Descriptor<T>>,
    status: AtomicStatus,
}

impl<T> DependentCas<T> {
    pub(crate) fn new(index: CellIndex, expected: T, controller: Arc<Cas2Descriptor<T>>) -> Self {
        Self {
            index,
            expected,
            controller,
            status: AtomicStatus::new(),
        }
    }

    pub(crate) fn address(&self) -> *const () {
        self as *const Self as *const ()
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> DependentCas<T> {
    /// Decide whether the controller gets the target cell, then write the decision into the cell.
    #[instrument(level = "trace", skip_all, fields(index = self.index))]
    pub(crate) fn complete(&self, cells: &[Cell<T>], guard: &Guard) -> Status {
        let outcome: Status = match self.controller.status() {
            Status::Pending => Status::Success,
            Status::Success | Status::Failure => Status::Failure,
        };
        let status: Status = self.status.resolve(outcome);
        trace!(%status, "resolved dependent descriptor");

        let replacement: Slot<T> = match status {
            Status::Success => Slot::Descriptor(Descriptor::Cas2(Arc::clone(&self.controller))),
            // resolve never hands back Pending
            Status::Pending | Status::Failure => Slot::Value(self.expected.clone()),
        };
        cells[self.index].release(self.address(), replacement, guard);
        status
    }
}
