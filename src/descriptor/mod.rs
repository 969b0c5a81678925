//! Descriptors are published into cells in place of a value while a multi-cell operation is in
//! flight. Any thread which runs into one resolves it before doing anything else with the cell.

use crate::cell::Cell;
use crossbeam_epoch::Guard;
use std::sync::Arc;

mod cas2;
mod dependent;

pub(crate) use cas2::{perform_cas2, Cas2Descriptor};
pub(crate) use dependent::DependentCas;

/// A reference to an in-flight operation, as stored in a cell.
#[derive(Debug)]
pub(crate) enum Descriptor<T> {
    /// Stored in both cells of a CAS2 once they have been claimed.
    Cas2(Arc<Cas2Descriptor<T>>),
    /// Stored in the primary cell of a CAS2 while the claim on it is being decided.
    Dependent(Arc<DependentCas<T>>),
}

impl<T> Descriptor<T> {
    /// Whether this handle points at the descriptor living at `owner`.
    pub(crate) fn refers_to(&self, owner: *const ()) -> bool {
        match self {
            Descriptor::Cas2(descriptor) => Arc::as_ptr(descriptor) as *const () == owner,
            Descriptor::Dependent(descriptor) => Arc::as_ptr(descriptor) as *const () == owner,
        }
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Descriptor<T> {
    /// Drive the referenced operation to a resolved status and clean it out of its cells.
    ///
    /// Safe to call any number of times from any number of threads.
    pub(crate) fn complete(&self, cells: &[Cell<T>], guard: &Guard) {
        match self {
            Descriptor::Cas2(descriptor) => {
                descriptor.complete(cells, guard);
            }
            Descriptor::Dependent(descriptor) => {
                descriptor.complete(cells, guard);
            }
        }
    }
}
