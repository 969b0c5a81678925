use crate::descriptor::Descriptor;
use crate::sync::{yield_point, Ordering};
use crossbeam_epoch::{self as epoch, Atomic, Guard, Owned, Shared};
use tracing::trace;

/// What a [Cell] currently holds: either a committed value or an in-flight operation which must
/// be resolved before the cell's value can be known.
#[derive(Debug)]
pub(crate) enum Slot<T> {
    Value(T),
    Descriptor(Descriptor<T>),
}

/// A single atomically updated location inside an [AtomicArray](crate::AtomicArray).
///
/// The slot is a heap node swapped by pointer CAS. Replaced nodes are handed to the epoch
/// collector, so a node loaded under a [Guard] stays valid, and its address cannot be handed out
/// again, for as long as that guard is alive.
#[derive(Debug)]
pub(crate) struct Cell<T> {
    slot: Atomic<Slot<T>>,
}

impl<T> Cell<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            slot: Atomic::new(Slot::Value(value)),
        }
    }

    fn load<'g>(&self, guard: &'g Guard) -> (Shared<'g, Slot<T>>, &'g Slot<T>) {
        yield_point();
        let current: Shared<'g, Slot<T>> = self.slot.load(Ordering::Acquire, guard);
        // the slot is never null: it starts as a value and is only ever swapped for another node
        let slot: &'g Slot<T> = unsafe { current.deref() };
        (current, slot)
    }

    /// Whether the cell currently references the descriptor living at `owner`.
    pub(crate) fn holds(&self, owner: *const (), guard: &Guard) -> bool {
        match self.load(guard).1 {
            Slot::Descriptor(descriptor) => descriptor.refers_to(owner),
            Slot::Value(_) => false,
        }
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Cell<T> {
    /// Read the committed value, resolving any in-flight descriptor first.
    pub(crate) fn read(&self, cells: &[Cell<T>], guard: &Guard) -> T {
        loop {
            match self.load(guard).1 {
                Slot::Value(value) => return value.clone(),
                Slot::Descriptor(descriptor) => {
                    trace!("helping a pending descriptor before reading");
                    descriptor.complete(cells, guard);
                }
            }
        }
    }

    /// Unconditionally replace the committed value, resolving any in-flight descriptor first.
    pub(crate) fn write(&self, cells: &[Cell<T>], value: T, guard: &Guard) {
        let mut new: Owned<Slot<T>> = Owned::new(Slot::Value(value));
        loop {
            let (current, slot) = self.load(guard);
            match slot {
                Slot::Descriptor(descriptor) => {
                    trace!("helping a pending descriptor before writing");
                    descriptor.complete(cells, guard);
                }
                Slot::Value(_) => {
                    yield_point();
                    match self.slot.compare_exchange(
                        current,
                        new,
                        Ordering::AcqRel,
                        Ordering::Acquire,
                        guard,
                    ) {
                        Ok(_) => {
                            unsafe { guard.defer_destroy(current) };
                            return;
                        }
                        Err(error) => new = error.new,
                    }
                }
            }
        }
    }

    /// Swap the committed value for `new` if it equals `expected`. `new` is either a plain value
    /// or a descriptor being published.
    ///
    /// A committed value different from `expected` ends the call with `false`. A lost pointer CAS
    /// does not: a failed operation puts the expected value back in a fresh node, so the cell is
    /// re-read and compared again.
    pub(crate) fn compare_and_set(
        &self,
        cells: &[Cell<T>],
        expected: &T,
        new: Slot<T>,
        guard: &Guard,
    ) -> bool {
        let mut new: Owned<Slot<T>> = Owned::new(new);
        loop {
            let (current, slot) = self.load(guard);
            match slot {
                Slot::Descriptor(descriptor) => {
                    trace!("helping a pending descriptor before compare-and-set");
                    descriptor.complete(cells, guard);
                }
                Slot::Value(value) if value == expected => {
                    yield_point();
                    match self.slot.compare_exchange(
                        current,
                        new,
                        Ordering::AcqRel,
                        Ordering::Acquire,
                        guard,
                    ) {
                        Ok(_) => {
                            unsafe { guard.defer_destroy(current) };
                            return true;
                        }
                        Err(error) => new = error.new,
                    }
                }
                Slot::Value(_) => return false,
            }
        }
    }

    /// Replace the node referencing the descriptor at `owner` with `replacement`.
    ///
    /// Only one attempt is made. If the cell no longer references `owner`, some other helper has
    /// already finished this step.
    pub(crate) fn release(&self, owner: *const (), replacement: Slot<T>, guard: &Guard) {
        let (current, slot) = self.load(guard);
        let is_owned: bool = match slot {
            Slot::Descriptor(descriptor) => descriptor.refers_to(owner),
            Slot::Value(_) => false,
        };
        if !is_owned {
            trace!("descriptor was already released by another helper");
            return;
        }
        yield_point();
        if self
            .slot
            .compare_exchange(
                current,
                Owned::new(replacement),
                Ordering::AcqRel,
                Ordering::Acquire,
                guard,
            )
            .is_ok()
        {
            unsafe { guard.defer_destroy(current) };
        }
    }
}

impl<T> Drop for Cell<T> {
    fn drop(&mut self) {
        unsafe {
            // this cell cannot be reached by any other thread any more, so we can safely use
            // epoch::unprotected()
            let current: Shared<Slot<T>> = self.slot.load(Ordering::Relaxed, epoch::unprotected());
            drop(current.into_owned());
        }
    }
}
