use crate::cell::{Cell, Slot};
use crate::descriptor::perform_cas2;
use crate::err::Error;
use crate::types::{CasWord, CellIndex};
use core::fmt::{Debug, Formatter};
use crossbeam_epoch::{self as epoch, Guard};
use tracing::instrument;

/// A fixed-length array of cells supporting lock-free single-cell and double-cell
/// compare-and-swap.
///
/// Every operation pins the calling thread's epoch for its duration and helps any in-flight
/// operation it runs into, so no caller ever waits on another thread and no caller ever sees a
/// half-applied [cas2](AtomicArray::cas2).
///
/// Indices are checked. The plain operations panic on an out-of-range index, the same way slice
/// indexing does. The `try_` operations return [Error::IndexOutOfBounds] instead.
///
/// Values are compared with [PartialEq] and handed out as clones. Replaced values are dropped by
/// the epoch collector, possibly on another thread, hence the `Send + Sync + 'static` bound.
pub struct AtomicArray<T> {
    cells: Box<[Cell<T>]>,
}

impl<T> AtomicArray<T> {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn cell(&self, index: CellIndex) -> Result<&Cell<T>, Error> {
        self.cells.get(index).ok_or(Error::IndexOutOfBounds {
            index,
            len: self.cells.len(),
        })
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> AtomicArray<T> {
    /// Create an array of `len` cells, each holding a clone of `initial`.
    pub fn new(len: usize, initial: T) -> Self {
        Self::from(vec![initial; len])
    }

    /// Read the value at `index`.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    pub fn get(&self, index: CellIndex) -> T {
        self.try_get(index).unwrap_or_else(|error| panic!("{error}"))
    }

    #[instrument(level = "trace", skip_all, fields(index = index))]
    pub fn try_get(&self, index: CellIndex) -> Result<T, Error> {
        let cell: &Cell<T> = self.cell(index)?;
        let guard: Guard = epoch::pin();
        Ok(cell.read(&self.cells, &guard))
    }

    /// Unconditionally store `value` at `index`.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    pub fn set(&self, index: CellIndex, value: T) {
        self.try_set(index, value)
            .unwrap_or_else(|error| panic!("{error}"));
    }

    #[instrument(level = "trace", skip_all, fields(index = index))]
    pub fn try_set(&self, index: CellIndex, value: T) -> Result<(), Error> {
        let cell: &Cell<T> = self.cell(index)?;
        let guard: Guard = epoch::pin();
        cell.write(&self.cells, value, &guard);
        Ok(())
    }

    /// Store `update` at `index` if the cell currently holds `expected`. Returns whether the
    /// value was stored.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    pub fn cas(&self, index: CellIndex, expected: T, update: T) -> bool {
        into_outcome(self.try_cas(index, expected, update))
    }

    #[instrument(level = "trace", skip_all, fields(index = index))]
    pub fn try_cas(&self, index: CellIndex, expected: T, update: T) -> Result<(), Error> {
        let cell: &Cell<T> = self.cell(index)?;
        let guard: Guard = epoch::pin();
        if cell.compare_and_set(&self.cells, &expected, Slot::Value(update), &guard) {
            Ok(())
        } else {
            Err(Error::ValueWasNotExpectedValue)
        }
    }

    /// Atomically store `update1` at `index1` and `update2` at `index2` if and only if the cells
    /// currently hold `expected1` and `expected2`. Returns whether the values were stored. A
    /// `false` result leaves both cells untouched and is never retried internally.
    ///
    /// When both indices are the same, the call is a single-cell [cas](AtomicArray::cas) and is
    /// only performed if both expected values and both update values agree. Otherwise it returns
    /// `false` without touching the cell.
    ///
    /// # Panics
    /// If either index is out of bounds. Both are checked before any cell is touched.
    pub fn cas2(
        &self,
        index1: CellIndex,
        expected1: T,
        update1: T,
        index2: CellIndex,
        expected2: T,
        update2: T,
    ) -> bool {
        into_outcome(self.try_cas2(index1, expected1, update1, index2, expected2, update2))
    }

    /// Like [cas2](AtomicArray::cas2), but reports why the operation did not take place.
    #[instrument(level = "trace", skip_all, fields(index1 = index1, index2 = index2))]
    pub fn try_cas2(
        &self,
        index1: CellIndex,
        expected1: T,
        update1: T,
        index2: CellIndex,
        expected2: T,
        update2: T,
    ) -> Result<(), Error> {
        self.cell(index1)?;
        self.cell(index2)?;

        if index1 == index2 {
            if expected1 != expected2 {
                return Err(Error::ValueWasNotExpectedValue);
            }
            if update1 != update2 {
                return Err(Error::AmbiguousUpdate { index: index1 });
            }
            return self.try_cas(index1, expected1, update1);
        }

        let guard: Guard = epoch::pin();
        if perform_cas2(
            &self.cells,
            CasWord::new(index1, expected1, update1),
            CasWord::new(index2, expected2, update2),
            &guard,
        ) {
            Ok(())
        } else {
            Err(Error::ValueWasNotExpectedValue)
        }
    }
}

/// Map the result of a `try_` operation onto the boolean API, failing fast on a bad index.
fn into_outcome(result: Result<(), Error>) -> bool {
    match result {
        Ok(()) => true,
        Err(error @ Error::IndexOutOfBounds { .. }) => panic!("{error}"),
        Err(Error::ValueWasNotExpectedValue) | Err(Error::AmbiguousUpdate { .. }) => false,
    }
}

impl<T> From<Vec<T>> for AtomicArray<T> {
    fn from(values: Vec<T>) -> Self {
        Self {
            cells: values.into_iter().map(Cell::new).collect(),
        }
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static + Debug> Debug for AtomicArray<T> {
    /// Each cell is read on its own, so the listing is not an atomic snapshot of the array.
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let guard: Guard = epoch::pin();
        f.debug_list()
            .entries(self.cells.iter().map(|cell| cell.read(&self.cells, &guard)))
            .finish()
    }
}
