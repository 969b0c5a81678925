/// The position of a cell inside its [AtomicArray](crate::AtomicArray).
///
/// Descriptors refer to the cells they act on by index rather than by address, so a descriptor
/// can be resolved by any thread holding the array and never outlives the storage it points into.
pub type CellIndex = usize;

/// The components for a single compare-and-swap on one cell.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct CasWord<T> {
    pub(crate) index: CellIndex,
    pub(crate) expected: T,
    pub(crate) desired: T,
}

impl<T> CasWord<T> {
    pub(crate) fn new(index: CellIndex, expected: T, desired: T) -> Self {
        Self {
            index,
            expected,
            desired,
        }
    }
}

/// Order two words by cell index, returning `(secondary, primary)`.
///
/// The secondary word is always the one with the lower index and is claimed first. Every caller
/// touching the same pair of cells agrees on this order no matter how the arguments were passed,
/// so helping only ever moves towards higher indices and can never go around in a circle.
pub(crate) fn order_words<T>(first: CasWord<T>, second: CasWord<T>) -> (CasWord<T>, CasWord<T>) {
    if first.index < second.index {
        (first, second)
    } else {
        (second, first)
    }
}
