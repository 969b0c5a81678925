use crate::types::CellIndex;
use displaydoc::Display;

/// Any error which can occur during an operation on an [AtomicArray](crate::AtomicArray).
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Error {
    /// The value at one of the target cells was not equal to the expected value.
    ValueWasNotExpectedValue,

    /// Index {index} is out of bounds for an array of length {len}.
    IndexOutOfBounds { index: CellIndex, len: usize },

    /** Both words of a CAS2 target cell {index} with the same expected value but different
        desired values, so there is no single value to write.
    */
    AmbiguousUpdate { index: CellIndex },
}

impl std::error::Error for Error {}
