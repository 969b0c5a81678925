use crate::sync::{AtomicU8, Ordering};
use core::fmt::{Debug, Display, Formatter};

/// The resolution state of a descriptor.
///
/// `Pending` can transition to either `Success` or `Failure`, exactly once. Both are terminal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Status {
    /// The operation has been published but nobody has decided its outcome yet.
    Pending = 0,
    /// The operation took effect.
    Success = 1,
    /// The operation was abandoned and every cell it touched is restored.
    Failure = 2,
}

impl Status {
    fn from_raw(raw: u8) -> Self {
        match raw {
            r if r == Status::Pending as u8 => Status::Pending,
            r if r == Status::Success as u8 => Status::Success,
            _ => Status::Failure,
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A [Status] which can be read and resolved concurrently by any number of helpers.
pub(crate) struct AtomicStatus(AtomicU8);

impl AtomicStatus {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(Status::Pending as u8))
    }

    pub(crate) fn load(&self) -> Status {
        Status::from_raw(self.0.load(Ordering::Acquire))
    }

    /// Move from `Pending` to `outcome` unless somebody else already resolved this status.
    ///
    /// Returns the status that won, which is `outcome` only if this call was the first writer.
    pub(crate) fn resolve(&self, outcome: Status) -> Status {
        match self.0.compare_exchange(
            Status::Pending as u8,
            outcome as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => outcome,
            Err(actual) => Status::from_raw(actual),
        }
    }
}

impl Debug for AtomicStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("AtomicStatus").field(&self.load()).finish()
    }
}
