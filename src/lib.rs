//! A lock-free array of cells supporting a double-compare double-swap ("CAS2") built from nothing
//! more than single-word compare-and-swap.
//!
//! [AtomicArray::cas2] atomically replaces the values of two cells if and only if both hold their
//! expected values. It works by publishing a descriptor into the lower-indexed cell, claiming the
//! higher-indexed cell with a restricted double-compare single-swap gated on that descriptor
//! still being undecided, resolving the outcome with a single status CAS, and finally writing the
//! resulting values back. Any thread which runs into a descriptor finishes it before carrying on,
//! so a stalled thread never blocks the others.
//!
//! Cell contents live in heap nodes managed by [crossbeam_epoch]: a helper can always dereference
//! a descriptor it has loaded, and a node's address is never reused while someone might still
//! compare against it.
//!
//! ```
//! use cas2::AtomicArray;
//!
//! let array: AtomicArray<u32> = AtomicArray::new(2, 0);
//! assert!(array.cas2(0, 0, 1, 1, 0, 1));
//! assert!(!array.cas2(0, 1, 2, 1, 0, 2));
//! assert_eq!(array.get(0), 1);
//! assert_eq!(array.get(1), 1);
//! ```

mod array;
mod cell;
mod descriptor;
pub mod err;
mod status;
mod sync;
mod types;

pub use array::AtomicArray;
pub use err::Error;
pub use types::CellIndex;
