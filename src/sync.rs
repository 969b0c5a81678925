//! A module which decides which synchronization primitives to use throughout the rest of the crate
//! depending on features and configuration options.
//!
//! Cell slots go through `crossbeam_epoch`. Under `loom`, crossbeam-epoch must be built with its
//! own loom backend (`--cfg crossbeam_loom`) so that every slot load and CAS is a loom atomic.
//! Shuttle cannot see crossbeam-epoch's atomics at all, so the cells call [yield_point] before
//! each slot access to hand the scheduler a chance to switch threads there.

#[cfg(all(loom, not(crossbeam_loom)))]
compile_error!("building with --cfg loom also requires --cfg crossbeam_loom");

cfg_if::cfg_if! {
    if #[cfg(loom)] {
        pub(crate) use loom::sync::atomic::{AtomicU8, Ordering};

        /// crossbeam-epoch's loom atomics already are scheduling points.
        #[inline(always)]
        pub(crate) fn yield_point() {}
    } else if #[cfg(feature = "shuttle")] {
        pub(crate) use shuttle::sync::atomic::{AtomicU8, Ordering};

        pub(crate) fn yield_point() {
            shuttle::thread::yield_now();
        }
    } else {
        pub(crate) use core::sync::atomic::{AtomicU8, Ordering};

        #[inline(always)]
        pub(crate) fn yield_point() {}
    }
}
