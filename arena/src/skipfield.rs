//! Skipfields - let a sparse container jump over runs of empty slots
//!
//! A skipfield mirrors the occupancy of a container: occupied slots are
//! "not skipped", empty slots are "skipped". While iterating, the container
//! asks [`Skipfield::num_skipped`] how many slots it can jump over from the
//! current position.
//!
//! There are three strategies:
//!
//! * [`IntSkipfield`] - `O(1)` queries, updates cost up to the length of the
//!   affected run
//! * [`BoolSkipfield`] - `O(1)` updates, queries scan the run
//! * [`NullSkipfield`] - no bookkeeping at all, every query reports `0`
//!
//! A skipfield must not be modified while something is iterating with it.

use std::{vec, vec::Vec};

/// The operations shared by every skipfield strategy
pub trait Skipfield {
    /// Create a skipfield with `len` slots, all skipped if `init_skipped`
    fn new(len: usize, init_skipped: bool) -> Self;

    /// The number of slots tracked
    fn len(&self) -> usize;

    /// Returns true if no slots are tracked
    fn is_empty(&self) -> bool { self.len() == 0 }

    /// Grow to `len` slots
    ///
    /// If `init_skipped`, the new slots are skipped and join any skipped run
    /// that ends at the old boundary, otherwise they are not skipped.
    fn resize(&mut self, len: usize, init_skipped: bool);

    /// Mark the slot at `index` as skipped, it must currently be not skipped
    fn set_skipped(&mut self, index: usize);

    /// Mark the slot at `index` as not skipped, it must currently be skipped
    fn set_not_skipped(&mut self, index: usize);

    /// The number of consecutive skipped slots starting at `index`,
    /// or `0` if `index` is not skipped
    fn num_skipped(&self, index: usize) -> usize;
}

/// A skipfield that stores run lengths
///
/// For a skipped run of length `n` starting at `s`, slot `s + i` holds
/// `n - i`, except for the last slot of the run which holds `n` again. So
/// the start of a run says how far to jump, and the end of a run says where
/// the run started. Both ends of any run can be found in `O(1)` from the
/// neighbours of a slot, so marking a slot only has to rewrite the runs it
/// splits or joins.
///
/// ```text
/// occupancy  X X X _ _ _ X _ X _
/// skipfield  0 0 0 3 2 3 0 1 0 1
/// ```
///
/// Run lengths are stored as `u32`, so an `IntSkipfield` holds at most
/// `u32::MAX` slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntSkipfield {
    runs: Vec<u32>,
}

/// The most slots an [`IntSkipfield`] can track, every run length fits a `u32`
const MAX_RUN: usize = u32::MAX as usize;

#[track_caller]
fn assert_fits_runs(len: usize) {
    assert!(len <= MAX_RUN, "an `IntSkipfield` can't track {} slots", len);
}

impl IntSkipfield {
    fn run(&self, index: usize) -> usize { self.runs[index] as usize }

    fn set_range_skipped(&mut self, start: usize, count: usize) {
        debug_assert!(count > 0);
        let last = start + count - 1;
        for (offset, run) in self.runs[start..last].iter_mut().enumerate() {
            *run = (count - offset) as u32;
        }
        self.runs[last] = count as u32;
    }
}

impl Skipfield for IntSkipfield {
    #[track_caller]
    fn new(len: usize, init_skipped: bool) -> Self {
        assert_fits_runs(len);
        let mut skipfield = Self { runs: vec![0; len] };
        if init_skipped && len > 0 {
            skipfield.set_range_skipped(0, len);
        }
        skipfield
    }

    fn len(&self) -> usize { self.runs.len() }

    #[track_caller]
    fn resize(&mut self, len: usize, init_skipped: bool) {
        let old_len = self.len();
        assert!(len > old_len, "a skipfield can only grow, from {} to {}", old_len, len);
        assert_fits_runs(len);
        self.runs.resize(len, 0);

        if init_skipped {
            let prev = if old_len == 0 { 0 } else { self.run(old_len - 1) };
            self.set_range_skipped(old_len - prev, len - old_len + prev);
        }
    }

    #[track_caller]
    fn set_skipped(&mut self, index: usize) {
        assert_eq!(self.runs[index], 0, "slot {} is already skipped", index);
        let prev = if index > 0 { self.run(index - 1) } else { 0 };
        let next = if index + 1 < self.len() { self.run(index + 1) } else { 0 };

        match (prev, next) {
            (0, 0) => self.runs[index] = 1,
            // join the run on the right
            // before: 0 0 X 4 3 2 4 0
            // after:  0 0 5 4 3 2 5 0
            (0, next) => {
                let len = (next + 1) as u32;
                self.runs[index] = len;
                self.runs[index + next] = len;
            }
            // join the run on the left
            // before: 0 4 3 2 4 X 0
            // after:  0 5 4 3 2 5 0
            (prev, 0) => self.set_range_skipped(index - prev, prev + 1),
            // join both runs
            // before: 0 2 2 X 2 2 0
            // after:  0 5 4 3 2 5 0
            (prev, next) => self.set_range_skipped(index - prev, prev + next + 1),
        }
    }

    #[track_caller]
    fn set_not_skipped(&mut self, index: usize) {
        let current = self.run(index);
        assert_ne!(current, 0, "slot {} is not skipped", index);
        let prev = if index > 0 { self.run(index - 1) } else { 0 };
        let next = if index + 1 < self.len() { self.run(index + 1) } else { 0 };

        self.runs[index] = 0;

        match (prev, next) {
            (0, 0) => (),
            // first slot of a run
            // before: 0 X 4 3 5 0
            // after:  0 0 4 3 4 0
            (0, _) => self.runs[index + current - 1] = (current - 1) as u32,
            // last slot of a run, which stores the full run length
            // before: 0 5 4 3 2 X 0
            // after:  0 4 3 2 4 0 0
            (_, 0) => self.set_range_skipped(index + 1 - current, current - 1),
            // middle of a run, split it in two
            // before: 0 5 4 X 2 5 0
            // after:  0 2 2 0 2 2 0
            (_, _) => {
                let last = index + current - 1;
                let first = last + 1 - self.run(last);
                self.set_range_skipped(first, index - first);
                self.set_range_skipped(index + 1, last - index);
            }
        }
    }

    #[inline]
    fn num_skipped(&self, index: usize) -> usize { self.run(index) }
}

/// A skipfield that stores one flag per slot
///
/// Updates are a single write, but [`num_skipped`](Skipfield::num_skipped)
/// has to scan the whole run. Useful when a container is modified far more
/// often than it is iterated, for example while iterating over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolSkipfield {
    skipped: Vec<bool>,
}

impl Skipfield for BoolSkipfield {
    fn new(len: usize, init_skipped: bool) -> Self {
        Self {
            skipped: vec![init_skipped; len],
        }
    }

    fn len(&self) -> usize { self.skipped.len() }

    #[track_caller]
    fn resize(&mut self, len: usize, init_skipped: bool) {
        assert!(len > self.len(), "a skipfield can only grow, from {} to {}", self.len(), len);
        self.skipped.resize(len, init_skipped);
    }

    #[track_caller]
    fn set_skipped(&mut self, index: usize) {
        assert!(!self.skipped[index], "slot {} is already skipped", index);
        self.skipped[index] = true;
    }

    #[track_caller]
    fn set_not_skipped(&mut self, index: usize) {
        assert!(self.skipped[index], "slot {} is not skipped", index);
        self.skipped[index] = false;
    }

    fn num_skipped(&self, index: usize) -> usize {
        self.skipped[index..].iter().take_while(|&&skipped| skipped).count()
    }
}

/// A skipfield that tracks nothing
///
/// Every slot reports `0` skipped, so a container using it has to check each
/// slot itself while iterating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NullSkipfield {
    len: usize,
}

impl Skipfield for NullSkipfield {
    fn new(len: usize, _: bool) -> Self { Self { len } }

    fn len(&self) -> usize { self.len }

    fn resize(&mut self, len: usize, _: bool) { self.len = len }

    fn set_skipped(&mut self, _: usize) {}

    fn set_not_skipped(&mut self, _: usize) {}

    #[inline]
    fn num_skipped(&self, _: usize) -> usize { 0 }
}
