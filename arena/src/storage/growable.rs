use slotkit_core::{DefaultKey, GenerationalKey, Scalar};
use std::vec::Vec;

use super::Cell;

/// Cells in one contiguous buffer
///
/// Growing reallocates the buffer and moves every cell, so references into
/// the storage don't survive a resize. In exchange every access is a single
/// index into the buffer.
pub struct GrowableStorage<T, K: GenerationalKey = DefaultKey> {
    cells: Vec<Cell<T>>,
    generations: Vec<K::Generation>,
}

impl<T, K: GenerationalKey> GrowableStorage<T, K> {
    fn allocate(capacity: usize) -> Self {
        let mut storage = Self {
            cells: Vec::new(),
            generations: Vec::new(),
        };
        storage.grow(capacity);
        storage
    }

    fn grow(&mut self, len: usize) {
        if len <= self.cells.len() {
            return
        }

        self.cells.reserve_exact(len - self.cells.len());
        self.cells.resize_with(len, || Cell::free(len));
        self.generations.resize(len, Scalar::ZERO);
    }

    fn limit(&self, limit: usize) -> usize { limit }

    #[inline]
    fn cell(&self, index: usize) -> &Cell<T> { &self.cells[index] }

    #[inline]
    fn cell_mut(&mut self, index: usize) -> &mut Cell<T> { &mut self.cells[index] }
}

imp_storage!(GrowableStorage);
