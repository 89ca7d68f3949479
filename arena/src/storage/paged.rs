use slotkit_core::{DefaultKey, GenerationalKey, Scalar};
use std::{boxed::Box, vec::Vec};

use super::Cell;

/// Cells in a list of fixed size pages
///
/// The page size is the capacity the storage was created with (at least
/// one). Growing only ever appends whole pages, so a value never moves
/// while it's in the storage. Each access goes through the page list first.
pub struct PagedStorage<T, K: GenerationalKey = DefaultKey> {
    pages: Vec<Box<[Cell<T>]>>,
    page_size: usize,
    generations: Vec<K::Generation>,
}

impl<T, K: GenerationalKey> PagedStorage<T, K> {
    fn allocate(capacity: usize) -> Self {
        let mut storage = Self {
            pages: Vec::new(),
            page_size: capacity.max(1),
            generations: Vec::new(),
        };
        storage.grow(capacity);
        storage
    }

    /// The number of slots in each page
    pub fn page_size(&self) -> usize { self.page_size }

    fn grow(&mut self, len: usize) {
        while self.generations.len() < len {
            let end = self.generations.len() + self.page_size;
            self.pages.push((0..self.page_size).map(|_| Cell::free(end)).collect());
            self.generations.resize(end, Scalar::ZERO);
        }
    }

    // whole pages only
    fn limit(&self, limit: usize) -> usize { limit - limit % self.page_size }

    #[inline]
    fn cell(&self, index: usize) -> &Cell<T> { &self.pages[index / self.page_size][index % self.page_size] }

    #[inline]
    fn cell_mut(&mut self, index: usize) -> &mut Cell<T> {
        &mut self.pages[index / self.page_size][index % self.page_size]
    }
}

imp_storage!(PagedStorage);

#[cfg(test)]
mod test {
    use super::*;
    use crate::storage::Storage;
    use slotkit_core::CompositeKey;

    #[test]
    fn values_keep_their_address() {
        let mut storage = PagedStorage::<u64, CompositeKey>::with_capacity(3);
        assert_eq!(storage.page_size(), 3);
        storage.store_element(1, 42, 1);
        let before: *const u64 = storage.data(1);

        storage.resize(4);
        assert_eq!(storage.len(), 6);
        storage.resize(13);
        assert_eq!(storage.len(), 15);

        assert!(core::ptr::eq(before, storage.data(1)));
        assert_eq!(*storage.data(1), 42);
    }

    #[test]
    fn empty_pages_hold_one_slot() {
        let mut storage = PagedStorage::<u8, CompositeKey>::with_capacity(0);
        assert_eq!(storage.len(), 0);
        storage.resize(2);
        assert_eq!(storage.len(), 2);
        assert_eq!(storage.page_size(), 1);
    }

    #[test]
    fn resize_limit_rounds_down_to_pages() {
        let storage = PagedStorage::<u8, CompositeKey>::with_capacity(100);
        assert_eq!(storage.resize_limit(256), 200);
        assert_eq!(storage.resize_limit(300), 300);
        assert_eq!(storage.resize_limit(99), 0);
    }
}
