#![no_std]
#![warn(missing_docs)]

//! A fixed-size, index-addressed vector where every slot is either
//! occupied or empty.
//!
//! Unlike a `Vec<Option<T>>`, the occupancy flags are kept apart from
//! the values, and values are constructed and destroyed in place one
//! slot at a time. There are no handles and no generations: a slot is
//! addressed purely by its index.

extern crate alloc as std;

use core::{
    fmt,
    mem::{self, MaybeUninit},
    ops::{Index, IndexMut},
};
use std::{boxed::Box, vec::Vec};

/// A vector of optionally occupied slots
pub struct SparseVector<T> {
    values: Box<[MaybeUninit<T>]>,
    occupied: Vec<bool>,
    num_occupied: usize,
}

fn uninit_slots<T>(len: usize) -> Box<[MaybeUninit<T>]> { (0..len).map(|_| MaybeUninit::uninit()).collect() }

impl<T> Default for SparseVector<T> {
    fn default() -> Self { Self::new(0) }
}

impl<T> Drop for SparseVector<T> {
    fn drop(&mut self) { self.clear() }
}

impl<T> SparseVector<T> {
    /// Create a vector with `len` empty slots
    pub fn new(len: usize) -> Self {
        Self {
            values: uninit_slots(len),
            occupied: std::vec![false; len],
            num_occupied: 0,
        }
    }

    /// The number of slots, occupied or not
    pub fn len(&self) -> usize { self.values.len() }

    /// Returns true if there are no slots at all
    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    /// The number of occupied slots
    pub fn occupied(&self) -> usize { self.num_occupied }

    /// Grow to `len` slots, the new slots start out empty
    ///
    /// Occupied values are moved into the new allocation.
    ///
    /// # Panics
    ///
    /// If `len` is not larger than the current length
    #[track_caller]
    pub fn resize(&mut self, len: usize) {
        let old_len = self.len();
        assert!(len > old_len, "a `SparseVector` can only grow, from {} to {}", old_len, len);

        let mut values = Vec::from(mem::take(&mut self.values));
        values.reserve_exact(len - old_len);
        values.resize_with(len, MaybeUninit::uninit);
        self.values = values.into_boxed_slice();
        self.occupied.resize(len, false);

        tracing::debug!(old_len, len, "resized sparse vector");
    }

    /// Returns true if the slot at `index` is in bounds and occupied
    pub fn contains(&self, index: usize) -> bool { self.occupied.get(index).copied().unwrap_or(false) }

    /// Construct `value` in the empty slot at `index`, returning a reference to it
    ///
    /// # Panics
    ///
    /// If `index` is out of bounds or already occupied
    #[track_caller]
    pub fn emplace(&mut self, index: usize, value: T) -> &mut T {
        assert!(
            index < self.len(),
            "index {} is out of bounds for a `SparseVector` of length {}",
            index,
            self.len()
        );
        assert!(!self.occupied[index], "slot {} of a `SparseVector` is already occupied", index);

        self.occupied[index] = true;
        self.num_occupied += 1;
        self.values[index].write(value)
    }

    /// Construct `value` in the empty slot at `index`
    ///
    /// # Panics
    ///
    /// If `index` is out of bounds or already occupied
    #[track_caller]
    pub fn insert(&mut self, index: usize, value: T) { self.emplace(index, value); }

    /// Move the value out of the slot at `index`, leaving it empty
    ///
    /// Returns `None` if the slot is empty or out of bounds
    pub fn take(&mut self, index: usize) -> Option<T> {
        if !self.contains(index) {
            return None
        }

        self.occupied[index] = false;
        self.num_occupied -= 1;
        // the flag was set, so the slot is initialized, and clearing it
        // above makes sure it's never read again
        Some(unsafe { self.values[index].assume_init_read() })
    }

    /// Destroy the value in the slot at `index`
    ///
    /// # Panics
    ///
    /// If the slot is empty or out of bounds
    #[track_caller]
    pub fn erase(&mut self, index: usize) {
        if self.take(index).is_none() {
            panic!("tried to erase the empty slot {} of a `SparseVector`", index)
        }
    }

    /// Return a shared reference to the value at `index`, if occupied
    pub fn get(&self, index: usize) -> Option<&T> {
        if self.contains(index) {
            Some(unsafe { self.values[index].assume_init_ref() })
        } else {
            None
        }
    }

    /// Return a unique reference to the value at `index`, if occupied
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if self.contains(index) {
            Some(unsafe { self.values[index].assume_init_mut() })
        } else {
            None
        }
    }

    /// Destroy every value, keeping all slots
    pub fn clear(&mut self) {
        for index in 0..self.len() {
            drop(self.take(index));
        }
    }

    /// An iterator over the occupied slots and their indices, in index order
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            values: self.values.iter(),
            occupied: self.occupied.iter(),
            index: 0,
        }
    }
}

impl<T> Index<usize> for SparseVector<T> {
    type Output = T;

    #[track_caller]
    fn index(&self, index: usize) -> &Self::Output {
        self.get(index)
            .unwrap_or_else(|| panic!("tried to access the empty slot {} of a `SparseVector`", index))
    }
}

impl<T> IndexMut<usize> for SparseVector<T> {
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        self.get_mut(index)
            .unwrap_or_else(|| panic!("tried to access the empty slot {} of a `SparseVector`", index))
    }
}

impl<T: Clone> Clone for SparseVector<T> {
    fn clone(&self) -> Self {
        let mut clone = Self::new(self.len());
        for (index, value) in self.iter() {
            clone.insert(index, value.clone());
        }
        clone
    }
}

impl<T: fmt::Debug> fmt::Debug for SparseVector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.debug_map().entries(self.iter()).finish() }
}

/// Returned by [`SparseVector::iter`]
pub struct Iter<'a, T> {
    values: core::slice::Iter<'a, MaybeUninit<T>>,
    occupied: core::slice::Iter<'a, bool>,
    index: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (usize, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let value = self.values.next()?;
            let &occupied = self.occupied.next()?;
            let index = self.index;
            self.index += 1;

            if occupied {
                return Some((index, unsafe { value.assume_init_ref() }))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) { (0, self.values.size_hint().1) }
}

impl<T> core::iter::FusedIterator for Iter<'_, T> {}

#[cfg(test)]
mod test {
    use super::*;
    use std::{
        rc::Rc,
        string::{String, ToString},
        vec,
    };

    fn collect<T: Clone>(v: &SparseVector<T>) -> Vec<Option<T>> { (0..v.len()).map(|i| v.get(i).cloned()).collect() }

    fn s(value: &str) -> Option<String> { Some(value.to_string()) }

    #[test]
    fn emplace_erase_resize() {
        let mut sparse = SparseVector::<String>::new(8);
        assert_eq!(collect(&sparse), vec![None; 8]);

        sparse.emplace(1, "foobar".to_string());
        sparse.emplace(5, "joel".to_string());
        sparse.emplace(6, "bazbaz".to_string());
        assert_eq!(collect(&sparse), [None, s("foobar"), None, None, None, s("joel"), s("bazbaz"), None]);
        assert_eq!(sparse.occupied(), 3);

        sparse[1] = "blub".to_string();
        assert_eq!(collect(&sparse), [None, s("blub"), None, None, None, s("joel"), s("bazbaz"), None]);
        assert_eq!(sparse.occupied(), 3);

        sparse.erase(5);
        assert_eq!(collect(&sparse), [None, s("blub"), None, None, None, None, s("bazbaz"), None]);
        assert_eq!(sparse.occupied(), 2);

        sparse.resize(12);
        let mut expected = vec![None; 12];
        expected[1] = s("blub");
        expected[6] = s("bazbaz");
        assert_eq!(collect(&sparse), expected);
        assert_eq!(sparse.len(), 12);
        assert_eq!(sparse.occupied(), 2);
    }

    #[test]
    fn drops_every_occupant() {
        let tracker = Rc::new(());
        let mut sparse = SparseVector::new(4);
        sparse.insert(0, tracker.clone());
        sparse.insert(3, tracker.clone());
        assert_eq!(Rc::strong_count(&tracker), 3);

        sparse.resize(6);
        assert_eq!(Rc::strong_count(&tracker), 3);

        drop(sparse.take(0));
        assert_eq!(Rc::strong_count(&tracker), 2);

        drop(sparse);
        assert_eq!(Rc::strong_count(&tracker), 1);
    }

    #[test]
    fn iter_skips_empty_slots() {
        let mut sparse = SparseVector::new(5);
        sparse.insert(4, 'd');
        sparse.insert(0, 'a');
        sparse.insert(2, 'c');

        assert_eq!(sparse.iter().collect::<Vec<_>>(), [(0, &'a'), (2, &'c'), (4, &'d')]);
        assert_eq!(sparse.clone().iter().count(), 3);
    }

    #[test]
    #[should_panic]
    fn emplace_into_occupied() {
        let mut sparse = SparseVector::new(2);
        sparse.insert(1, 0);
        sparse.insert(1, 1);
    }

    #[test]
    #[should_panic]
    fn shrinking_resize() {
        let mut sparse = SparseVector::<u8>::new(4);
        sparse.resize(4);
    }

    #[test]
    fn out_of_bounds_is_absent() {
        let mut sparse = SparseVector::<u8>::new(2);
        assert!(!sparse.contains(7));
        assert_eq!(sparse.get(7), None);
        assert_eq!(sparse.take(7), None);
    }
}
