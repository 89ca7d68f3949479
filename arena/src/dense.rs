//! The dense slot map
//!
//! All values live packed together in one `Vec`, so iterating is as fast as
//! iterating a slice. Keys don't point at values directly, they name a slot
//! in an indirection table which stores the value's current position. Removing
//! a value moves the last value into the hole, and the slot of the moved value
//! is found through a table of back-references and re-pointed.
//!
//! ```text
//! slots     [ 2 | 0 | free | 1 ]      key.index -> position
//! values    [ a | b | c ]
//! backrefs  [ 1 | 3 | 0 ]             position  -> key.index
//! ```
//!
//! There is no `next(key)` like [`SlotMap::next`](crate::SlotMap::next),
//! iterate over the values (or [`entries`](DenseSlotMap::entries)) instead.

use core::{
    fmt,
    iter::FusedIterator,
    mem,
    ops::{Index, IndexMut},
};
use std::vec::{self, Vec};

use slotkit_core::{DefaultKey, GenerationalKey, GrowthPolicy, Scalar};

use crate::error::CapacityError;

/// Returned by [`DenseSlotMap::iter`]
pub type Iter<'a, T> = core::slice::Iter<'a, T>;
/// Returned by [`DenseSlotMap::iter_mut`]
pub type IterMut<'a, T> = core::slice::IterMut<'a, T>;
/// Returned by [`DenseSlotMap::into_iter`]
pub type IntoIter<T> = vec::IntoIter<T>;

/// While occupied `index` is the value's position, while free it links to
/// the next free slot. `generation` is the generation of the current key, or
/// of the next key handed out if free.
#[derive(Debug, Clone, Copy)]
struct Slot<G> {
    index: usize,
    generation: G,
}

/// A dense slot map, see the [module docs](self) for details
pub struct DenseSlotMap<T, K: GenerationalKey = DefaultKey> {
    values: Vec<T>,
    backrefs: Vec<usize>,
    slots: Vec<Slot<K::Generation>>,
    free_head: usize,
    growth: GrowthPolicy,
}

fn free_slots<G: Scalar>(range: core::ops::Range<usize>) -> impl Iterator<Item = Slot<G>> {
    range.map(|index| Slot {
        index: index + 1,
        generation: G::ONE,
    })
}

impl<T, K: GenerationalKey> DenseSlotMap<T, K> {
    /// Create a dense slot map with `capacity` slots that never grows
    #[track_caller]
    pub fn new(capacity: usize) -> Self { Self::with_growth(capacity, GrowthPolicy::FIXED) }

    /// Create a dense slot map with `capacity` slots that grows according to `growth`
    ///
    /// # Panics
    ///
    /// If `K` can't address `capacity` slots
    #[track_caller]
    pub fn with_growth(capacity: usize, growth: GrowthPolicy) -> Self {
        assert!(
            capacity <= K::max_capacity(),
            "a `DenseSlotMap` with capacity {} can't be addressed by its key type",
            capacity
        );

        Self {
            values: Vec::with_capacity(capacity),
            backrefs: Vec::with_capacity(capacity),
            slots: free_slots(0..capacity).collect(),
            free_head: 0,
            growth,
        }
    }

    /// The number of values in the map
    pub fn len(&self) -> usize { self.values.len() }

    /// Returns true if the map holds no values
    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    /// The number of slots in the map
    pub fn capacity(&self) -> usize { self.slots.len() }

    /// The policy used to grow the map once it's full
    pub fn growth_policy(&self) -> GrowthPolicy { self.growth }

    /// Grow the map to `capacity` slots
    ///
    /// The new slots are appended to the end of the free list.
    ///
    /// # Panics
    ///
    /// If `capacity` is not larger than the current capacity, or `K` can't
    /// address that many slots
    #[track_caller]
    pub fn resize(&mut self, capacity: usize) {
        let old_capacity = self.capacity();
        assert!(
            capacity > old_capacity,
            "a `DenseSlotMap` can only grow, from {} to {}",
            old_capacity,
            capacity
        );
        assert!(
            capacity <= K::max_capacity(),
            "a `DenseSlotMap` with capacity {} can't be addressed by its key type",
            capacity
        );

        let additional = capacity - self.values.len();
        self.values.reserve_exact(additional);
        self.backrefs.reserve_exact(additional);
        self.slots.extend(free_slots(old_capacity..capacity));

        tracing::debug!(old_capacity, capacity, "resized dense slot map");
    }

    /// Make room for at least `additional` more values without growing on insert
    #[track_caller]
    pub fn reserve(&mut self, additional: usize) {
        let capacity = self.len().saturating_add(additional);
        if capacity > self.capacity() {
            self.resize(capacity)
        }
    }

    /// Insert a value at the end of the values, growing the map if it's full
    ///
    /// # Errors
    ///
    /// If the map is full and its growth policy doesn't enlarge it, the
    /// value is handed back in the error
    pub fn try_insert(&mut self, value: T) -> Result<K, CapacityError<T>> {
        let capacity = self.capacity();
        if self.free_head >= capacity {
            match self.growth.next_capacity(capacity).map(|next| next.min(K::max_capacity())) {
                Some(next) if next > capacity => self.resize(next),
                _ => {
                    tracing::warn!(capacity, "dense slot map is full and its growth policy can't enlarge it");
                    return Err(CapacityError::new(capacity, value))
                }
            }
        }

        let index = self.free_head;
        let position = self.values.len();
        let slot = &mut self.slots[index];
        self.free_head = mem::replace(&mut slot.index, position);
        let generation = slot.generation;

        self.values.push(value);
        self.backrefs.push(index);

        tracing::trace!(index, position, "took free slot");

        Ok(K::new(Scalar::from_usize(index), generation))
    }

    /// Insert a value at the end of the values, growing the map if it's full
    ///
    /// # Panics
    ///
    /// If the map is full and its growth policy doesn't enlarge it
    #[track_caller]
    pub fn insert(&mut self, value: T) -> K {
        match self.try_insert(value) {
            Ok(key) => key,
            Err(error) => panic!("{}", error),
        }
    }

    /// Returns true if `key` names a value in this map
    ///
    /// # Panics
    ///
    /// If a valid key's index is out of bounds, which can only happen with
    /// a key from another map
    #[track_caller]
    pub fn contains(&self, key: K) -> bool { self.position(key).is_some() }

    #[track_caller]
    fn position(&self, key: K) -> Option<usize> {
        if !key.is_valid() {
            return None
        }

        let index = key.index().to_usize();
        let slot = match self.slots.get(index) {
            Some(slot) => slot,
            None => panic!(
                "index {} is out of bounds for a `DenseSlotMap` with capacity {}",
                index,
                self.capacity()
            ),
        };

        // a free slot's link is not a position, so it has to point back
        let occupied = slot.generation == key.generation() && self.backrefs.get(slot.index) == Some(&index);
        occupied.then(|| slot.index)
    }

    /// Remove the value named by `key` and return it,
    /// or `None` if `key` doesn't name a value in this map
    ///
    /// The last value is moved into the removed value's position.
    #[track_caller]
    pub fn take(&mut self, key: K) -> Option<T> {
        let position = self.position(key)?;
        let index = key.index().to_usize();

        let value = self.values.swap_remove(position);
        self.backrefs.swap_remove(position);
        if let Some(&moved) = self.backrefs.get(position) {
            self.slots[moved].index = position;
        }

        self.slots[index] = Slot {
            index: self.free_head,
            generation: key.next_generation().generation(),
        };
        self.free_head = index;

        tracing::trace!(index, position, "freed slot");

        Some(value)
    }

    /// Remove the value named by `key`, returns true if there was one
    #[track_caller]
    pub fn remove(&mut self, key: K) -> bool { self.take(key).is_some() }

    /// The value named by `key`, if any
    #[track_caller]
    pub fn find(&self, key: K) -> Option<&T> {
        let position = self.position(key)?;
        Some(&self.values[position])
    }

    /// The value named by `key`, if any
    #[track_caller]
    pub fn find_mut(&mut self, key: K) -> Option<&mut T> {
        let position = self.position(key)?;
        Some(&mut self.values[position])
    }

    /// The value named by `key`
    ///
    /// # Panics
    ///
    /// If `key` doesn't name a value in this map
    #[track_caller]
    pub fn get(&self, key: K) -> &T {
        match self.find(key) {
            Some(value) => value,
            None => panic!("Tried to access `DenseSlotMap` with a stale key {:?}", key),
        }
    }

    /// The value named by `key`
    ///
    /// # Panics
    ///
    /// If `key` doesn't name a value in this map
    #[track_caller]
    pub fn get_mut(&mut self, key: K) -> &mut T {
        match self.find_mut(key) {
            Some(value) => value,
            None => panic!("Tried to access `DenseSlotMap` with a stale key {:?}", key),
        }
    }

    /// Recover the key of a value from a reference to it
    ///
    /// Returns `None` if `value` doesn't point into this map's values. This
    /// is how a value found by iterating can be removed:
    ///
    /// ```
    /// # use slotkit_arena::DenseSlotMap;
    /// let mut map = DenseSlotMap::<_>::new(4);
    /// map.insert(1);
    /// map.insert(2);
    ///
    /// let two = map.iter().find(|&&value| value == 2).unwrap();
    /// let key = map.get_key(two).unwrap();
    /// assert!(map.remove(key));
    /// ```
    ///
    /// # Panics
    ///
    /// If `T` is zero sized, since then every value has the same address
    pub fn get_key(&self, value: &T) -> Option<K> {
        let size = mem::size_of::<T>();
        assert_ne!(size, 0, "can't recover keys from the addresses of zero sized values");

        let offset = (value as *const T as usize).wrapping_sub(self.values.as_ptr() as usize);
        if offset % size != 0 {
            return None
        }

        let &index = self.backrefs.get(offset / size)?;
        Some(K::new(Scalar::from_usize(index), self.slots[index].generation))
    }

    /// Remove every value for which `f` returns false
    pub fn retain<F: FnMut(K, &mut T) -> bool>(&mut self, mut f: F) {
        // walk backwards so the value swapped into a hole was already visited
        for position in (0..self.len()).rev() {
            let index = self.backrefs[position];
            let key = K::new(Scalar::from_usize(index), self.slots[index].generation);
            if !f(key, &mut self.values[position]) {
                self.remove(key);
            }
        }
    }

    /// Remove every value, keeping the capacity
    pub fn clear(&mut self) {
        // removing the last value never moves another one
        while let Some(&index) = self.backrefs.last() {
            self.remove(K::new(Scalar::from_usize(index), self.slots[index].generation));
        }
    }

    /// The values, in no particular order
    pub fn as_slice(&self) -> &[T] { &self.values }

    /// The values, in no particular order
    pub fn as_mut_slice(&mut self) -> &mut [T] { &mut self.values }

    /// An iterator over the values
    pub fn iter(&self) -> Iter<'_, T> { self.values.iter() }

    /// An iterator over the values
    pub fn iter_mut(&mut self) -> IterMut<'_, T> { self.values.iter_mut() }

    /// An iterator over the keys, in the same order as [`iter`](Self::iter)
    pub fn keys(&self) -> Keys<'_, K> {
        Keys {
            backrefs: self.backrefs.iter(),
            slots: &self.slots,
        }
    }

    /// An iterator over the keys and values, in the same order as [`iter`](Self::iter)
    pub fn entries(&self) -> Entries<'_, T, K> {
        Entries {
            keys: self.keys(),
            values: self.values.iter(),
        }
    }
}

impl<T, K: GenerationalKey> Index<K> for DenseSlotMap<T, K> {
    type Output = T;

    #[track_caller]
    fn index(&self, key: K) -> &Self::Output { self.get(key) }
}

impl<T, K: GenerationalKey> IndexMut<K> for DenseSlotMap<T, K> {
    #[track_caller]
    fn index_mut(&mut self, key: K) -> &mut Self::Output { self.get_mut(key) }
}

impl<T: Clone, K: GenerationalKey> Clone for DenseSlotMap<T, K> {
    fn clone(&self) -> Self {
        Self {
            values: self.values.clone(),
            backrefs: self.backrefs.clone(),
            slots: self.slots.clone(),
            free_head: self.free_head,
            growth: self.growth,
        }
    }
}

impl<T: fmt::Debug, K: GenerationalKey> fmt::Debug for DenseSlotMap<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.debug_map().entries(self.entries()).finish() }
}

impl<T, K: GenerationalKey> IntoIterator for DenseSlotMap<T, K> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter { self.values.into_iter() }
}

impl<'a, T, K: GenerationalKey> IntoIterator for &'a DenseSlotMap<T, K> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter { self.iter() }
}

impl<'a, T, K: GenerationalKey> IntoIterator for &'a mut DenseSlotMap<T, K> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter { self.iter_mut() }
}

/// Returned by [`DenseSlotMap::keys`]
pub struct Keys<'a, K: GenerationalKey> {
    backrefs: core::slice::Iter<'a, usize>,
    slots: &'a [Slot<K::Generation>],
}

impl<K: GenerationalKey> Iterator for Keys<'_, K> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        let &index = self.backrefs.next()?;
        Some(K::new(Scalar::from_usize(index), self.slots[index].generation))
    }

    fn size_hint(&self) -> (usize, Option<usize>) { self.backrefs.size_hint() }
}

impl<K: GenerationalKey> DoubleEndedIterator for Keys<'_, K> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let &index = self.backrefs.next_back()?;
        Some(K::new(Scalar::from_usize(index), self.slots[index].generation))
    }
}

impl<K: GenerationalKey> ExactSizeIterator for Keys<'_, K> {}
impl<K: GenerationalKey> FusedIterator for Keys<'_, K> {}

/// Returned by [`DenseSlotMap::entries`]
pub struct Entries<'a, T, K: GenerationalKey> {
    keys: Keys<'a, K>,
    values: Iter<'a, T>,
}

impl<'a, T, K: GenerationalKey> Iterator for Entries<'a, T, K> {
    type Item = (K, &'a T);

    fn next(&mut self) -> Option<Self::Item> { Some((self.keys.next()?, self.values.next()?)) }

    fn size_hint(&self) -> (usize, Option<usize>) { self.keys.size_hint() }
}

impl<T, K: GenerationalKey> DoubleEndedIterator for Entries<'_, T, K> {
    fn next_back(&mut self) -> Option<Self::Item> { Some((self.keys.next_back()?, self.values.next_back()?)) }
}

impl<T, K: GenerationalKey> ExactSizeIterator for Entries<'_, T, K> {}
impl<T, K: GenerationalKey> FusedIterator for Entries<'_, T, K> {}
