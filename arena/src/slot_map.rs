//! The sparse slot map
//!
//! Values stay in the slot they were inserted into until they are removed.
//! Removing a value frees its slot for a later insert, and the key that
//! named the removed value is rejected from then on because every insert
//! hands out a fresh generation from a map wide counter.
//!
//! A [`SlotMap`] is generic over the [`Storage`] that holds its cells and
//! the [`Skipfield`] that speeds up iteration over runs of empty slots. The
//! aliases [`HopSlotMap`] and [`PagedSlotMap`] name the common
//! combinations.

use core::{
    fmt,
    iter::FusedIterator,
    marker::PhantomData,
    ops::{Index, IndexMut},
};

use slotkit_core::{DefaultKey, GenerationalKey, GrowthPolicy, Scalar};

use crate::{
    error::CapacityError,
    skipfield::{IntSkipfield, NullSkipfield, Skipfield},
    storage::{GrowableStorage, PagedStorage, Storage},
};

/// A [`SlotMap`] that iterates in time proportional to its length,
/// not its capacity
pub type HopSlotMap<T, K = DefaultKey> = SlotMap<T, K, GrowableStorage<T, K>, IntSkipfield>;

/// A [`SlotMap`] whose values never move while they're in the map
pub type PagedSlotMap<T, K = DefaultKey, F = NullSkipfield> = SlotMap<T, K, PagedStorage<T, K>, F>;

/// A sparse slot map, see the [module docs](self) for details
pub struct SlotMap<T, K = DefaultKey, S = GrowableStorage<T, K>, F = NullSkipfield>
where
    K: GenerationalKey,
    S: Storage<T, Generation = K::Generation>,
    F: Skipfield,
{
    storage: S,
    skipfield: F,
    len: usize,
    free_head: usize,
    growth: GrowthPolicy,
    generation: K::Generation,
    marker: PhantomData<fn() -> (T, K)>,
}

impl<T, K, S, F> SlotMap<T, K, S, F>
where
    K: GenerationalKey,
    S: Storage<T, Generation = K::Generation>,
    F: Skipfield,
{
    /// Create a slot map with `capacity` slots that never grows
    #[track_caller]
    pub fn new(capacity: usize) -> Self { Self::with_growth(capacity, GrowthPolicy::FIXED) }

    /// Create a slot map with `capacity` slots that grows according to `growth`
    ///
    /// # Panics
    ///
    /// If `K` can't address `capacity` slots
    #[track_caller]
    pub fn with_growth(capacity: usize, growth: GrowthPolicy) -> Self {
        assert!(
            capacity <= K::max_capacity(),
            "a `SlotMap` with capacity {} can't be addressed by its key type",
            capacity
        );

        let mut storage = S::with_capacity(capacity);
        let capacity = storage.len();
        for index in 0..capacity {
            storage.store_free_list(index, index + 1);
        }

        Self {
            storage,
            skipfield: F::new(capacity, true),
            len: 0,
            free_head: 0,
            growth,
            generation: Scalar::ONE,
            marker: PhantomData,
        }
    }

    /// The number of values in the map
    pub fn len(&self) -> usize { self.len }

    /// Returns true if the map holds no values
    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// The number of slots in the map
    pub fn capacity(&self) -> usize { self.storage.len() }

    /// The policy used to grow the map once it's full
    pub fn growth_policy(&self) -> GrowthPolicy { self.growth }

    /// Grow the map to at least `capacity` slots
    ///
    /// The new slots are appended to the end of the free list, so they are
    /// only handed out once every slot that was free before is taken.
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
            "a `SlotMap` can only grow, from {} to {}",
            old_capacity,
            capacity
        );

        assert!(
            capacity <= self.storage.resize_limit(K::max_capacity()),
            "a `SlotMap` with capacity {} can't be addressed by its key type",
            capacity
        );

        self.storage.resize(capacity);
        let capacity = self.storage.len();
        self.skipfield.resize(capacity, true);
        // the old end of the free list was `old_capacity`, which is now the
        // first new slot
        for index in old_capacity..capacity {
            self.storage.store_free_list(index, index + 1);
        }

        tracing::debug!(old_capacity, capacity, "resized slot map");
    }

    /// Make room for at least `additional` more values without growing on insert
    #[track_caller]
    pub fn reserve(&mut self, additional: usize) {
        let capacity = self.len.saturating_add(additional);
        if capacity > self.capacity() {
            self.resize(capacity)
        }
    }

    /// Insert a value into the map, growing it if it's full
    ///
    /// # Errors
    ///
    /// If the map is full and its growth policy doesn't enlarge it, the
    /// value is handed back in the error
    pub fn try_insert(&mut self, value: T) -> Result<K, CapacityError<T>> {
        let capacity = self.capacity();
        if self.free_head >= capacity {
            let limit = self.storage.resize_limit(K::max_capacity());
            match self.growth.next_capacity(capacity).map(|next| next.min(limit)) {
                Some(next) if next > capacity => self.resize(next),
                _ => {
                    tracing::warn!(capacity, "slot map is full and its growth policy can't enlarge it");
                    return Err(CapacityError::new(capacity, value))
                }
            }
        }

        let index = self.free_head;
        self.free_head = self.storage.free_list(index);

        let key = K::new(Scalar::from_usize(index), self.generation);
        self.generation = key.next_generation().generation();

        self.storage.store_element(index, value, key.generation());
        self.skipfield.set_not_skipped(index);
        self.len += 1;

        tracing::trace!(index, next_free = self.free_head, "took free slot");

        Ok(key)
    }

    /// Insert a value into the map, growing it if it's full
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

    /// Remove the value named by `key` and return it,
    /// or `None` if `key` doesn't name a value in this map
    #[track_caller]
    pub fn take(&mut self, key: K) -> Option<T> {
        if !self.contains(key) {
            return None
        }

        let index = key.index().to_usize();
        let value = self.storage.destroy_element(index, self.free_head);
        self.free_head = index;
        self.skipfield.set_skipped(index);
        self.len -= 1;

        tracing::trace!(index, "freed slot");

        Some(value)
    }

    /// Remove the value named by `key`, returns true if there was one
    #[track_caller]
    pub fn remove(&mut self, key: K) -> bool { self.take(key).is_some() }

    /// Returns true if `key` names a value in this map
    ///
    /// # Panics
    ///
    /// If a valid key's index is out of bounds, which can only happen with
    /// a key from another map
    #[track_caller]
    pub fn contains(&self, key: K) -> bool {
        if !key.is_valid() {
            return false
        }

        let index = key.index().to_usize();
        assert!(
            index < self.capacity(),
            "index {} is out of bounds for a `SlotMap` with capacity {}",
            index,
            self.capacity()
        );
        self.storage.generation(index) == key.generation()
    }

    /// The value named by `key`, if any
    #[track_caller]
    pub fn find(&self, key: K) -> Option<&T> {
        if self.contains(key) {
            Some(self.storage.data(key.index().to_usize()))
        } else {
            None
        }
    }

    /// The value named by `key`, if any
    #[track_caller]
    pub fn find_mut(&mut self, key: K) -> Option<&mut T> {
        if self.contains(key) {
            Some(self.storage.data_mut(key.index().to_usize()))
        } else {
            None
        }
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
            None => panic!("Tried to access `SlotMap` with a stale key {:?}", key),
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
            None => panic!("Tried to access `SlotMap` with a stale key {:?}", key),
        }
    }

    /// The key of the first value after the slot of `key`, or the invalid
    /// key if there is none
    ///
    /// Passing the invalid key starts from the first slot, so
    ///
    /// ```
    /// # use slotkit_arena::SlotMap;
    /// # use slotkit_core::GenerationalKey;
    /// let mut map = SlotMap::<_>::new(4);
    /// map.insert('a');
    /// map.insert('b');
    ///
    /// let mut key = map.next(GenerationalKey::null());
    /// while key.is_valid() {
    ///     key = map.next(key);
    /// }
    /// ```
    ///
    /// visits every value. `key` doesn't have to be live, only its index is used.
    pub fn next(&self, key: K) -> K {
        let capacity = self.capacity();
        let mut index = if key.is_valid() { key.index().to_usize() + 1 } else { 0 };

        if index < capacity {
            index += self.skipfield.num_skipped(index);
        }

        while index < capacity {
            let generation = self.storage.generation(index);
            if generation != Scalar::ZERO {
                return K::new(Scalar::from_usize(index), generation)
            }
            index += 1;
        }

        K::null()
    }

    /// Remove every value for which `f` returns false
    pub fn retain<P: FnMut(K, &mut T) -> bool>(&mut self, mut f: P) {
        let mut key = self.next(K::null());
        while key.is_valid() {
            if !f(key, self.storage.data_mut(key.index().to_usize())) {
                self.remove(key);
            }
            key = self.next(key);
        }
    }

    /// Remove every value, keeping the capacity
    pub fn clear(&mut self) {
        for index in 0..self.capacity() {
            let generation = self.storage.generation(index);
            if generation != Scalar::ZERO {
                self.remove(K::new(Scalar::from_usize(index), generation));
            }
        }
    }

    /// An iterator over the keys and values in slot order
    pub fn iter(&self) -> Iter<'_, T, K, S, F> {
        Iter {
            map: self,
            key: K::null(),
            remaining: self.len,
        }
    }

    /// An iterator over the keys in slot order
    pub fn keys(&self) -> Keys<'_, T, K, S, F> { Keys(self.iter()) }

    /// An iterator over the values in slot order
    pub fn values(&self) -> Values<'_, T, K, S, F> { Values(self.iter()) }
}

impl<T, K, S, F> Index<K> for SlotMap<T, K, S, F>
where
    K: GenerationalKey,
    S: Storage<T, Generation = K::Generation>,
    F: Skipfield,
{
    type Output = T;

    #[track_caller]
    fn index(&self, key: K) -> &Self::Output { self.get(key) }
}

impl<T, K, S, F> IndexMut<K> for SlotMap<T, K, S, F>
where
    K: GenerationalKey,
    S: Storage<T, Generation = K::Generation>,
    F: Skipfield,
{
    #[track_caller]
    fn index_mut(&mut self, key: K) -> &mut Self::Output { self.get_mut(key) }
}

impl<T: fmt::Debug, K, S, F> fmt::Debug for SlotMap<T, K, S, F>
where
    K: GenerationalKey,
    S: Storage<T, Generation = K::Generation>,
    F: Skipfield,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.debug_map().entries(self.iter()).finish() }
}

impl<'a, T, K, S, F> IntoIterator for &'a SlotMap<T, K, S, F>
where
    K: GenerationalKey,
    S: Storage<T, Generation = K::Generation>,
    F: Skipfield,
{
    type Item = (K, &'a T);
    type IntoIter = Iter<'a, T, K, S, F>;

    fn into_iter(self) -> Self::IntoIter { self.iter() }
}

/// Returned by [`SlotMap::iter`]
pub struct Iter<'a, T, K, S, F>
where
    K: GenerationalKey,
    S: Storage<T, Generation = K::Generation>,
    F: Skipfield,
{
    map: &'a SlotMap<T, K, S, F>,
    key: K,
    remaining: usize,
}

impl<'a, T, K, S, F> Iterator for Iter<'a, T, K, S, F>
where
    K: GenerationalKey,
    S: Storage<T, Generation = K::Generation>,
    F: Skipfield,
{
    type Item = (K, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None
        }

        let map = self.map;
        self.key = map.next(self.key);
        self.remaining -= 1;
        Some((self.key, map.storage.data(self.key.index().to_usize())))
    }

    fn size_hint(&self) -> (usize, Option<usize>) { (self.remaining, Some(self.remaining)) }
}

impl<T, K, S, F> ExactSizeIterator for Iter<'_, T, K, S, F>
where
    K: GenerationalKey,
    S: Storage<T, Generation = K::Generation>,
    F: Skipfield,
{
}

impl<T, K, S, F> FusedIterator for Iter<'_, T, K, S, F>
where
    K: GenerationalKey,
    S: Storage<T, Generation = K::Generation>,
    F: Skipfield,
{
}

macro_rules! project_iter {
    ($(#[$meta:meta])* $name:ident => $item:ty, |$key:pat_param, $value:pat_param| $out:expr) => {
        $(#[$meta])*
        pub struct $name<'a, T, K, S, F>(Iter<'a, T, K, S, F>)
        where
            K: GenerationalKey,
            S: Storage<T, Generation = K::Generation>,
            F: Skipfield;

        impl<'a, T, K, S, F> Iterator for $name<'a, T, K, S, F>
        where
            K: GenerationalKey,
            S: Storage<T, Generation = K::Generation>,
            F: Skipfield,
        {
            type Item = $item;

            fn next(&mut self) -> Option<Self::Item> { self.0.next().map(|($key, $value)| $out) }

            fn size_hint(&self) -> (usize, Option<usize>) { self.0.size_hint() }
        }

        impl<T, K, S, F> ExactSizeIterator for $name<'_, T, K, S, F>
        where
            K: GenerationalKey,
            S: Storage<T, Generation = K::Generation>,
            F: Skipfield,
        {
        }

        impl<T, K, S, F> FusedIterator for $name<'_, T, K, S, F>
        where
            K: GenerationalKey,
            S: Storage<T, Generation = K::Generation>,
            F: Skipfield,
        {
        }
    };
}

project_iter! {
    /// Returned by [`SlotMap::keys`]
    Keys => K, |key, _| key
}

project_iter! {
    /// Returned by [`SlotMap::values`]
    Values => &'a T, |_, value| value
}

#[cfg(test)]
mod test {
    use super::*;
    use slotkit_core::{CompositeKey, PackedKey};
    use std::vec::Vec;

    type Key = CompositeKey<u32, u32>;

    fn collect<T: Clone, S, F>(map: &SlotMap<T, Key, S, F>) -> Vec<T>
    where
        S: Storage<T, Generation = u32>,
        F: Skipfield,
    {
        map.values().cloned().collect()
    }

    #[test]
    fn generations_are_map_wide() {
        let mut map = SlotMap::<_, Key>::new(4);
        let a = map.insert('a');
        let b = map.insert('b');
        assert_eq!((a.index(), a.generation()), (0, 1));
        assert_eq!((b.index(), b.generation()), (1, 2));

        assert!(map.remove(a));
        let c = map.insert('c');
        assert_eq!((c.index(), c.generation()), (0, 3));
        assert!(!map.contains(a));
        assert_eq!(map[c], 'c');
    }

    #[test]
    fn free_list_is_lifo() {
        let mut map = SlotMap::<_, Key>::new(4);
        let keys: Vec<_> = (0..4).map(|i| map.insert(i)).collect();
        map.remove(keys[1]);
        map.remove(keys[3]);

        assert_eq!(map.insert(10).index(), 3);
        assert_eq!(map.insert(11).index(), 1);
        assert!(map.try_insert(12).is_err());
    }

    #[test]
    fn growth_appends_to_the_free_list() {
        let mut map = SlotMap::<_, Key>::with_growth(2, GrowthPolicy::linear(2));
        let a = map.insert(0);
        let _ = map.insert(1);
        map.remove(a);
        map.resize(4);

        // the slot freed before the resize comes first, then the new slots
        let indices: Vec<_> = (0..3).map(|i| map.insert(i).index()).collect();
        assert_eq!(indices, [0, 2, 3]);

        // growing from an exhausted free list
        let key = map.insert(4);
        assert_eq!(key.index(), 4);
        assert_eq!(map.capacity(), 6);
        assert_eq!(map.insert(5).index(), 5);
        assert_eq!(map.len(), 6);
        assert_eq!(map.capacity(), 6);
    }

    #[test]
    fn rejected_insert_returns_the_value() {
        let mut map = SlotMap::<_, Key>::new(1);
        map.insert(1);
        let error = map.try_insert(2).unwrap_err();
        assert_eq!(error.capacity(), 1);
        assert_eq!(error.into_inner(), 2);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn growth_is_capped_by_the_key() {
        type Small = CompositeKey<u8, u8>;
        let mut map = SlotMap::<_, Small>::with_growth(250, GrowthPolicy::linear(100));
        for i in 0..256 {
            map.insert(i);
        }
        assert_eq!(map.capacity(), 256);
        assert!(map.try_insert(256).is_err());
    }

    #[test]
    fn next_walks_the_live_slots() {
        fn walk<F: Skipfield>() {
            let mut map = SlotMap::<_, Key, GrowableStorage<_, Key>, F>::new(8);
            let keys: Vec<_> = (0..8).map(|i| map.insert(i)).collect();
            for &i in &[0, 2, 3, 4, 7] {
                map.remove(keys[i]);
            }

            let mut visited = Vec::new();
            let mut key = map.next(Key::null());
            while key.is_valid() {
                visited.push(map[key]);
                key = map.next(key);
            }
            assert_eq!(visited, [1, 5, 6]);
            assert_eq!(collect(&map), [1, 5, 6]);
        }

        walk::<NullSkipfield>();
        walk::<IntSkipfield>();
        walk::<crate::skipfield::BoolSkipfield>();
    }

    #[test]
    fn retain_and_clear() {
        let mut map = HopSlotMap::<_, Key>::new(8);
        for i in 0..8 {
            map.insert(i);
        }
        map.retain(|_, value| {
            *value *= 10;
            *value % 20 == 0
        });
        assert_eq!(collect(&map), [0, 20, 40, 60]);
        assert_eq!(map.len(), 4);

        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.iter().count(), 0);
        assert_eq!(map.capacity(), 8);
    }

    #[test]
    fn packed_keys() {
        let mut map = SlotMap::<_, PackedKey<u32, 8>>::new(4);
        let a = map.insert("a");
        map.remove(a);
        let b = map.insert("b");
        assert_eq!(a.index(), b.index());
        assert_ne!(a, b);
        assert_eq!(map.find(a), None);
        assert_eq!(map.find(b), Some(&"b"));
    }

    #[test]
    fn invalid_key_is_never_contained() {
        let map = SlotMap::<u8, Key>::new(0);
        assert!(!map.contains(Key::null()));
        assert_eq!(map.next(Key::null()), Key::null());
    }

    #[test]
    #[should_panic(expected = "stale key")]
    fn stale_get() {
        let mut map = SlotMap::<_, Key>::new(2);
        let key = map.insert(0);
        map.remove(key);
        map.get(key);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn foreign_key() {
        let map = SlotMap::<u8, Key>::new(2);
        map.contains(Key::new(5, 1));
    }

    #[test]
    fn reserve_grows_only_when_needed() {
        let mut map = SlotMap::<_, Key>::new(4);
        let a = map.insert(0);
        map.reserve(3);
        assert_eq!(map.capacity(), 4);

        map.remove(a);
        assert_eq!(map.insert(1).index(), 0);
        map.reserve(5);
        assert_eq!(map.capacity(), 6);

        // the slots that were free before come first, then the new ones
        let indices: Vec<_> = (2..7).map(|i| map.insert(i).index()).collect();
        assert_eq!(indices, [1, 2, 3, 4, 5]);
        assert_eq!(map.capacity(), 6);
        assert!(map.try_insert(7).is_err());
    }

    #[test]
    fn paged_growth_is_capped_by_whole_pages() {
        type Small = CompositeKey<u8, u8>;
        let mut map = PagedSlotMap::<u32, Small>::with_growth(100, GrowthPolicy::linear(100));
        for i in 0..200 {
            map.insert(i);
        }
        assert_eq!(map.capacity(), 200);

        // a third page would need indices past what `Small` can address
        let error = map.try_insert(200).unwrap_err();
        assert_eq!(error.capacity(), 200);
        assert_eq!(error.into_inner(), 200);
        assert_eq!(map.capacity(), 200);
        assert_eq!(map.len(), 200);
        assert_eq!(map.values().count(), 200);
    }

    #[test]
    #[should_panic(expected = "can't be addressed")]
    fn paged_resize_past_the_key() {
        let mut map = PagedSlotMap::<u32, CompositeKey<u8, u8>>::new(100);
        map.resize(201);
    }
}
