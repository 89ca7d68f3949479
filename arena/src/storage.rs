//! Raw cell storage for the sparse [`SlotMap`](crate::SlotMap)
//!
//! Every slot owns one cell and one generation. A cell is either *occupied*,
//! holding a live value, or *free*, holding the index of the next free slot.
//! The generation doubles as the discriminant: it is `0` exactly when the
//! cell is free. All accessors check the role before touching a cell, so
//! misuse panics instead of reading the wrong role.
//!
//! * [`GrowableStorage`] keeps all cells in one buffer, growing moves them
//! * [`PagedStorage`] keeps cells in fixed size pages, growing never moves them

use core::mem::ManuallyDrop;

use slotkit_core::Scalar;

/// A backend that owns the cells of a sparse slot map
pub trait Storage<T> {
    /// The integer the per slot generation is stored in
    type Generation: Scalar;

    /// Create a backend with at least `capacity` slots, all free
    ///
    /// The free list links of the new slots are unspecified until set with
    /// [`store_free_list`](Storage::store_free_list).
    fn with_capacity(capacity: usize) -> Self;

    /// The number of slots
    fn len(&self) -> usize;

    /// Returns true if there are no slots
    fn is_empty(&self) -> bool { self.len() == 0 }

    /// Grow to at least `len` slots, new slots are free
    ///
    /// A backend may round up, so read [`len`](Storage::len) afterwards.
    fn resize(&mut self, len: usize);

    /// The largest number of slots [`resize`](Storage::resize) can leave
    /// without going past `limit`
    fn resize_limit(&self, limit: usize) -> usize;

    /// Set the free list link of the free slot at `index`
    fn store_free_list(&mut self, index: usize, next: usize);

    /// Move `value` into the free slot at `index`, tagging it with `generation`
    ///
    /// # Panics
    ///
    /// If the slot is occupied, or `generation` is `0`
    fn store_element(&mut self, index: usize, value: T, generation: Self::Generation);

    /// Move the value out of the occupied slot at `index`, and turn the slot
    /// into a free slot linking to `next`
    ///
    /// # Panics
    ///
    /// If the slot is free
    fn destroy_element(&mut self, index: usize, next: usize) -> T;

    /// The value in the occupied slot at `index`
    fn data(&self, index: usize) -> &T;

    /// The value in the occupied slot at `index`
    fn data_mut(&mut self, index: usize) -> &mut T;

    /// The free list link of the free slot at `index`
    fn free_list(&self, index: usize) -> usize;

    /// The generation of the slot at `index`, `0` if it's free
    fn generation(&self, index: usize) -> Self::Generation;

    /// Re-tag the occupied slot at `index` with a new, nonzero, generation
    fn set_generation(&mut self, index: usize, generation: Self::Generation);
}

union Cell<T> {
    value: ManuallyDrop<T>,
    next: usize,
}

impl<T> Cell<T> {
    fn free(next: usize) -> Self { Self { next } }
}

/// Implements [`Storage`] in terms of `self.cell(index)`, `self.cell_mut(index)`
/// and a `generations: Vec<K::Generation>` field, along with the `Drop` that
/// destroys every occupied cell
macro_rules! imp_storage {
    ($name:ident) => {
        impl<T, K: GenerationalKey> crate::storage::Storage<T> for $name<T, K> {
            type Generation = K::Generation;

            fn with_capacity(capacity: usize) -> Self { Self::allocate(capacity) }

            fn len(&self) -> usize { self.generations.len() }

            fn resize(&mut self, len: usize) { self.grow(len) }

            fn resize_limit(&self, limit: usize) -> usize { self.limit(limit) }

            #[track_caller]
            fn store_free_list(&mut self, index: usize, next: usize) {
                assert!(
                    self.generations[index] == Scalar::ZERO,
                    "tried to link the occupied slot {} into the free list",
                    index
                );
                *self.cell_mut(index) = crate::storage::Cell::free(next);
            }

            #[track_caller]
            fn store_element(&mut self, index: usize, value: T, generation: K::Generation) {
                assert!(generation != Scalar::ZERO, "occupied slots need a nonzero generation");
                assert!(
                    self.generations[index] == Scalar::ZERO,
                    "tried to store into the occupied slot {}",
                    index
                );
                self.cell_mut(index).value = core::mem::ManuallyDrop::new(value);
                self.generations[index] = generation;
            }

            #[track_caller]
            fn destroy_element(&mut self, index: usize, next: usize) -> T {
                assert!(
                    self.generations[index] != Scalar::ZERO,
                    "tried to destroy the free slot {}",
                    index
                );
                self.generations[index] = Scalar::ZERO;
                let cell = self.cell_mut(index);
                // the slot was occupied, and it's been marked free above so
                // the value can't be read again
                let value = unsafe { core::mem::ManuallyDrop::take(&mut cell.value) };
                *cell = crate::storage::Cell::free(next);
                value
            }

            #[track_caller]
            fn data(&self, index: usize) -> &T {
                assert!(
                    self.generations[index] != Scalar::ZERO,
                    "tried to read a value from the free slot {}",
                    index
                );
                unsafe { &*self.cell(index).value }
            }

            #[track_caller]
            fn data_mut(&mut self, index: usize) -> &mut T {
                assert!(
                    self.generations[index] != Scalar::ZERO,
                    "tried to read a value from the free slot {}",
                    index
                );
                unsafe { &mut *self.cell_mut(index).value }
            }

            #[track_caller]
            fn free_list(&self, index: usize) -> usize {
                assert!(
                    self.generations[index] == Scalar::ZERO,
                    "tried to read a free list link from the occupied slot {}",
                    index
                );
                unsafe { self.cell(index).next }
            }

            #[inline]
            fn generation(&self, index: usize) -> K::Generation { self.generations[index] }

            #[track_caller]
            fn set_generation(&mut self, index: usize, generation: K::Generation) {
                assert!(generation != Scalar::ZERO, "occupied slots need a nonzero generation");
                assert!(
                    self.generations[index] != Scalar::ZERO,
                    "tried to re-tag the free slot {}",
                    index
                );
                self.generations[index] = generation;
            }
        }

        impl<T, K: GenerationalKey> Drop for $name<T, K> {
            fn drop(&mut self) {
                for index in 0..self.generations.len() {
                    if self.generations[index] != Scalar::ZERO {
                        unsafe { core::mem::ManuallyDrop::drop(&mut self.cell_mut(index).value) }
                    }
                }
            }
        }

        impl<T, K: GenerationalKey> core::fmt::Debug for $name<T, K> {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("len", &self.generations.len())
                    .finish_non_exhaustive()
            }
        }
    };
}

mod growable;
mod paged;

pub use growable::GrowableStorage;
pub use paged::PagedStorage;

#[cfg(test)]
mod test {
    use super::*;
    use slotkit_core::CompositeKey;
    use std::rc::Rc;

    fn lifecycle<S: Storage<Rc<()>, Generation = u32>>() {
        let tracker = Rc::new(());
        let mut storage = S::with_capacity(4);
        assert!(storage.len() >= 4);
        for index in 0..storage.len() {
            storage.store_free_list(index, index + 1);
            assert_eq!(storage.generation(index), 0);
        }

        storage.store_element(2, tracker.clone(), 7);
        storage.store_element(3, tracker.clone(), 1);
        assert_eq!(storage.generation(2), 7);
        assert_eq!(storage.free_list(1), 2);
        assert_eq!(Rc::strong_count(&tracker), 3);

        storage.set_generation(2, 9);
        assert_eq!(storage.generation(2), 9);

        let value = storage.destroy_element(2, 0);
        assert_eq!(storage.generation(2), 0);
        assert_eq!(storage.free_list(2), 0);
        drop(value);
        assert_eq!(Rc::strong_count(&tracker), 2);

        let len = storage.len();
        assert!(storage.resize_limit(len + 1) <= len + 1);
        storage.resize(len + 1);
        assert!(storage.len() > len);
        assert!(Rc::ptr_eq(storage.data(3), &tracker));
        assert_eq!(storage.generation(storage.len() - 1), 0);

        drop(storage);
        assert_eq!(Rc::strong_count(&tracker), 1);
    }

    #[test]
    fn growable_lifecycle() { lifecycle::<GrowableStorage<Rc<()>, CompositeKey>>() }

    #[test]
    fn paged_lifecycle() { lifecycle::<PagedStorage<Rc<()>, CompositeKey>>() }

    #[test]
    #[should_panic(expected = "free slot")]
    fn read_free_slot() {
        let storage = GrowableStorage::<u8, CompositeKey>::with_capacity(2);
        storage.data(1);
    }

    #[test]
    #[should_panic(expected = "occupied slot")]
    fn store_twice() {
        let mut storage = PagedStorage::<u8, CompositeKey>::with_capacity(2);
        storage.store_element(0, 1, 1);
        storage.store_element(0, 2, 1);
    }
}
