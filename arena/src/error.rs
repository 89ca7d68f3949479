use core::fmt;

/// Returned by `try_insert` when a container is full and its
/// [`GrowthPolicy`](slotkit_core::GrowthPolicy) can't enlarge it
///
/// The rejected value is handed back, see [`CapacityError::into_inner`]
#[derive(thiserror::Error)]
#[error("container is full at capacity {capacity} and its growth policy cannot enlarge it")]
pub struct CapacityError<T> {
    capacity: usize,
    value: T,
}

impl<T> CapacityError<T> {
    pub(crate) fn new(capacity: usize, value: T) -> Self { Self { capacity, value } }

    /// The capacity of the container that rejected the value
    pub fn capacity(&self) -> usize { self.capacity }

    /// Recover the value that couldn't be inserted
    pub fn into_inner(self) -> T { self.value }
}

impl<T> fmt::Debug for CapacityError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapacityError")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
