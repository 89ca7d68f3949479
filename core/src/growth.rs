//! Growth policies, see [`GrowthPolicy`] for details

/// How a container enlarges itself once every slot is in use
///
/// The next capacity is `floor(capacity * factor) + constant`. A policy that
/// would not make the container strictly larger (such as [`FIXED`], the
/// default) means the container never grows, and running out of slots is
/// an error.
///
/// [`FIXED`]: GrowthPolicy::FIXED
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthPolicy {
    /// Slots added after scaling
    pub constant: usize,
    /// Multiplier applied to the current capacity
    pub factor: f32,
}

impl Default for GrowthPolicy {
    fn default() -> Self { Self::FIXED }
}

impl GrowthPolicy {
    /// Never grow
    pub const FIXED: Self = Self::new(0, 1.0);

    /// Create a new growth policy
    pub const fn new(constant: usize, factor: f32) -> Self { Self { constant, factor } }

    /// Grow by a constant number of slots
    pub const fn linear(constant: usize) -> Self { Self::new(constant, 1.0) }

    /// Grow by scaling the capacity
    pub const fn geometric(factor: f32) -> Self { Self::new(0, factor) }

    /// The capacity to grow to from `capacity`, or `None` if this
    /// policy doesn't enlarge a container of that size
    pub fn next_capacity(&self, capacity: usize) -> Option<usize> {
        // float to int casts saturate, and map NaN and negatives to 0
        let scaled = (capacity as f64 * f64::from(self.factor)) as usize;
        let next = scaled.saturating_add(self.constant);
        if next > capacity {
            Some(next)
        } else {
            None
        }
    }
}
