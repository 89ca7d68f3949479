//! Generational keys, see [`GenerationalKey`] for details

use core::{fmt, hash::Hash};

use crate::scalar::{low_bits, Scalar};

/// A handle made of a slot index and a generation
///
/// The generation `0` is reserved: a key whose generation is `0` is the
/// invalid "no key" sentinel, and it is what [`Default`] produces. Containers
/// hand out generations starting at `1`, and advancing a generation past the
/// largest representable value wraps straight back to `1`.
///
/// Two keys are equal if and only if both their index and their generation
/// are equal.
pub trait GenerationalKey: Copy + Eq + Ord + Hash + Default + fmt::Debug {
    /// The integer the index is stored in
    type Index: Scalar;
    /// The integer the generation is stored in
    type Generation: Scalar;

    /// Create a new key, truncating both parts to the representable width
    fn new(index: Self::Index, generation: Self::Generation) -> Self;

    /// The slot index of this key
    fn index(&self) -> Self::Index;

    /// The generation of this key
    fn generation(&self) -> Self::Generation;

    /// The invalid key, with index `0` and generation `0`
    #[inline]
    fn null() -> Self { Self::new(Scalar::ZERO, Scalar::ZERO) }

    /// The key with every index and generation bit set
    ///
    /// [`Ord`] also has a `max`, so call this as `<K as GenerationalKey>::max()`.
    #[inline]
    fn max() -> Self { Self::new(Scalar::MAX, Scalar::MAX) }

    /// Returns true if this is not the invalid sentinel
    #[inline]
    fn is_valid(&self) -> bool { self.generation() != Scalar::ZERO }

    /// The same index with the generation advanced by one
    ///
    /// Wraps from the largest generation directly to `1`, since `0` is
    /// reserved for unoccupied slots.
    fn next_generation(&self) -> Self {
        let next = self.generation().wrapping_inc();
        let next = if next == Scalar::ZERO || next > <Self as GenerationalKey>::max().generation() {
            Scalar::ONE
        } else {
            next
        };
        Self::new(self.index(), next)
    }

    /// The largest number of slots that this key type can address
    #[inline]
    fn max_capacity() -> usize { <Self as GenerationalKey>::max().index().to_usize().saturating_add(1) }
}

/// A key stored as two separate integers
///
/// This is the simplest encoding and the fastest in practice.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompositeKey<I = u32, G = u32> {
    index: I,
    generation: G,
}

impl<I: Scalar, G: Scalar> GenerationalKey for CompositeKey<I, G> {
    type Index = I;
    type Generation = G;

    #[inline]
    fn new(index: I, generation: G) -> Self { Self { index, generation } }

    #[inline]
    fn index(&self) -> I { self.index }

    #[inline]
    fn generation(&self) -> G { self.generation }
}

/// A key packed into a single integer of type `B`
///
/// The generation lives in the top `GENERATION_BITS` bits, the index in
/// the remaining low bits. Bits that don't fit are discarded on construction,
/// which is what makes the generation wrap.
#[derive(Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackedKey<B = u64, const GENERATION_BITS: u32 = 32> {
    raw: B,
}

impl<B: Scalar, const GENERATION_BITS: u32> PackedKey<B, GENERATION_BITS> {
    const INDEX_BITS: u32 = B::BITS - GENERATION_BITS;

    /// Reinterpret a raw integer as a key
    pub const fn from_raw(raw: B) -> Self { Self { raw } }

    /// The raw integer backing this key
    pub const fn to_raw(self) -> B { self.raw }
}

impl<B: Scalar, const GENERATION_BITS: u32> GenerationalKey for PackedKey<B, GENERATION_BITS> {
    type Index = B;
    type Generation = B;

    fn new(index: B, generation: B) -> Self {
        debug_assert!(
            GENERATION_BITS > 0 && GENERATION_BITS < B::BITS,
            "a packed key needs room for both an index and a generation"
        );

        let index = index.to_u64() & low_bits(Self::INDEX_BITS);
        let generation = generation.to_u64() << Self::INDEX_BITS;
        Self {
            raw: B::from_u64(generation | index),
        }
    }

    #[inline]
    fn index(&self) -> B { B::from_u64(self.raw.to_u64() & low_bits(Self::INDEX_BITS)) }

    #[inline]
    fn generation(&self) -> B { B::from_u64(self.raw.to_u64() >> Self::INDEX_BITS) }
}

impl<B: Scalar, const GENERATION_BITS: u32> fmt::Debug for PackedKey<B, GENERATION_BITS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackedKey")
            .field("index", &self.index())
            .field("generation", &self.generation())
            .finish()
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "packed-keys")] {
        /// The key used by containers when no key type is given
        pub type DefaultKey = PackedKey;
    } else {
        /// The key used by containers when no key type is given
        pub type DefaultKey = CompositeKey;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn contract<K: GenerationalKey<Index = u8, Generation = u8>>() {
        assert!(!K::default().is_valid());
        assert_eq!(K::null(), K::default());
        assert!(K::new(42, 69).is_valid());
        assert_eq!(K::new(42, 69).index(), 42);
        assert_eq!(K::new(42, 69).generation(), 69);
        assert_eq!(K::new(42, 69), K::new(42, 69));
        assert_ne!(K::new(42, 69), K::new(1, 69));
        assert_ne!(K::new(42, 69), K::new(42, 1));
        assert_eq!(<K as GenerationalKey>::max(), K::new(255, 255));
        assert_eq!(K::new(42, 69).next_generation(), K::new(42, 70));
        assert_eq!(K::new(42, 255).next_generation(), K::new(42, 1));
        assert_eq!(K::max_capacity(), 256);
    }

    #[test]
    fn composite() { contract::<CompositeKey<u8, u8>>() }

    #[test]
    fn packed_u16() {
        type Key = PackedKey<u16, 8>;

        assert_eq!(<Key as GenerationalKey>::max(), Key::new(255, 255));
        assert_eq!(Key::new(42, 69).to_raw(), (69 << 8) | 42);
        assert_eq!(Key::new(42, 255).next_generation(), Key::new(42, 1));
        assert_eq!(Key::new(300, 1).index(), 300 & 0xff);
        assert_eq!(Key::max_capacity(), 256);
        assert!(!Key::default().is_valid());
    }

    #[test]
    fn packed_default_width() {
        let key = PackedKey::<u64, 32>::new(7, 3);
        assert_eq!(key.index(), 7);
        assert_eq!(key.generation(), 3);
        assert_eq!(PackedKey::<u64, 32>::from_raw(key.to_raw()), key);

        let last = PackedKey::<u64, 32>::new(7, u64::from(u32::MAX));
        assert_eq!(last.next_generation().generation(), 1);
    }
}
