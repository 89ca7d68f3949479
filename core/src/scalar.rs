//! [`Scalar`] defines the unsigned integers that can back the index and
//! generation halves of a [`GenerationalKey`](crate::key::GenerationalKey)
//!
//! All conversions truncate: a value that doesn't fit in the target type
//! keeps only its low bits, the same way an `as` cast does.

use core::{fmt, hash::Hash};

/// Unsigned primitive integers usable as key components
///
/// This trait is sealed, it is implemented for `u8`, `u16`, `u32`, `u64`
/// and `usize`.
pub trait Scalar: crate::Seal + Copy + Ord + Hash + Default + fmt::Debug + fmt::Display {
    /// `0`
    const ZERO: Self;
    /// `1`
    const ONE: Self;
    /// The largest representable value
    const MAX: Self;
    /// The width of this type in bits
    const BITS: u32;

    /// Convert from a `u64`, keeping only the low [`BITS`](Scalar::BITS) bits
    fn from_u64(value: u64) -> Self;

    /// Widen to a `u64`
    fn to_u64(self) -> u64;

    /// Convert from a `usize`, keeping only the low [`BITS`](Scalar::BITS) bits
    #[inline]
    fn from_usize(value: usize) -> Self { Self::from_u64(value as u64) }

    /// Convert to a `usize`
    fn to_usize(self) -> usize;

    /// `self + 1`, wrapping to `0` on overflow
    fn wrapping_inc(self) -> Self;
}

macro_rules! prim {
    ($($prim:ty,)*) => {$(
        impl crate::Seal for $prim {}
        impl Scalar for $prim {
            const ZERO: Self = 0;
            const ONE: Self = 1;
            const MAX: Self = <$prim>::MAX;
            const BITS: u32 = <$prim>::BITS;

            #[inline]
            fn from_u64(value: u64) -> Self { value as $prim }

            #[inline]
            fn to_u64(self) -> u64 { self as u64 }

            #[inline]
            fn to_usize(self) -> usize { self as usize }

            #[inline]
            fn wrapping_inc(self) -> Self { self.wrapping_add(1) }
        }
    )*};
}

prim! {
    u8,
    u16,
    u32,
    u64,
    usize,
}

/// A mask with the low `bits` bits set
#[inline]
pub(crate) const fn low_bits(bits: u32) -> u64 {
    if bits >= u64::BITS {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}
