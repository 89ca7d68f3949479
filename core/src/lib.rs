#![no_std]
#![warn(missing_docs)]

//! Generational keys and the shared configuration for the `slotkit` containers
//!
//! A [`GenerationalKey`] pairs a slot index with a generation counter, so a
//! container can tell a live handle apart from one that refers to a slot
//! that has since been emptied or reused.
//!
//! # Features
//!
//! `packed-keys` - make [`DefaultKey`] a [`PackedKey`] (one integer) instead
//! of a [`CompositeKey`] (two integers)

pub mod growth;
pub mod key;
pub mod scalar;

pub use growth::GrowthPolicy;
pub use key::{CompositeKey, DefaultKey, GenerationalKey, PackedKey};
pub use scalar::Scalar;

pub(crate) use seal::Seal;
mod seal {
    pub trait Seal {}
}
