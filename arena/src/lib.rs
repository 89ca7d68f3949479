#![no_std]
#![warn(missing_docs)]
#![deny(clippy::missing_safety_doc)]

//! Generational slot maps that can be used on `no_std`
//!
//! A slot map stores values and hands out a [`GenerationalKey`] for each
//! one. Looking a value up by key is `O(1)`, and a key stays tied to the
//! value it was created for: once that value is removed the key is rejected,
//! even after its slot has been reused.
//!
//! * [`SlotMap`] keeps each value in its own slot. It's generic over the
//!   [`Storage`] backend and the [`Skipfield`] used while iterating.
//! * [`DenseSlotMap`] keeps all values packed in one `Vec`, so iterating is
//!   as fast as iterating a slice, at the cost of one extra indirection on
//!   lookup.
//!
//! Both maps start with a fixed capacity and grow according to their
//! [`GrowthPolicy`]. With the default [`GrowthPolicy::FIXED`] a full map
//! rejects new values.
//!
//! ```
//! use slotkit_arena::{GrowthPolicy, SlotMap};
//!
//! let mut map = SlotMap::<_>::with_growth(4, GrowthPolicy::linear(2));
//! let foo = map.insert("foo");
//! let bar = map.insert("bar");
//!
//! map.remove(foo);
//! let zap = map.insert("zap");
//!
//! assert_eq!(map.find(foo), None);
//! assert_eq!(map[zap], "zap");
//! assert_eq!(map.values().count(), 2);
//! # let _ = bar;
//! ```

#[doc(hidden)]
pub extern crate alloc as std;

pub mod dense;
mod error;
pub mod skipfield;
pub mod slot_map;
pub mod storage;

pub use dense::DenseSlotMap;
pub use error::CapacityError;
pub use skipfield::{BoolSkipfield, IntSkipfield, NullSkipfield, Skipfield};
pub use slot_map::{HopSlotMap, PagedSlotMap, SlotMap};
pub use storage::{GrowableStorage, PagedStorage, Storage};

pub use slotkit_core::{CompositeKey, DefaultKey, GenerationalKey, GrowthPolicy, PackedKey};
