#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Generational slot maps and the pieces they're built from
//!
//! * [`core`] - keys and growth policies
//! * `arena` - the sparse and dense slot maps
//! * `vec` - an index addressed vector of optional slots

#[cfg(feature = "arena")]
#[cfg_attr(docsrs, doc(cfg(feature = "arena")))]
pub use slotkit_arena as arena;
pub use slotkit_core as core;
#[cfg(feature = "vec")]
#[cfg_attr(docsrs, doc(cfg(feature = "vec")))]
pub use slotkit_vec as vec;

#[cfg(feature = "arena")]
pub use slotkit_arena::{DenseSlotMap, SlotMap};
pub use slotkit_core::{DefaultKey, GenerationalKey, GrowthPolicy};
#[cfg(feature = "vec")]
pub use slotkit_vec::SparseVector;
