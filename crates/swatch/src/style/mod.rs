//! Style values and fragment merging.
//!
//! This module provides the primitives every recipe is built from:
//!
//! - [`StyleValue`]: a single property value, either a scalar or a nested block
//! - [`StyleMap`]: a property map, with condition blocks (`_hover`, `_disabled`,
//!   `&[open]`, ...) represented as nested maps
//!
//! Fragments combine with [`StyleMap::merge`], which replaces scalars but
//! merges nested blocks key by key. That is what lets a compound variant add
//! to a `_disabled` block declared in the base style without wiping it.

mod map;
mod value;

pub use map::StyleMap;
pub use value::StyleValue;
