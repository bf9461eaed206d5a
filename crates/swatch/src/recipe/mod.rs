//! Style recipes and variant resolution.
//!
//! A recipe is a named style definition for one UI component. It has a base
//! style, a set of variant axes (each an enumeration of values with a style
//! fragment per value), compound variants that apply only when several axes
//! take particular values together, and default values for some axes.
//!
//! Recipes arrive as [`RecipeDef`]s, usually parsed from YAML, and become
//! [`Recipe`]s once validated:
//!
//! ```rust
//! use swatch::{Recipe, RecipeDef, Selection};
//!
//! let def: RecipeDef = serde_yaml::from_str(r#"
//! className: tag
//! base: { borderRadius: full }
//! variants:
//!   size:
//!     sm: { fontSize: xs }
//!     md: { fontSize: sm }
//!   tone:
//!     neutral: { backgroundColor: gray.100 }
//!     danger: { backgroundColor: red.50 }
//! compoundVariants:
//!   - { size: sm, tone: danger, css: { fontWeight: semibold } }
//! defaultVariants: { size: md, tone: neutral }
//! "#).unwrap();
//!
//! let tag = Recipe::from_def(def).unwrap();
//! let resolved = tag
//!     .resolve(&Selection::new().with("size", "sm").with("tone", "danger"))
//!     .unwrap();
//! let styles = resolved.flat().unwrap();
//!
//! assert_eq!(styles.text(&["backgroundColor"]), Some("red.50"));
//! assert_eq!(styles.text(&["fontWeight"]), Some("semibold"));
//! ```
//!
//! ## Slotted recipes
//!
//! A recipe that declares `slots` styles several named sub-elements of one
//! component. Every style map in it is keyed by slot name, and resolution
//! produces one merged map per slot. [`Recipe::slot_view`] narrows a slotted
//! recipe to a single slot.

mod def;
mod error;
mod model;
mod resolve;
mod selection;

pub use def::{CompoundDef, ConditionDef, OrderedMap, RecipeDef, VariantKey};
pub use error::RecipeError;
pub use model::{CompoundVariant, Fragment, Recipe, VariantAxis};
pub use resolve::ResolvedStyle;
pub use selection::{ParseWcagLevelError, Selection, WcagLevel, WCAG_AXIS};
