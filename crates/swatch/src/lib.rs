//! # Swatch - typed component style recipes
//!
//! Swatch models the styles of UI components as **recipes**: a base style,
//! enumerated variant axes (`size`, `variant`, `wcagLevel`, ...), compound
//! variants that apply when several axes line up, and defaults. Given a
//! recipe and a partial selection, the resolver produces the merged style
//! declaration for that combination.
//!
//! ## Core concepts
//!
//! - [`Recipe`]: a validated recipe. Construction checks that every default,
//!   compound constraint and slot reference names something declared
//! - [`Selection`]: the chosen value per axis; missing axes take defaults
//! - [`ResolvedStyle`]: the merged styles, flat or per slot
//! - [`RecipeRegistry`]: built-in, inline and directory-loaded recipes
//! - [`Tokens`]: the design tokens recipes refer to, with light and dark
//!   values for semantic colors
//!
//! ## Quick start
//!
//! ```rust
//! use swatch::{ColorMode, RecipeRegistry, Selection, Tokens, WcagLevel};
//!
//! let registry = RecipeRegistry::builtin().unwrap();
//! let button = registry.get("button").unwrap();
//!
//! let resolved = button
//!     .resolve(&Selection::new().with("variant", "primary").wcag(WcagLevel::A))
//!     .unwrap();
//! let styles = resolved.flat().unwrap();
//!
//! assert_eq!(styles.text(&["backgroundColor"]), Some("blue.400"));
//! assert_eq!(styles.text(&["_hover", "_disabled", "backgroundColor"]), Some("gray.300"));
//!
//! // Substitute token values for a concrete color mode
//! let tokens = Tokens::builtin().unwrap();
//! let css = tokens.expand_style(styles, ColorMode::Light);
//! assert_eq!(css.text(&["backgroundColor"]), Some("#60a5fa"));
//! ```
//!
//! ## Precedence
//!
//! Resolution merges the base style, then one fragment per axis in declared
//! axis order, then every matching compound variant. Later layers replace
//! scalar properties and merge into condition blocks such as `_disabled`.
//! See [`recipe`] for the recipe file format.

pub mod config;
pub mod recipe;
pub mod registry;
pub mod style;
pub mod theme;

pub use config::{ConfigError, ProjectConfig, CONFIG_FILE_NAME};
pub use recipe::{
    CompoundVariant, Fragment, Recipe, RecipeDef, RecipeError, ResolvedStyle, Selection,
    VariantAxis, WcagLevel, WCAG_AXIS,
};
pub use registry::{walk_recipe_dir, LoadError, RecipeFile, RecipeRegistry, RecipeSource};
pub use style::{StyleMap, StyleValue};
pub use theme::{set_theme_detector, ColorMode, TokenError, TokenValue, Tokens};
