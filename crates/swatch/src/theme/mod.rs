//! Design tokens and color modes.
//!
//! Recipes name colors, font sizes and radii by token (`blue.400`,
//! `contents.primary`) rather than by literal value. This module provides:
//!
//! - [`Tokens`]: the token set, loaded from YAML, with reference validation
//!   and style expansion
//! - [`ColorMode`]: light or dark, picking between a semantic token's
//!   `base` and `_dark` values, detected from the OS by default

mod adaptive;
mod error;
mod tokens;

pub use adaptive::{set_theme_detector, ColorMode};
pub use error::TokenError;
pub use tokens::{TokenValue, Tokens};
