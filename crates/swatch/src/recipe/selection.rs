//! Variant selections.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use super::error::RecipeError;

/// Name of the accessibility axis used by the built-in recipes.
pub const WCAG_AXIS: &str = "wcagLevel";

/// A WCAG conformance tier, used as a variant axis controlling focus and
/// contrast treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WcagLevel {
    A,
    AA,
    AAA,
}

impl WcagLevel {
    pub const ALL: [WcagLevel; 3] = [WcagLevel::A, WcagLevel::AA, WcagLevel::AAA];

    pub fn as_str(self) -> &'static str {
        match self {
            WcagLevel::A => "A",
            WcagLevel::AA => "AA",
            WcagLevel::AAA => "AAA",
        }
    }
}

impl std::fmt::Display for WcagLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`WcagLevel`] fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown WCAG level '{0}': expected A, AA or AAA")]
pub struct ParseWcagLevelError(String);

impl FromStr for WcagLevel {
    type Err = ParseWcagLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(WcagLevel::A),
            "AA" => Ok(WcagLevel::AA),
            "AAA" => Ok(WcagLevel::AAA),
            _ => Err(ParseWcagLevelError(s.to_string())),
        }
    }
}

/// A partial mapping from axis name to chosen value.
///
/// Axes left out take the recipe's default. A selection is checked against
/// a recipe only when it is resolved.
///
/// # Example
///
/// ```rust
/// use swatch::{Selection, WcagLevel};
///
/// let selection = Selection::new()
///     .with("variant", "primary")
///     .wcag(WcagLevel::AAA);
///
/// assert_eq!(selection.get("wcagLevel"), Some("AAA"));
/// assert_eq!(selection.get("size"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection(BTreeMap<String, String>);

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an axis value, returning the updated selection for chaining.
    pub fn with(mut self, axis: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(axis.into(), value.into());
        self
    }

    /// Sets the `wcagLevel` axis.
    pub fn wcag(self, level: WcagLevel) -> Self {
        self.with(WCAG_AXIS, level.as_str())
    }

    pub fn set(&mut self, axis: impl Into<String>, value: impl Into<String>) {
        self.0.insert(axis.into(), value.into());
    }

    pub fn get(&self, axis: &str) -> Option<&str> {
        self.0.get(axis).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parses `axis=value` pairs, as given on a command line.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::MalformedSelection`] for entries without `=`
    /// or with an empty axis or value.
    pub fn parse_pairs<I, S>(pairs: I) -> Result<Self, RecipeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selection = Selection::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let malformed = || RecipeError::MalformedSelection {
                input: pair.to_string(),
            };
            let (axis, value) = pair.split_once('=').ok_or_else(malformed)?;
            let (axis, value) = (axis.trim(), value.trim());
            if axis.is_empty() || value.is_empty() {
                return Err(malformed());
            }
            selection.set(axis, value);
        }
        Ok(selection)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Selection {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wcag_level_parse() {
        assert_eq!("A".parse::<WcagLevel>().unwrap(), WcagLevel::A);
        assert_eq!("aa".parse::<WcagLevel>().unwrap(), WcagLevel::AA);
        assert_eq!(" AAA ".parse::<WcagLevel>().unwrap(), WcagLevel::AAA);
        assert!("AAAA".parse::<WcagLevel>().is_err());
    }

    #[test]
    fn test_wcag_level_display_round_trips_as_axis_value() {
        for level in WcagLevel::ALL {
            let selection = Selection::new().wcag(level);
            assert_eq!(selection.get(WCAG_AXIS), Some(level.to_string().as_str()));
        }
    }

    #[test]
    fn test_with_overwrites() {
        let selection = Selection::new().with("size", "sm").with("size", "lg");
        assert_eq!(selection.get("size"), Some("lg"));
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_parse_pairs() {
        let selection = Selection::parse_pairs(["variant=primary", " size = lg "]).unwrap();
        assert_eq!(selection.get("variant"), Some("primary"));
        assert_eq!(selection.get("size"), Some("lg"));
    }

    #[test]
    fn test_parse_pairs_keeps_equals_in_value() {
        let selection = Selection::parse_pairs(["label=a=b"]).unwrap();
        assert_eq!(selection.get("label"), Some("a=b"));
    }

    #[test]
    fn test_parse_pairs_rejects_malformed() {
        for input in ["variant", "=primary", "variant="] {
            let err = Selection::parse_pairs([input]).unwrap_err();
            assert_eq!(
                err,
                RecipeError::MalformedSelection {
                    input: input.to_string()
                }
            );
        }
    }

    #[test]
    fn test_from_iterator() {
        let selection: Selection = vec![("size", "sm"), ("state", "error")].into_iter().collect();
        assert_eq!(selection.len(), 2);
        assert!(!selection.is_empty());
    }
}
