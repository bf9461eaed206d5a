//! Single style property values.

use serde::{Deserialize, Serialize};

use super::map::StyleMap;

/// A style property value.
///
/// Values are either scalars (`"blue.400"`, `0.6`, `true`) or a nested
/// [`StyleMap`]. Nested maps carry condition blocks such as `_hover` and
/// conditional token values such as `{ base: "blue.50", _dark: "blue.900" }`.
///
/// # Example
///
/// ```rust
/// use swatch::{StyleMap, StyleValue};
///
/// let opacity = StyleValue::from(0.6);
/// let color = StyleValue::from("gray.700");
/// let disabled = StyleValue::from(StyleMap::new().with("color", "gray.700"));
///
/// assert!(opacity.as_number().is_some());
/// assert_eq!(color.as_text(), Some("gray.700"));
/// assert!(disabled.as_map().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    Nested(StyleMap),
}

impl StyleValue {
    /// Returns the text content for [`StyleValue::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StyleValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number for [`StyleValue::Number`].
    pub fn as_number(&self) -> Option<&serde_json::Number> {
        match self {
            StyleValue::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the nested map for [`StyleValue::Nested`].
    pub fn as_map(&self) -> Option<&StyleMap> {
        match self {
            StyleValue::Nested(map) => Some(map),
            _ => None,
        }
    }

    /// Returns `true` for nested blocks.
    pub fn is_nested(&self) -> bool {
        matches!(self, StyleValue::Nested(_))
    }
}

impl std::fmt::Display for StyleValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StyleValue::Bool(b) => write!(f, "{}", b),
            StyleValue::Number(n) => write!(f, "{}", n),
            StyleValue::Text(s) => write!(f, "{}", s),
            StyleValue::Nested(map) => write!(f, "{{{} properties}}", map.len()),
        }
    }
}

impl From<&str> for StyleValue {
    fn from(s: &str) -> Self {
        StyleValue::Text(s.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(s: String) -> Self {
        StyleValue::Text(s)
    }
}

impl From<bool> for StyleValue {
    fn from(b: bool) -> Self {
        StyleValue::Bool(b)
    }
}

impl From<i64> for StyleValue {
    fn from(n: i64) -> Self {
        StyleValue::Number(n.into())
    }
}

impl From<u64> for StyleValue {
    fn from(n: u64) -> Self {
        StyleValue::Number(n.into())
    }
}

impl From<f64> for StyleValue {
    /// Non-finite floats have no JSON representation and are kept as text.
    fn from(n: f64) -> Self {
        match serde_json::Number::from_f64(n) {
            Some(num) => StyleValue::Number(num),
            None => StyleValue::Text(n.to_string()),
        }
    }
}

impl From<StyleMap> for StyleValue {
    fn from(map: StyleMap) -> Self {
        StyleValue::Nested(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_scalars_from_yaml() {
        let map: StyleMap = serde_yaml::from_str(
            r#"
opacity: 0.6
zIndex: 9999
color: "gray.700"
outlineOffset: "0"
visible: true
"#,
        )
        .unwrap();

        assert_eq!(map.get("opacity"), Some(&StyleValue::from(0.6)));
        assert_eq!(map.get("zIndex"), Some(&StyleValue::from(9999u64)));
        assert_eq!(map.get("color"), Some(&StyleValue::from("gray.700")));
        // Quoted numbers stay text
        assert_eq!(map.get("outlineOffset"), Some(&StyleValue::from("0")));
        assert_eq!(map.get("visible"), Some(&StyleValue::from(true)));
    }

    #[test]
    fn test_deserialize_nested_block() {
        let map: StyleMap = serde_yaml::from_str(
            r#"
_disabled:
  cursor: not-allowed
  opacity: 0.6
"#,
        )
        .unwrap();

        let disabled = map.get("_disabled").and_then(StyleValue::as_map).unwrap();
        assert_eq!(disabled.text(&["cursor"]), Some("not-allowed"));
    }

    #[test]
    fn test_display() {
        assert_eq!(StyleValue::from("md").to_string(), "md");
        assert_eq!(StyleValue::from(4u64).to_string(), "4");
        assert_eq!(StyleValue::from(false).to_string(), "false");
        let nested = StyleValue::from(StyleMap::new().with("a", "b"));
        assert_eq!(nested.to_string(), "{1 properties}");
    }

    #[test]
    fn test_non_finite_float_becomes_text() {
        assert_eq!(StyleValue::from(f64::NAN).as_text(), Some("NaN"));
    }
}
