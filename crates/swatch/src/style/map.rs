//! Property maps and the merge rule.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::value::StyleValue;

/// A map of style properties.
///
/// Keys are kept sorted so that resolved output is stable across runs.
///
/// # Example
///
/// ```rust
/// use swatch::StyleMap;
///
/// let mut base = StyleMap::new()
///     .with("cursor", "pointer")
///     .with("_disabled", StyleMap::new().with("opacity", 0.6));
///
/// let compound = StyleMap::new()
///     .with("backgroundColor", "blue.400")
///     .with("_disabled", StyleMap::new().with("color", "gray.700"));
///
/// base.merge(&compound);
///
/// assert_eq!(base.text(&["backgroundColor"]), Some("blue.400"));
/// assert_eq!(base.text(&["_disabled", "color"]), Some("gray.700"));
/// assert!(base.lookup(&["_disabled", "opacity"]).is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleMap(BTreeMap<String, StyleValue>);

impl StyleMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a property, returning the updated map for chaining.
    pub fn with<V: Into<StyleValue>>(mut self, key: &str, value: V) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Inserts a property, returning the previous value if any.
    pub fn insert<V: Into<StyleValue>>(&mut self, key: impl Into<String>, value: V) -> Option<StyleValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&StyleValue> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<StyleValue> {
        self.0.remove(key)
    }

    /// Follows a path of keys through nested blocks.
    ///
    /// `lookup(&["_hover", "_disabled", "backgroundColor"])` reads the
    /// background color applied when a disabled element is hovered.
    pub fn lookup(&self, path: &[&str]) -> Option<&StyleValue> {
        let (last, parents) = path.split_last()?;
        let mut current = self;
        for key in parents {
            current = current.get(key)?.as_map()?;
        }
        current.get(last)
    }

    /// Like [`lookup`](Self::lookup), returning only text values.
    pub fn text(&self, path: &[&str]) -> Option<&str> {
        self.lookup(path).and_then(StyleValue::as_text)
    }

    /// Merges `other` into this map.
    ///
    /// For each key in `other`:
    /// - if both sides hold a nested block, the blocks are merged recursively
    /// - otherwise the value from `other` replaces the current one
    ///
    /// Keys absent from `other` are left untouched.
    pub fn merge(&mut self, other: &StyleMap) {
        for (key, incoming) in &other.0 {
            match (self.0.get_mut(key), incoming) {
                (Some(StyleValue::Nested(existing)), StyleValue::Nested(nested)) => {
                    existing.merge(nested);
                }
                _ => {
                    self.0.insert(key.clone(), incoming.clone());
                }
            }
        }
    }

    /// Consuming variant of [`merge`](Self::merge).
    pub fn merged(mut self, other: &StyleMap) -> Self {
        self.merge(other);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl From<BTreeMap<String, StyleValue>> for StyleMap {
    fn from(map: BTreeMap<String, StyleValue>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>> FromIterator<(K, StyleValue)> for StyleMap {
    fn from_iter<T: IntoIterator<Item = (K, StyleValue)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl IntoIterator for StyleMap {
    type Item = (String, StyleValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, StyleValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_replaces_scalars() {
        let mut base = StyleMap::new().with("color", "white").with("gap", "0.5rem");
        base.merge(&StyleMap::new().with("color", "gray.900"));

        assert_eq!(base.text(&["color"]), Some("gray.900"));
        assert_eq!(base.text(&["gap"]), Some("0.5rem"));
    }

    #[test]
    fn test_merge_combines_nested_blocks() {
        let mut base = StyleMap::new().with(
            "_disabled",
            StyleMap::new().with("cursor", "not-allowed").with("opacity", 0.6),
        );
        base.merge(&StyleMap::new().with(
            "_disabled",
            StyleMap::new().with("cursor", "default").with("color", "gray.700"),
        ));

        assert_eq!(base.text(&["_disabled", "cursor"]), Some("default"));
        assert_eq!(base.text(&["_disabled", "color"]), Some("gray.700"));
        assert_eq!(
            base.lookup(&["_disabled", "opacity"]),
            Some(&StyleValue::from(0.6))
        );
    }

    #[test]
    fn test_merge_nested_over_scalar_replaces() {
        let mut base = StyleMap::new().with("backgroundColor", "blue.50");
        base.merge(&StyleMap::new().with(
            "backgroundColor",
            StyleMap::new().with("base", "blue.50").with("_dark", "blue.900"),
        ));

        assert_eq!(base.text(&["backgroundColor", "_dark"]), Some("blue.900"));
    }

    #[test]
    fn test_merge_scalar_over_nested_replaces() {
        let mut base = StyleMap::new().with("outline", StyleMap::new().with("base", "none"));
        base.merge(&StyleMap::new().with("outline", "none"));

        assert_eq!(base.text(&["outline"]), Some("none"));
    }

    #[test]
    fn test_merge_three_levels_deep() {
        let mut base = StyleMap::new().with(
            "_hover",
            StyleMap::new().with("_disabled", StyleMap::new().with("opacity", 0.5)),
        );
        base.merge(&StyleMap::new().with(
            "_hover",
            StyleMap::new().with(
                "_disabled",
                StyleMap::new().with("backgroundColor", "gray.300"),
            ),
        ));

        assert!(base.lookup(&["_hover", "_disabled", "opacity"]).is_some());
        assert_eq!(
            base.text(&["_hover", "_disabled", "backgroundColor"]),
            Some("gray.300")
        );
    }

    #[test]
    fn test_lookup_missing_paths() {
        let map = StyleMap::new().with("color", "white");
        assert!(map.lookup(&[]).is_none());
        assert!(map.lookup(&["missing"]).is_none());
        // Can't descend through a scalar
        assert!(map.lookup(&["color", "base"]).is_none());
    }

    #[test]
    fn test_serializes_sorted() {
        let map = StyleMap::new().with("zIndex", 10u64).with("color", "white");
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"color":"white","zIndex":10}"#);
    }
}
