//! Serialized recipe definitions.
//!
//! These types mirror the recipe files one-to-one and carry no guarantees.
//! They become a [`Recipe`](super::Recipe) only through
//! [`Recipe::from_def`](super::Recipe::from_def), which checks every
//! cross-reference.

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use crate::style::StyleMap;

/// An axis name or variant value as written in a recipe file.
///
/// Recipe files use booleans (`true:`) and bare numbers as variant keys as
/// well as strings; all of them are stored as their string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct VariantKey(String);

impl VariantKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VariantKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

struct VariantKeyVisitor;

impl Visitor<'_> for VariantKeyVisitor {
    type Value = VariantKey;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, boolean or integer variant key")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<VariantKey, E> {
        Ok(VariantKey(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<VariantKey, E> {
        Ok(VariantKey(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<VariantKey, E> {
        Ok(VariantKey(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<VariantKey, E> {
        Ok(VariantKey(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<VariantKey, E> {
        Ok(VariantKey(v.to_string()))
    }
}

impl<'de> Deserialize<'de> for VariantKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(VariantKeyVisitor)
    }
}

/// A map that keeps entries in file order.
///
/// Axis order decides merge precedence, so variant tables can't go through a
/// sorted or hashed map.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V>(pub Vec<(VariantKey, V)>);

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&VariantKey, &V)> {
        self.0.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

struct OrderedMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
    type Value = OrderedMap<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<OrderedMap<V>, A::Error> {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<VariantKey, V>()? {
            entries.push((key, value));
        }
        Ok(OrderedMap(entries))
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// A recipe as written in a recipe file.
///
/// Non-slotted recipes put style properties directly under `base`, the
/// variant values and `css`. Slotted recipes list their `slots` and key
/// every one of those maps by slot name.
///
/// ```yaml
/// className: button
/// base:
///   cursor: pointer
/// variants:
///   size:
///     sm: { fontSize: sm }
///     md: { fontSize: base }
/// compoundVariants:
///   - size: sm
///     css: { padding: 0.5rem }
/// defaultVariants:
///   size: md
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RecipeDef {
    pub class_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slots: Vec<String>,
    #[serde(default)]
    pub base: StyleMap,
    #[serde(default)]
    pub variants: OrderedMap<OrderedMap<StyleMap>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compound_variants: Vec<CompoundDef>,
    #[serde(default)]
    pub default_variants: OrderedMap<VariantKey>,
}

/// A compound variant rule as written in a recipe file.
///
/// Every key other than `css` is an axis constraint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CompoundDef {
    #[serde(flatten)]
    pub conditions: BTreeMap<String, ConditionDef>,
    #[serde(default)]
    pub css: StyleMap,
}

/// The accepted value(s) of one compound constraint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ConditionDef {
    AnyOf(Vec<VariantKey>),
    One(VariantKey),
}

impl ConditionDef {
    pub fn values(&self) -> Vec<&VariantKey> {
        match self {
            ConditionDef::AnyOf(values) => values.iter().collect(),
            ConditionDef::One(value) => vec![value],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_key_accepts_bool_and_numbers() {
        let map: OrderedMap<u8> = serde_yaml::from_str("true: 1\n2: 2\nsm: 3\n").unwrap();
        let keys: Vec<&str> = map.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["true", "2", "sm"]);
    }

    #[test]
    fn test_ordered_map_keeps_file_order() {
        let map: OrderedMap<u8> = serde_yaml::from_str("lg: 1\nsm: 2\nmd: 3\n").unwrap();
        let keys: Vec<&str> = map.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["lg", "sm", "md"]);
    }

    #[test]
    fn test_compound_conditions_are_flattened() {
        let def: CompoundDef = serde_yaml::from_str(
            r#"
variant: primary
size: [sm, md]
css:
  color: white
"#,
        )
        .unwrap();

        assert_eq!(def.conditions.len(), 2);
        assert_eq!(
            def.conditions["variant"],
            ConditionDef::One(VariantKey::from("primary"))
        );
        assert_eq!(def.conditions["size"].values().len(), 2);
        assert_eq!(def.css.text(&["color"]), Some("white"));
    }

    #[test]
    fn test_recipe_def_rejects_unknown_fields() {
        let result: Result<RecipeDef, _> =
            serde_yaml::from_str("className: x\ncompoundVariant: []\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_recipe_def_defaults() {
        let def: RecipeDef = serde_yaml::from_str("className: bare\n").unwrap();
        assert_eq!(def.class_name, "bare");
        assert!(def.slots.is_empty());
        assert!(def.base.is_empty());
        assert!(def.variants.is_empty());
        assert!(def.default_variants.is_empty());
    }
}
