//! Design tokens and style expansion.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use super::adaptive::ColorMode;
use super::error::TokenError;
use crate::style::{StyleMap, StyleValue};

const BUILTIN_TOKENS: &str = include_str!("../../theme/tokens.yaml");

/// Key selecting the default value of a semantic token or conditional style.
const BASE_KEY: &str = "base";

/// A single token value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenValue {
    /// The same value in every color mode.
    Plain(String),
    /// A semantic token with a `base` value and per-condition overrides,
    /// keyed by condition (`_dark`).
    Conditional {
        base: String,
        overrides: BTreeMap<String, String>,
    },
}

impl TokenValue {
    /// The raw, unresolved value for a color mode.
    pub fn for_mode(&self, mode: ColorMode) -> &str {
        match self {
            TokenValue::Plain(value) => value,
            TokenValue::Conditional { base, overrides } => overrides
                .get(mode.condition())
                .map(String::as_str)
                .unwrap_or(base.as_str()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct TokensDef {
    #[serde(default)]
    conditions: BTreeMap<String, String>,
    #[serde(default)]
    tokens: StyleMap,
    #[serde(default)]
    semantic_tokens: StyleMap,
}

/// A flattened set of design tokens.
///
/// Token groups flatten to dotted paths: `colors.blue.400`,
/// `fontSizes.sm`, `colors.contents.primary`. Values may reference other
/// tokens as `{colors.gray.900}`, either as the whole value or embedded in a
/// longer one (`2px solid {colors.blue.500}`).
///
/// # Example
///
/// ```rust
/// use swatch::{ColorMode, Tokens};
///
/// let tokens = Tokens::builtin().unwrap();
///
/// assert_eq!(tokens.resolve("colors.blue.400", ColorMode::Light).unwrap(), "#60a5fa");
/// assert_eq!(tokens.resolve("colors.contents.primary", ColorMode::Light).unwrap(), "#111827");
/// assert_eq!(tokens.resolve("colors.contents.primary", ColorMode::Dark).unwrap(), "#f9fafb");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    values: BTreeMap<String, TokenValue>,
    conditions: BTreeMap<String, String>,
}

impl Tokens {
    /// Creates an empty token set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the default theme shipped with the crate.
    ///
    /// # Errors
    ///
    /// Fails only if the embedded token file is broken.
    pub fn builtin() -> Result<Self, TokenError> {
        Self::from_yaml(BUILTIN_TOKENS)
    }

    /// Parses a token file.
    ///
    /// References are not checked here; call [`validate`](Self::validate).
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Parse`] for malformed YAML and
    /// [`TokenError::InvalidValue`] for semantic tokens whose `base` or
    /// overrides aren't scalars.
    pub fn from_yaml(yaml: &str) -> Result<Self, TokenError> {
        let def: TokensDef = serde_yaml::from_str(yaml).map_err(|e| TokenError::Parse {
            message: e.to_string(),
        })?;

        let mut tokens = Tokens {
            values: BTreeMap::new(),
            conditions: def.conditions,
        };
        tokens.flatten(&def.tokens, "", false)?;
        tokens.flatten(&def.semantic_tokens, "", true)?;

        tracing::debug!(tokens = tokens.len(), "loaded design tokens");
        Ok(tokens)
    }

    /// Reads and parses a token file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Read`] if the file can't be read, otherwise as
    /// [`from_yaml`](Self::from_yaml).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TokenError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| TokenError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_yaml(&yaml)
    }

    /// Adds a plain token, returning the updated set for chaining.
    pub fn with(mut self, path: &str, value: &str) -> Self {
        self.values
            .insert(path.to_string(), TokenValue::Plain(value.to_string()));
        self
    }

    /// Adds a semantic token with a dark-mode override.
    pub fn with_semantic(mut self, path: &str, base: &str, dark: &str) -> Self {
        let overrides = BTreeMap::from([(
            ColorMode::Dark.condition().to_string(),
            dark.to_string(),
        )]);
        self.values.insert(
            path.to_string(),
            TokenValue::Conditional {
                base: base.to_string(),
                overrides,
            },
        );
        self
    }

    /// Adds or replaces a named condition.
    pub fn with_condition(mut self, name: &str, selector: &str) -> Self {
        self.conditions
            .insert(name.to_string(), selector.to_string());
        self
    }

    pub fn get(&self, path: &str) -> Option<&TokenValue> {
        self.values.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.values.contains_key(path)
    }

    /// Token paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Named conditions, e.g. `dark` → `[data-theme=dark] &`.
    pub fn conditions(&self) -> &BTreeMap<String, String> {
        &self.conditions
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Follows references from `path` to a literal value.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::NotFound`] for an unknown `path`,
    /// [`TokenError::UnresolvedReference`] when a reference along the way is
    /// dangling, and [`TokenError::CycleDetected`] for circular references.
    pub fn resolve(&self, path: &str, mode: ColorMode) -> Result<String, TokenError> {
        self.resolve_path(path, mode, &mut Vec::new())
    }

    /// Checks that every reference in every mode resolves.
    ///
    /// # Errors
    ///
    /// Returns the first [`TokenError::UnresolvedReference`] or
    /// [`TokenError::CycleDetected`] found.
    pub fn validate(&self) -> Result<(), TokenError> {
        for path in self.values.keys() {
            for mode in [ColorMode::Light, ColorMode::Dark] {
                self.resolve_path(path, mode, &mut Vec::new())?;
            }
        }
        Ok(())
    }

    /// Substitutes token values into a resolved style.
    ///
    /// Color, font-size and radius properties whose value names a token of
    /// that category (`blue.400` for `backgroundColor`) are replaced by the
    /// token's value; so are values that are full token paths
    /// (`colors.blue.300`) and inline `{…}` references. Conditional values
    /// (`{ base: blue.50, _dark: blue.900 }`) collapse to the branch for
    /// `mode`. Anything that doesn't resolve stays as written.
    pub fn expand_style(&self, styles: &StyleMap, mode: ColorMode) -> StyleMap {
        styles
            .iter()
            .map(|(property, value)| (property, self.expand_value(property, value, mode)))
            .collect()
    }

    /// Lists the inline `{…}` references in `styles` that don't resolve in
    /// some color mode, in property order and without repeats.
    pub fn unresolved_references(&self, styles: &StyleMap) -> Vec<String> {
        let mut missing = Vec::new();
        self.collect_unresolved(styles, &mut missing);
        missing
    }

    fn collect_unresolved(&self, styles: &StyleMap, missing: &mut Vec<String>) {
        for (_, value) in styles.iter() {
            match value {
                StyleValue::Nested(map) => self.collect_unresolved(map, missing),
                StyleValue::Text(text) => {
                    for reference in inline_references(text) {
                        let dangling = [ColorMode::Light, ColorMode::Dark]
                            .into_iter()
                            .any(|mode| self.resolve(reference, mode).is_err());
                        if dangling && !missing.iter().any(|m| m == reference) {
                            missing.push(reference.to_string());
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn expand_value(&self, property: &str, value: &StyleValue, mode: ColorMode) -> StyleValue {
        match value {
            StyleValue::Nested(map) if is_conditional(map) => {
                match map.get(mode.condition()).or_else(|| map.get(BASE_KEY)) {
                    Some(chosen) => self.expand_value(property, chosen, mode),
                    None => value.clone(),
                }
            }
            StyleValue::Nested(map) => StyleValue::Nested(self.expand_style(map, mode)),
            StyleValue::Text(text) => StyleValue::Text(self.expand_text(property, text, mode)),
            scalar => scalar.clone(),
        }
    }

    fn expand_text(&self, property: &str, text: &str, mode: ColorMode) -> String {
        if text.contains('{') {
            return self
                .substitute(text, mode, &mut Vec::new(), false)
                .unwrap_or_else(|_| text.to_string());
        }

        let candidate = if self.contains(text) {
            Some(text.to_string())
        } else {
            category_for(property)
                .map(|category| format!("{}.{}", category, text))
                .filter(|path| self.contains(path))
        };

        candidate
            .and_then(|path| self.resolve(&path, mode).ok())
            .unwrap_or_else(|| text.to_string())
    }

    fn resolve_path(
        &self,
        path: &str,
        mode: ColorMode,
        stack: &mut Vec<String>,
    ) -> Result<String, TokenError> {
        if stack.iter().any(|p| p == path) {
            let mut cycle = stack.clone();
            cycle.push(path.to_string());
            return Err(TokenError::CycleDetected { path: cycle });
        }

        let Some(value) = self.values.get(path) else {
            return Err(match stack.last() {
                Some(from) => TokenError::UnresolvedReference {
                    from: from.clone(),
                    to: path.to_string(),
                },
                None => TokenError::NotFound {
                    path: path.to_string(),
                },
            });
        };

        stack.push(path.to_string());
        let resolved = self.substitute(value.for_mode(mode), mode, stack, true);
        stack.pop();
        resolved
    }

    /// Replaces every `{path}` in `text`.
    ///
    /// In lenient mode, references that fail to resolve are kept verbatim.
    fn substitute(
        &self,
        text: &str,
        mode: ColorMode,
        stack: &mut Vec<String>,
        strict: bool,
    ) -> Result<String, TokenError> {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(open) = rest.find('{') {
            let Some(len) = rest[open + 1..].find('}') else {
                break;
            };
            let reference = &rest[open + 1..open + 1 + len];
            out.push_str(&rest[..open]);

            match self.resolve_path(reference.trim(), mode, stack) {
                Ok(value) => out.push_str(&value),
                Err(err) if strict => return Err(err),
                Err(_) => out.push_str(&rest[open..open + len + 2]),
            }
            rest = &rest[open + len + 2..];
        }

        out.push_str(rest);
        Ok(out)
    }

    fn flatten(&mut self, group: &StyleMap, prefix: &str, semantic: bool) -> Result<(), TokenError> {
        for (key, value) in group.iter() {
            let path = if prefix.is_empty() {
                key.to_string()
            } else {
                format!("{}.{}", prefix, key)
            };

            match value {
                StyleValue::Nested(map) if semantic && map.contains_key(BASE_KEY) => {
                    let token = conditional_token(&path, map)?;
                    self.values.insert(path, token);
                }
                StyleValue::Nested(map) => self.flatten(map, &path, semantic)?,
                scalar => {
                    self.values
                        .insert(path, TokenValue::Plain(scalar.to_string()));
                }
            }
        }
        Ok(())
    }
}

fn conditional_token(path: &str, map: &StyleMap) -> Result<TokenValue, TokenError> {
    let scalar = |key: &str, value: &StyleValue| {
        if value.is_nested() {
            Err(TokenError::InvalidValue {
                path: path.to_string(),
                message: format!("'{}' must be a scalar value", key),
            })
        } else {
            Ok(value.to_string())
        }
    };

    let mut base = None;
    let mut overrides = BTreeMap::new();
    for (key, value) in map.iter() {
        if key == BASE_KEY {
            base = Some(scalar(key, value)?);
        } else if key.starts_with('_') {
            overrides.insert(key.to_string(), scalar(key, value)?);
        } else {
            return Err(TokenError::InvalidValue {
                path: path.to_string(),
                message: format!("unexpected key '{}' (expected base or _<condition>)", key),
            });
        }
    }

    let base = base.ok_or_else(|| TokenError::InvalidValue {
        path: path.to_string(),
        message: "missing base value".to_string(),
    })?;
    Ok(TokenValue::Conditional { base, overrides })
}

/// The `{…}` references inside a text value.
fn inline_references(text: &str) -> impl Iterator<Item = &str> {
    text.split('{')
        .skip(1)
        .filter_map(|chunk| chunk.split_once('}'))
        .map(|(reference, _)| reference.trim())
}

/// A nested style value is conditional when it has a `base` branch and
/// every other key is a condition.
fn is_conditional(map: &StyleMap) -> bool {
    map.contains_key(BASE_KEY) && map.keys().all(|k| k == BASE_KEY || k.starts_with('_'))
}

/// The token category a style property draws its values from.
fn category_for(property: &str) -> Option<&'static str> {
    match property {
        "fontSize" => Some("fontSizes"),
        "borderRadius" | "rounded" => Some("radii"),
        "color" | "bg" | "background" | "fill" | "stroke" => Some("colors"),
        p if p.ends_with("Radius") => Some("radii"),
        p if p.ends_with("Color") => Some("colors"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> Tokens {
        Tokens::builtin().unwrap()
    }

    #[test]
    fn test_builtin_flattens_groups() {
        let tokens = tokens();
        assert_eq!(
            tokens.get("colors.gray.50"),
            Some(&TokenValue::Plain("#f9fafb".to_string()))
        );
        assert_eq!(
            tokens.get("fontSizes.base"),
            Some(&TokenValue::Plain("1rem".to_string()))
        );
        assert!(tokens.contains("radii.md"));
        assert!(tokens.contains("colors.input.borderError"));
        assert_eq!(tokens.conditions()["dark"], "[data-theme=dark] &");
    }

    #[test]
    fn test_builtin_tokens_are_valid() {
        assert_eq!(tokens().validate(), Ok(()));
    }

    #[test]
    fn test_resolve_semantic_by_mode() {
        let tokens = tokens();
        assert_eq!(
            tokens.resolve("colors.bg.primary", ColorMode::Light).unwrap(),
            "white"
        );
        assert_eq!(
            tokens.resolve("colors.bg.primary", ColorMode::Dark).unwrap(),
            "#111827"
        );
    }

    #[test]
    fn test_resolve_not_found() {
        assert_eq!(
            tokens().resolve("colors.gray.950", ColorMode::Light),
            Err(TokenError::NotFound {
                path: "colors.gray.950".to_string()
            })
        );
    }

    #[test]
    fn test_embedded_references() {
        let tokens = Tokens::new()
            .with("colors.blue", "#00f")
            .with("borders.focus", "2px solid {colors.blue}");
        assert_eq!(
            tokens.resolve("borders.focus", ColorMode::Light).unwrap(),
            "2px solid #00f"
        );
    }

    #[test]
    fn test_validate_unresolved_reference() {
        let tokens = Tokens::new().with_semantic("colors.text", "{colors.ink}", "{colors.paper}");
        assert_eq!(
            tokens.validate(),
            Err(TokenError::UnresolvedReference {
                from: "colors.text".to_string(),
                to: "colors.ink".to_string(),
            })
        );
    }

    #[test]
    fn test_validate_cycle() {
        let tokens = Tokens::new()
            .with("a", "{b}")
            .with("b", "{c}")
            .with("c", "{a}");

        let err = tokens.validate().unwrap_err();
        assert_eq!(
            err,
            TokenError::CycleDetected {
                path: vec![
                    "a".to_string(),
                    "b".to_string(),
                    "c".to_string(),
                    "a".to_string()
                ]
            }
        );
    }

    #[test]
    fn test_cycle_only_in_dark_mode() {
        let tokens = Tokens::new()
            .with("colors.fg", "#000")
            .with_semantic("colors.text", "{colors.fg}", "{colors.text}");

        assert!(tokens.resolve("colors.text", ColorMode::Light).is_ok());
        assert!(matches!(
            tokens.validate(),
            Err(TokenError::CycleDetected { .. })
        ));
    }

    #[test]
    fn test_unterminated_brace_is_literal() {
        let tokens = Tokens::new().with("odd", "a {b");
        assert_eq!(tokens.resolve("odd", ColorMode::Light).unwrap(), "a {b");
    }

    #[test]
    fn test_semantic_entry_without_base_is_a_group() {
        let tokens =
            Tokens::from_yaml("semanticTokens:\n  colors:\n    text: { muted: '#777' }\n").unwrap();
        assert_eq!(
            tokens.get("colors.text.muted"),
            Some(&TokenValue::Plain("#777".to_string()))
        );
    }

    #[test]
    fn test_parse_semantic_rejects_unknown_keys() {
        let err = Tokens::from_yaml(
            "semanticTokens:\n  colors:\n    text: { base: '#000', dark: '#fff' }\n",
        )
        .unwrap_err();
        assert!(matches!(err, TokenError::InvalidValue { ref path, .. } if path == "colors.text"));
    }

    #[test]
    fn test_parse_rejects_unknown_sections() {
        assert!(matches!(
            Tokens::from_yaml("token: {}\n"),
            Err(TokenError::Parse { .. })
        ));
    }

    #[test]
    fn test_expand_style_by_category() {
        let styles = StyleMap::new()
            .with("backgroundColor", "blue.400")
            .with("color", "white")
            .with("fontSize", "sm")
            .with("borderRadius", "md")
            .with("padding", "sm")
            .with("opacity", 0.6);

        let expanded = tokens().expand_style(&styles, ColorMode::Light);

        assert_eq!(expanded.text(&["backgroundColor"]), Some("#60a5fa"));
        assert_eq!(expanded.text(&["color"]), Some("#ffffff"));
        assert_eq!(expanded.text(&["fontSize"]), Some("0.875rem"));
        assert_eq!(expanded.text(&["borderRadius"]), Some("0.375rem"));
        // Not a token-valued property
        assert_eq!(expanded.text(&["padding"]), Some("sm"));
        assert_eq!(expanded.get("opacity"), styles.get("opacity"));
    }

    #[test]
    fn test_expand_style_semantic_and_nested() {
        let styles = StyleMap::new()
            .with("color", "input.text")
            .with(
                "_disabled",
                StyleMap::new().with("backgroundColor", "input.bgDisabled"),
            );

        let dark = tokens().expand_style(&styles, ColorMode::Dark);
        assert_eq!(dark.text(&["color"]), Some("#f9fafb"));
        assert_eq!(dark.text(&["_disabled", "backgroundColor"]), Some("#374151"));
    }

    #[test]
    fn test_expand_style_full_paths_and_inline_refs() {
        let styles = StyleMap::new()
            .with("outlineColor", "colors.blue.300")
            .with("outline", "2px solid {colors.blue.500}")
            .with("border", "1px solid {colors.nope}");

        let expanded = tokens().expand_style(&styles, ColorMode::Light);
        assert_eq!(expanded.text(&["outlineColor"]), Some("#93c5fd"));
        assert_eq!(expanded.text(&["outline"]), Some("2px solid #3b82f6"));
        assert_eq!(expanded.text(&["border"]), Some("1px solid {colors.nope}"));
    }

    #[test]
    fn test_expand_style_conditional_values() {
        let styles = StyleMap::new().with(
            "backgroundColor",
            StyleMap::new().with("base", "blue.50").with("_dark", "blue.900"),
        );

        let light = tokens().expand_style(&styles, ColorMode::Light);
        let dark = tokens().expand_style(&styles, ColorMode::Dark);
        assert_eq!(light.text(&["backgroundColor"]), Some("#eff6ff"));
        assert_eq!(dark.text(&["backgroundColor"]), Some("#1e3a8a"));
    }

    #[test]
    fn test_unknown_values_stay_as_written() {
        let styles = StyleMap::new()
            .with("color", "contents.error")
            .with("width", "sizes.spinnerMd");
        let expanded = tokens().expand_style(&styles, ColorMode::Light);
        assert_eq!(expanded, styles);
    }

    #[test]
    fn test_unresolved_references() {
        let styles = StyleMap::new()
            .with("outline", "2px solid {colors.blue.500}")
            .with("border", "1px solid {colors.nope}")
            .with(
                "_hover",
                StyleMap::new().with("boxShadow", "0 0 0 1px {colors.nope}, {shadows.ring}"),
            )
            .with("color", "contents.error");

        assert_eq!(
            tokens().unresolved_references(&styles),
            vec!["colors.nope".to_string(), "shadows.ring".to_string()]
        );
    }
}
