//! Variant resolution.
//!
//! Resolving a recipe against a selection merges, in increasing precedence:
//!
//! 1. the base style
//! 2. one fragment per axis, in declared axis order, for the selected (or
//!    default) value
//! 3. the `css` of every compound variant whose constraints all hold
//!
//! When two matching compound variants set the same property, the one
//! declared first wins. Slotted recipes go through the same steps slot by
//! slot.

use serde::Serialize;
use std::collections::BTreeMap;

use super::error::RecipeError;
use super::model::{Fragment, Recipe};
use super::selection::Selection;
use crate::style::StyleMap;

/// The merged styles for one recipe and selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedStyle {
    recipe: String,
    selection: BTreeMap<String, String>,
    styles: Fragment,
}

impl ResolvedStyle {
    pub fn recipe(&self) -> &str {
        &self.recipe
    }

    /// The value every selected axis ended up with, defaults included.
    pub fn selection(&self) -> &BTreeMap<String, String> {
        &self.selection
    }

    pub fn styles(&self) -> &Fragment {
        &self.styles
    }

    /// The merged styles of a non-slotted recipe.
    pub fn flat(&self) -> Option<&StyleMap> {
        match &self.styles {
            Fragment::Flat(map) => Some(map),
            Fragment::Slotted(_) => None,
        }
    }

    pub fn is_slotted(&self) -> bool {
        matches!(self.styles, Fragment::Slotted(_))
    }

    /// The merged styles of one slot of a slotted recipe.
    pub fn slot(&self, slot: &str) -> Option<&StyleMap> {
        self.styles.slot(slot)
    }

    pub fn into_styles(self) -> Fragment {
        self.styles
    }
}

impl Recipe {
    /// Checks a selection and fills in defaults.
    ///
    /// Axes without a selected value and without a default are left out.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::UnknownAxis`] for an axis the recipe doesn't
    /// declare and [`RecipeError::UnknownValue`] for a value outside the
    /// axis's enumeration.
    pub fn effective_selection(
        &self,
        selection: &Selection,
    ) -> Result<BTreeMap<String, String>, RecipeError> {
        for (axis_name, value) in selection.iter() {
            let Some(axis) = self.axis(axis_name) else {
                return Err(RecipeError::UnknownAxis {
                    recipe: self.class_name.clone(),
                    axis: axis_name.to_string(),
                    context: "selection".to_string(),
                    available: self.axis_names(),
                });
            };
            if !axis.has_value(value) {
                return Err(RecipeError::UnknownValue {
                    recipe: self.class_name.clone(),
                    axis: axis_name.to_string(),
                    value: value.to_string(),
                    context: "selection".to_string(),
                    allowed: axis.values().map(str::to_string).collect(),
                });
            }
        }

        Ok(self
            .axes
            .iter()
            .filter_map(|axis| {
                selection
                    .get(&axis.name)
                    .or_else(|| self.defaults.get(&axis.name).map(String::as_str))
                    .map(|value| (axis.name.clone(), value.to_string()))
            })
            .collect())
    }

    /// Resolves the recipe for a selection.
    ///
    /// # Errors
    ///
    /// See [`effective_selection`](Self::effective_selection).
    ///
    /// # Example
    ///
    /// ```rust
    /// use swatch::{RecipeRegistry, Selection, WcagLevel};
    ///
    /// let registry = RecipeRegistry::builtin().unwrap();
    /// let button = registry.get("button").unwrap();
    ///
    /// let resolved = button
    ///     .resolve(&Selection::new().with("variant", "primary").wcag(WcagLevel::A))
    ///     .unwrap();
    /// let styles = resolved.flat().unwrap();
    ///
    /// assert_eq!(styles.text(&["backgroundColor"]), Some("blue.400"));
    /// assert_eq!(resolved.selection()["size"], "md");
    /// ```
    pub fn resolve(&self, selection: &Selection) -> Result<ResolvedStyle, RecipeError> {
        let effective = self.effective_selection(selection)?;
        let mut styles = self.base.clone();

        for axis in &self.axes {
            if let Some(fragment) = effective
                .get(&axis.name)
                .and_then(|value| axis.fragment(value))
            {
                styles.merge(fragment);
            }
        }

        // Applied last-to-first so that the earliest matching rule has the
        // final say on any property two rules share.
        for compound in self
            .compounds
            .iter()
            .rev()
            .filter(|compound| compound.matches(&effective))
        {
            styles.merge(&compound.css);
        }

        Ok(ResolvedStyle {
            recipe: self.class_name.clone(),
            selection: effective,
            styles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::RecipeDef;
    use crate::style::StyleValue;

    fn recipe(yaml: &str) -> Recipe {
        let def: RecipeDef = serde_yaml::from_str(yaml).unwrap();
        Recipe::from_def(def).unwrap()
    }

    fn chip() -> Recipe {
        recipe(
            r#"
className: chip
base:
  color: gray.900
  padding: 1rem
  _disabled: { opacity: 0.5, cursor: not-allowed }
variants:
  size:
    sm: { padding: 0.5rem }
    lg: { padding: 1.5rem }
  tone:
    neutral: {}
    accent: { color: blue.700 }
  loud:
    "true": { fontWeight: bold }
compoundVariants:
  - tone: accent
    size: lg
    css:
      color: blue.900
      _disabled: { color: gray.700 }
  - tone: accent
    css:
      color: blue.800
      borderColor: blue.800
defaultVariants:
  size: sm
  tone: neutral
"#,
        )
    }

    #[test]
    fn test_resolve_defaults() {
        let resolved = chip().resolve(&Selection::new()).unwrap();
        let styles = resolved.flat().unwrap();

        assert_eq!(styles.text(&["padding"]), Some("0.5rem"));
        assert_eq!(styles.text(&["color"]), Some("gray.900"));
        assert_eq!(resolved.selection().len(), 2);
        assert!(!resolved.selection().contains_key("loud"));
    }

    #[test]
    fn test_axis_without_default_stays_unselected() {
        let resolved = chip().resolve(&Selection::new()).unwrap();
        assert!(resolved.flat().unwrap().get("fontWeight").is_none());

        let loud = chip()
            .resolve(&Selection::new().with("loud", "true"))
            .unwrap();
        assert_eq!(loud.flat().unwrap().text(&["fontWeight"]), Some("bold"));
    }

    #[test]
    fn test_axis_fragment_overrides_base() {
        let resolved = chip().resolve(&Selection::new().with("size", "lg")).unwrap();
        assert_eq!(resolved.flat().unwrap().text(&["padding"]), Some("1.5rem"));
    }

    #[test]
    fn test_compound_overrides_axis() {
        let resolved = chip()
            .resolve(&Selection::new().with("tone", "accent"))
            .unwrap();
        // Single-axis compound beats the tone fragment
        assert_eq!(resolved.flat().unwrap().text(&["color"]), Some("blue.800"));
    }

    #[test]
    fn test_first_matching_compound_wins_shared_keys() {
        let resolved = chip()
            .resolve(&Selection::new().with("tone", "accent").with("size", "lg"))
            .unwrap();
        let styles = resolved.flat().unwrap();

        // Both compounds match and both set `color`; the first one declared wins
        assert_eq!(styles.text(&["color"]), Some("blue.900"));
        // Keys only the second one sets still apply
        assert_eq!(styles.text(&["borderColor"]), Some("blue.800"));
    }

    #[test]
    fn test_compound_keeps_base_condition_blocks() {
        let resolved = chip()
            .resolve(&Selection::new().with("tone", "accent").with("size", "lg"))
            .unwrap();
        let styles = resolved.flat().unwrap();

        assert_eq!(styles.text(&["_disabled", "color"]), Some("gray.700"));
        assert_eq!(styles.text(&["_disabled", "cursor"]), Some("not-allowed"));
        assert_eq!(
            styles.lookup(&["_disabled", "opacity"]),
            Some(&StyleValue::from(0.5))
        );
    }

    #[test]
    fn test_unknown_axis_in_selection() {
        let err = chip()
            .resolve(&Selection::new().with("shape", "round"))
            .unwrap_err();
        assert_eq!(
            err,
            RecipeError::UnknownAxis {
                recipe: "chip".to_string(),
                axis: "shape".to_string(),
                context: "selection".to_string(),
                available: vec!["size".to_string(), "tone".to_string(), "loud".to_string()],
            }
        );
    }

    #[test]
    fn test_unknown_value_in_selection() {
        let err = chip()
            .resolve(&Selection::new().with("size", "md"))
            .unwrap_err();
        assert!(matches!(
            err,
            RecipeError::UnknownValue { ref axis, ref value, .. } if axis == "size" && value == "md"
        ));
    }

    #[test]
    fn test_resolve_slotted() {
        let recipe = recipe(
            r#"
className: field
slots: [root, label, input]
base:
  root: { display: flex }
  label: { fontSize: sm }
variants:
  state:
    default: {}
    error:
      input: { borderColor: red.500 }
      label: { color: red.700 }
defaultVariants: { state: default }
"#,
        );

        let resolved = recipe
            .resolve(&Selection::new().with("state", "error"))
            .unwrap();

        assert!(resolved.flat().is_none());
        assert_eq!(resolved.slot("root").unwrap().text(&["display"]), Some("flex"));
        assert_eq!(resolved.slot("label").unwrap().text(&["fontSize"]), Some("sm"));
        assert_eq!(resolved.slot("label").unwrap().text(&["color"]), Some("red.700"));
        assert_eq!(
            resolved.slot("input").unwrap().text(&["borderColor"]),
            Some("red.500")
        );
        assert!(resolved.slot("missing").is_none());
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let recipe = chip();
        let selection = Selection::new().with("tone", "accent");
        assert_eq!(
            recipe.resolve(&selection).unwrap(),
            recipe.resolve(&selection).unwrap()
        );
    }
}
