//! Validated recipe model.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use super::def::{CompoundDef, RecipeDef};
use super::error::RecipeError;
use crate::style::{StyleMap, StyleValue};

/// A style fragment, shaped by whether its recipe has slots.
///
/// Within one [`Recipe`] every fragment has the same shape, and slotted
/// fragments always carry an entry for every declared slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Fragment {
    Flat(StyleMap),
    Slotted(BTreeMap<String, StyleMap>),
}

impl Fragment {
    /// Merges `other` into this fragment, slot by slot for slotted fragments.
    pub(crate) fn merge(&mut self, other: &Fragment) {
        match (self, other) {
            (Fragment::Flat(target), Fragment::Flat(source)) => target.merge(source),
            (Fragment::Slotted(target), Fragment::Slotted(source)) => {
                for (slot, styles) in source {
                    target.entry(slot.clone()).or_default().merge(styles);
                }
            }
            // Shapes are fixed per recipe at load time
            _ => debug_assert!(false, "merged fragments of different shapes"),
        }
    }

    /// Returns the styles of a single slot, or the flat map for `Flat`.
    pub fn slot(&self, slot: &str) -> Option<&StyleMap> {
        match self {
            Fragment::Flat(_) => None,
            Fragment::Slotted(slots) => slots.get(slot),
        }
    }

    fn project(&self, slot: &str) -> Fragment {
        Fragment::Flat(self.slot(slot).cloned().unwrap_or_default())
    }
}

/// One variant axis and its enumerated values, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantAxis {
    pub(crate) name: String,
    pub(crate) values: Vec<(String, Fragment)>,
}

impl VariantAxis {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The enumerated values of this axis.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(v, _)| v.as_str())
    }

    pub fn has_value(&self, value: &str) -> bool {
        self.values.iter().any(|(v, _)| v == value)
    }

    /// The fragment applied when this axis takes `value`.
    pub fn fragment(&self, value: &str) -> Option<&Fragment> {
        self.values
            .iter()
            .find(|(v, _)| v == value)
            .map(|(_, fragment)| fragment)
    }

    fn value_names(&self) -> Vec<String> {
        self.values.iter().map(|(v, _)| v.clone()).collect()
    }
}

/// A style override applied when every constraint matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundVariant {
    pub(crate) conditions: BTreeMap<String, BTreeSet<String>>,
    pub(crate) css: Fragment,
}

impl CompoundVariant {
    /// Axis constraints; each axis accepts any of its listed values.
    pub fn conditions(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.conditions
    }

    pub fn css(&self) -> &Fragment {
        &self.css
    }

    /// Returns `true` if the effective selection satisfies every constraint.
    ///
    /// An unselected axis satisfies no constraint.
    pub fn matches(&self, effective: &BTreeMap<String, String>) -> bool {
        self.conditions.iter().all(|(axis, accepted)| {
            effective
                .get(axis)
                .map(|value| accepted.contains(value))
                .unwrap_or(false)
        })
    }
}

/// A validated style recipe.
///
/// Built from a [`RecipeDef`] with [`Recipe::from_def`], which rejects every
/// dangling axis, value or slot reference. Once constructed, a recipe can
/// only fail to resolve because of the selection it is given.
///
/// # Example
///
/// ```rust
/// use swatch::{Recipe, RecipeDef, Selection};
///
/// let def: RecipeDef = serde_yaml::from_str(r#"
/// className: badge
/// base: { display: inline-flex }
/// variants:
///   tone:
///     info: { color: blue.700 }
///     danger: { color: red.700 }
/// defaultVariants: { tone: info }
/// "#).unwrap();
///
/// let recipe = Recipe::from_def(def).unwrap();
/// let resolved = recipe.resolve(&Selection::new()).unwrap();
/// assert_eq!(resolved.flat().unwrap().text(&["color"]), Some("blue.700"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub(crate) class_name: String,
    pub(crate) description: Option<String>,
    pub(crate) slots: Vec<String>,
    pub(crate) base: Fragment,
    pub(crate) axes: Vec<VariantAxis>,
    pub(crate) compounds: Vec<CompoundVariant>,
    pub(crate) defaults: BTreeMap<String, String>,
}

impl Recipe {
    /// Validates a definition and builds a recipe from it.
    ///
    /// # Errors
    ///
    /// Returns the first [`RecipeError`] found: missing class name, duplicate
    /// slots/axes/values, empty axes, undeclared slots, defaults or compound
    /// constraints naming unknown axes or values, compound rules without
    /// constraints, and compound rules with identical constraint sets.
    pub fn from_def(def: RecipeDef) -> Result<Self, RecipeError> {
        let name = def.class_name.trim().to_string();
        if name.is_empty() {
            return Err(RecipeError::MissingClassName);
        }
        let shape = Shape::new(&name, &def.slots)?;

        let base = shape.fragment(def.base, "base")?;

        let mut axes: Vec<VariantAxis> = Vec::with_capacity(def.variants.len());
        for (axis_key, values) in def.variants.0 {
            let axis_name = axis_key.into_string();
            if axes.iter().any(|a| a.name == axis_name) {
                return Err(RecipeError::Duplicate {
                    recipe: name,
                    kind: "axis",
                    name: axis_name,
                });
            }
            if values.is_empty() {
                return Err(RecipeError::EmptyAxis {
                    recipe: name,
                    axis: axis_name,
                });
            }

            let mut axis = VariantAxis {
                name: axis_name,
                values: Vec::with_capacity(values.len()),
            };
            for (value_key, styles) in values.0 {
                let value = value_key.into_string();
                if axis.has_value(&value) {
                    return Err(RecipeError::Duplicate {
                        recipe: name,
                        kind: "value",
                        name: format!("{}={}", axis.name, value),
                    });
                }
                let context = format!("variant {}={}", axis.name, value);
                let fragment = shape.fragment(styles, &context)?;
                axis.values.push((value, fragment));
            }
            axes.push(axis);
        }

        let mut defaults = BTreeMap::new();
        for (axis_key, value_key) in def.default_variants.0 {
            let axis = find_axis(&name, &axes, axis_key.as_str(), "defaultVariants")?;
            check_value(&name, axis, value_key.as_str(), "defaultVariants")?;
            defaults.insert(axis_key.into_string(), value_key.into_string());
        }

        let mut compounds: Vec<CompoundVariant> = Vec::with_capacity(def.compound_variants.len());
        for (index, compound) in def.compound_variants.into_iter().enumerate() {
            let built = build_compound(&name, &shape, &axes, index, compound)?;
            if let Some(first) = compounds.iter().position(|c| c.conditions == built.conditions) {
                return Err(RecipeError::DuplicateCompound {
                    recipe: name,
                    first,
                    second: index,
                });
            }
            compounds.push(built);
        }

        tracing::debug!(
            recipe = %name,
            slots = def.slots.len(),
            axes = axes.len(),
            compounds = compounds.len(),
            "validated recipe"
        );

        Ok(Self {
            class_name: name,
            description: def.description,
            slots: def.slots,
            base,
            axes,
            compounds,
            defaults,
        })
    }

    /// The recipe's identifying name.
    pub fn name(&self) -> &str {
        &self.class_name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Declared slots; empty for non-slotted recipes.
    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    pub fn is_slotted(&self) -> bool {
        !self.slots.is_empty()
    }

    pub fn base(&self) -> &Fragment {
        &self.base
    }

    /// Variant axes in declaration order.
    pub fn axes(&self) -> &[VariantAxis] {
        &self.axes
    }

    pub fn axis(&self, name: &str) -> Option<&VariantAxis> {
        self.axes.iter().find(|a| a.name == name)
    }

    pub fn compound_variants(&self) -> &[CompoundVariant] {
        &self.compounds
    }

    pub fn defaults(&self) -> &BTreeMap<String, String> {
        &self.defaults
    }

    /// Returns the single-slot view of a slotted recipe.
    ///
    /// The view keeps every axis, default and compound constraint, with each
    /// fragment restricted to `slot`. Resolving the view yields exactly the
    /// slot's styles from resolving the full recipe.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::NotSlotted`] for recipes without slots and
    /// [`RecipeError::UndeclaredSlot`] for an unknown slot.
    pub fn slot_view(&self, slot: &str) -> Result<Recipe, RecipeError> {
        if !self.is_slotted() {
            return Err(RecipeError::NotSlotted {
                recipe: self.class_name.clone(),
            });
        }
        if !self.slots.iter().any(|s| s == slot) {
            return Err(RecipeError::UndeclaredSlot {
                recipe: self.class_name.clone(),
                slot: slot.to_string(),
                context: "slot view".to_string(),
            });
        }

        Ok(Recipe {
            class_name: format!("{}__{}", self.class_name, slot),
            description: self.description.clone(),
            slots: Vec::new(),
            base: self.base.project(slot),
            axes: self
                .axes
                .iter()
                .map(|axis| VariantAxis {
                    name: axis.name.clone(),
                    values: axis
                        .values
                        .iter()
                        .map(|(value, fragment)| (value.clone(), fragment.project(slot)))
                        .collect(),
                })
                .collect(),
            compounds: self
                .compounds
                .iter()
                .map(|compound| CompoundVariant {
                    conditions: compound.conditions.clone(),
                    css: compound.css.project(slot),
                })
                .collect(),
            defaults: self.defaults.clone(),
        })
    }

    pub(crate) fn axis_names(&self) -> Vec<String> {
        self.axes.iter().map(|a| a.name.clone()).collect()
    }
}

/// Converts raw style maps into fragments of the recipe's shape.
struct Shape<'a> {
    recipe: &'a str,
    slots: &'a [String],
}

impl<'a> Shape<'a> {
    fn new(recipe: &'a str, slots: &'a [String]) -> Result<Self, RecipeError> {
        let mut seen = BTreeSet::new();
        for slot in slots {
            if !seen.insert(slot.as_str()) {
                return Err(RecipeError::Duplicate {
                    recipe: recipe.to_string(),
                    kind: "slot",
                    name: slot.clone(),
                });
            }
        }
        Ok(Self { recipe, slots })
    }

    fn fragment(&self, styles: StyleMap, context: &str) -> Result<Fragment, RecipeError> {
        if self.slots.is_empty() {
            return Ok(Fragment::Flat(styles));
        }

        let mut by_slot: BTreeMap<String, StyleMap> = self
            .slots
            .iter()
            .map(|slot| (slot.clone(), StyleMap::new()))
            .collect();

        for (slot, value) in styles {
            let Some(target) = by_slot.get_mut(&slot) else {
                return Err(RecipeError::UndeclaredSlot {
                    recipe: self.recipe.to_string(),
                    slot,
                    context: context.to_string(),
                });
            };
            match value {
                StyleValue::Nested(map) => *target = map,
                _ => {
                    return Err(RecipeError::SlotNotStyle {
                        recipe: self.recipe.to_string(),
                        slot,
                        context: context.to_string(),
                    })
                }
            }
        }

        Ok(Fragment::Slotted(by_slot))
    }
}

fn find_axis<'r>(
    recipe: &str,
    axes: &'r [VariantAxis],
    axis: &str,
    context: &str,
) -> Result<&'r VariantAxis, RecipeError> {
    axes.iter()
        .find(|a| a.name == axis)
        .ok_or_else(|| RecipeError::UnknownAxis {
            recipe: recipe.to_string(),
            axis: axis.to_string(),
            context: context.to_string(),
            available: axes.iter().map(|a| a.name.clone()).collect(),
        })
}

fn check_value(
    recipe: &str,
    axis: &VariantAxis,
    value: &str,
    context: &str,
) -> Result<(), RecipeError> {
    if axis.has_value(value) {
        Ok(())
    } else {
        Err(RecipeError::UnknownValue {
            recipe: recipe.to_string(),
            axis: axis.name.clone(),
            value: value.to_string(),
            context: context.to_string(),
            allowed: axis.value_names(),
        })
    }
}

fn build_compound(
    recipe: &str,
    shape: &Shape<'_>,
    axes: &[VariantAxis],
    index: usize,
    def: CompoundDef,
) -> Result<CompoundVariant, RecipeError> {
    if def.conditions.is_empty() {
        return Err(RecipeError::EmptyCompound {
            recipe: recipe.to_string(),
            index,
        });
    }

    let context = format!("compound variant #{}", index);
    let mut conditions = BTreeMap::new();
    for (axis_name, condition) in &def.conditions {
        let axis = find_axis(recipe, axes, axis_name, &context)?;
        let mut accepted = BTreeSet::new();
        for value in condition.values() {
            check_value(recipe, axis, value.as_str(), &context)?;
            accepted.insert(value.as_str().to_string());
        }
        conditions.insert(axis_name.clone(), accepted);
    }

    Ok(CompoundVariant {
        conditions,
        css: shape.fragment(def.css, &context)?,
    })
}
