//! Recipe configuration errors.

/// Error returned when a recipe or a selection is invalid.
///
/// All of these are configuration mistakes. They are reported when a recipe
/// is loaded or a selection is resolved, never papered over with defaults.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecipeError {
    /// The recipe has no class name
    #[error("recipe has an empty className")]
    MissingClassName,

    /// An axis name that the recipe doesn't declare
    #[error("recipe '{recipe}': unknown variant axis '{axis}' in {context} (declared: {})", .available.join(", "))]
    UnknownAxis {
        recipe: String,
        axis: String,
        context: String,
        available: Vec<String>,
    },

    /// A value outside an axis's enumeration
    #[error("recipe '{recipe}': '{value}' is not a value of axis '{axis}' in {context} (allowed: {})", .allowed.join(", "))]
    UnknownValue {
        recipe: String,
        axis: String,
        value: String,
        context: String,
        allowed: Vec<String>,
    },

    /// A fragment references a slot missing from the slot list
    #[error("recipe '{recipe}': slot '{slot}' used in {context} is not declared")]
    UndeclaredSlot {
        recipe: String,
        slot: String,
        context: String,
    },

    /// A slot entry that isn't a style block
    #[error("recipe '{recipe}': slot '{slot}' in {context} must be a style block")]
    SlotNotStyle {
        recipe: String,
        slot: String,
        context: String,
    },

    /// A slot view was requested from a recipe without slots
    #[error("recipe '{recipe}' has no slots")]
    NotSlotted { recipe: String },

    /// The same slot, axis or value appears twice
    #[error("recipe '{recipe}': duplicate {kind} '{name}'")]
    Duplicate {
        recipe: String,
        kind: &'static str,
        name: String,
    },

    /// An axis with no values
    #[error("recipe '{recipe}': axis '{axis}' declares no values")]
    EmptyAxis { recipe: String, axis: String },

    /// A compound variant with no constraints
    #[error("recipe '{recipe}': compound variant #{index} has no conditions")]
    EmptyCompound { recipe: String, index: usize },

    /// Two compound variants with identical constraint sets
    #[error("recipe '{recipe}': compound variants #{first} and #{second} have identical conditions")]
    DuplicateCompound {
        recipe: String,
        first: usize,
        second: usize,
    },

    /// A selection entry that isn't written as `axis=value`
    #[error("malformed selection '{input}': expected axis=value")]
    MalformedSelection { input: String },
}
