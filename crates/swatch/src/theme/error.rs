//! Token errors.

use std::path::PathBuf;

/// Error returned when loading or resolving design tokens fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token file couldn't be read
    Read { path: PathBuf, message: String },
    /// The token file isn't valid YAML or doesn't match the schema
    Parse { message: String },
    /// A token entry that is neither a value nor a group
    InvalidValue { path: String, message: String },
    /// A lookup for a token that doesn't exist
    NotFound { path: String },
    /// A token references a token that doesn't exist
    UnresolvedReference { from: String, to: String },
    /// A cycle was detected while following references
    CycleDetected { path: Vec<String> },
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Read { path, message } => {
                write!(f, "failed to read tokens from {}: {}", path.display(), message)
            }
            TokenError::Parse { message } => write!(f, "failed to parse tokens: {}", message),
            TokenError::InvalidValue { path, message } => {
                write!(f, "invalid token '{}': {}", path, message)
            }
            TokenError::NotFound { path } => write!(f, "token '{}' not found", path),
            TokenError::UnresolvedReference { from, to } => {
                write!(f, "token '{}' references non-existent token '{}'", from, to)
            }
            TokenError::CycleDetected { path } => {
                write!(f, "cycle detected in token references: {}", path.join(" -> "))
            }
        }
    }
}

impl std::error::Error for TokenError {}
