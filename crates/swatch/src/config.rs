//! Project configuration.
//!
//! A project describes its styling setup in a `swatch.yaml` file:
//!
//! ```yaml
//! preflight: true
//! include:
//!   - ./components/**/*.{js,jsx,ts,tsx,vue}
//!   - ./pages/**/*.{js,jsx,ts,tsx,vue}
//! exclude: []
//! conditions:
//!   light: "[data-theme=light] &"
//!   dark: "[data-theme=dark] &"
//! recipes: recipes
//! theme: theme/tokens.yaml
//! outdir: styled-system
//! ```
//!
//! Every key is optional. Relative paths resolve against the directory that
//! holds the config file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::registry::{LoadError, RecipeRegistry};
use crate::theme::{TokenError, Tokens};

/// Conventional config file name.
pub const CONFIG_FILE_NAME: &str = "swatch.yaml";

const DEFAULT_OUTDIR: &str = "styled-system";

/// Error returned when a project configuration can't be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {message}", .path.display())]
    Read { path: PathBuf, message: String },

    #[error("failed to parse config {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error(transparent)]
    Recipes(#[from] LoadError),

    #[error(transparent)]
    Tokens(#[from] TokenError),
}

/// Settings loaded from `swatch.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Whether generated styles start with a CSS reset.
    pub preflight: bool,
    /// Globs of source files that use recipes.
    pub include: Vec<String>,
    /// Globs excluded from `include`.
    pub exclude: Vec<String>,
    /// Named conditions, e.g. `dark` → `[data-theme=dark] &`.
    pub conditions: BTreeMap<String, String>,
    /// Output directory for generated styles.
    pub outdir: PathBuf,
    /// Directory of project recipes, loaded on top of the built-ins.
    pub recipes: Option<PathBuf>,
    /// Token file replacing the built-in theme.
    pub theme: Option<PathBuf>,
    #[serde(skip)]
    base_dir: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            preflight: true,
            include: Vec::new(),
            exclude: Vec::new(),
            conditions: BTreeMap::new(),
            outdir: PathBuf::from(DEFAULT_OUTDIR),
            recipes: None,
            theme: None,
            base_dir: PathBuf::from("."),
        }
    }
}

impl ProjectConfig {
    /// Loads a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file can't be read and
    /// [`ConfigError::Parse`] if it isn't a valid config.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let config = Self::from_yaml(&yaml, base_dir).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        tracing::debug!(path = %path.display(), "loaded project config");
        Ok(config)
    }

    /// Loads `swatch.yaml` from `dir` if it exists, or returns the defaults
    /// rooted at `dir`.
    ///
    /// # Errors
    ///
    /// As [`load`](Self::load), for a config file that exists.
    pub fn load_or_default(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self {
                base_dir: dir.to_path_buf(),
                ..Self::default()
            })
        }
    }

    fn from_yaml(yaml: &str, base_dir: &Path) -> Result<Self, String> {
        // An empty file is an empty mapping
        let mut config: ProjectConfig = if yaml.trim().is_empty() {
            ProjectConfig::default()
        } else {
            serde_yaml::from_str(yaml).map_err(|e| e.to_string())?
        };
        config.base_dir = base_dir.to_path_buf();
        Ok(config)
    }

    /// The directory relative paths resolve against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn outdir_path(&self) -> PathBuf {
        self.resolve_path(&self.outdir)
    }

    pub fn recipes_dir(&self) -> Option<PathBuf> {
        self.recipes.as_deref().map(|p| self.resolve_path(p))
    }

    pub fn theme_path(&self) -> Option<PathBuf> {
        self.theme.as_deref().map(|p| self.resolve_path(p))
    }

    /// Loads the built-in recipes plus the project's recipe directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Recipes`] if any recipe fails to load.
    pub fn registry(&self) -> Result<RecipeRegistry, ConfigError> {
        let mut registry = RecipeRegistry::builtin()?;
        if let Some(dir) = self.recipes_dir() {
            registry.add_from_dir(&dir)?;
            tracing::info!(dir = %dir.display(), recipes = registry.len(), "loaded project recipes");
        }
        Ok(registry)
    }

    /// Loads the project's theme, or the built-in one, with the configured
    /// conditions applied on top.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Tokens`] if the token file can't be loaded.
    pub fn tokens(&self) -> Result<Tokens, ConfigError> {
        let mut tokens = match self.theme_path() {
            Some(path) => Tokens::from_file(path)?,
            None => Tokens::builtin()?,
        };
        for (name, selector) in &self.conditions {
            tokens = tokens.with_condition(name, selector);
        }
        Ok(tokens)
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}
