//! Recipe registry for built-in, inline and file-based recipes.
//!
//! [`RecipeRegistry`] collects validated recipes from three kinds of source:
//!
//! 1. **Built-ins**: the component recipes embedded in this crate
//! 2. **Inline**: YAML strings added with [`RecipeRegistry::add_yaml`]
//! 3. **Directories**: `.yaml`/`.yml` files found by [`walk_recipe_dir`]
//!
//! Later sources replace earlier ones under the same recipe name, except
//! between files: two files defining the same recipe, in one directory or
//! in two, is a [`LoadError::Collision`].
//!
//! # Extensions
//!
//! | Priority | Extension |
//! |----------|-----------|
//! | 1 (highest) | `.yaml` |
//! | 2 | `.yml` |
//!
//! When `button.yaml` and `button.yml` sit in the same directory, only
//! `button.yaml` is read.
//!
//! # Example
//!
//! ```rust
//! use swatch::RecipeRegistry;
//!
//! let mut registry = RecipeRegistry::builtin().unwrap();
//! registry
//!     .add_yaml("inline", "className: badge\nbase: { display: inline-flex }\n")
//!     .unwrap();
//!
//! assert!(registry.get("button").is_ok());
//! assert!(registry.get("badge").is_ok());
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::recipe::{Recipe, RecipeDef, RecipeError};

/// Recognized recipe file extensions in priority order.
pub const RECIPE_EXTENSIONS: &[&str] = &[".yaml", ".yml"];

/// Recipes shipped with the crate, as `(file name, YAML)`.
const BUILTIN_RECIPES: &[(&str, &str)] = &[
    ("button.yaml", include_str!("../recipes/button.yaml")),
    ("input.yaml", include_str!("../recipes/input.yaml")),
    ("textarea.yaml", include_str!("../recipes/textarea.yaml")),
    ("card.yaml", include_str!("../recipes/card.yaml")),
    ("modal.yaml", include_str!("../recipes/modal.yaml")),
    ("checkbox.yaml", include_str!("../recipes/checkbox.yaml")),
    ("radio.yaml", include_str!("../recipes/radio.yaml")),
    ("select.yaml", include_str!("../recipes/select.yaml")),
    ("loading.yaml", include_str!("../recipes/loading.yaml")),
    ("tooltip.yaml", include_str!("../recipes/tooltip.yaml")),
];

/// A recipe file discovered during directory walking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeFile {
    /// Path relative to the root, without extension (e.g. `"forms/input"`)
    pub name: String,
    /// Path relative to the root, with extension
    pub name_with_ext: String,
    pub absolute_path: PathBuf,
    /// The directory root this file was found under
    pub source_dir: PathBuf,
}

impl RecipeFile {
    pub fn new(
        name: impl Into<String>,
        name_with_ext: impl Into<String>,
        absolute_path: impl Into<PathBuf>,
        source_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            name_with_ext: name_with_ext.into(),
            absolute_path: absolute_path.into(),
            source_dir: source_dir.into(),
        }
    }

    /// Returns the extension priority (lower is higher priority).
    ///
    /// Returns `usize::MAX` if the extension is not recognized.
    pub fn extension_priority(&self) -> usize {
        RECIPE_EXTENSIONS
            .iter()
            .position(|ext| self.name_with_ext.ends_with(ext))
            .unwrap_or(usize::MAX)
    }
}

/// Where a registered recipe came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeSource {
    Builtin,
    Inline(String),
    File { path: PathBuf, dir: PathBuf },
}

impl std::fmt::Display for RecipeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecipeSource::Builtin => f.write_str("built-in"),
            RecipeSource::Inline(origin) => write!(f, "inline ({})", origin),
            RecipeSource::File { path, .. } => write!(f, "{}", path.display()),
        }
    }
}

/// Error type for recipe loading.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Two recipe directories define the same recipe.
    #[error(
        "recipe collision detected for \"{name}\":\n  - {} (from {})\n  - {} (from {})",
        .existing_path.display(),
        .existing_dir.display(),
        .conflicting_path.display(),
        .conflicting_dir.display()
    )]
    Collision {
        name: String,
        existing_path: PathBuf,
        existing_dir: PathBuf,
        conflicting_path: PathBuf,
        conflicting_dir: PathBuf,
    },

    #[error("recipe not found: \"{name}\"")]
    NotFound { name: String },

    #[error("failed to read \"{}\": {message}", .path.display())]
    ReadError { path: PathBuf, message: String },

    /// The source isn't well-formed YAML, or doesn't match the recipe schema.
    #[error("failed to parse recipe from {origin}: {message}")]
    Parse { origin: String, message: String },

    /// The recipe parsed but failed validation.
    #[error("invalid recipe in {origin}: {source}")]
    Invalid {
        origin: String,
        #[source]
        source: RecipeError,
    },
}

/// Validated recipes by name.
///
/// Names are the recipes' `className`s. Iteration is in name order.
#[derive(Debug, Clone, Default)]
pub struct RecipeRegistry {
    recipes: BTreeMap<String, Recipe>,
    sources: HashMap<String, RecipeSource>,
}

impl RecipeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in component recipes.
    ///
    /// # Errors
    ///
    /// Fails only if an embedded recipe is broken.
    pub fn builtin() -> Result<Self, LoadError> {
        let mut registry = Self::new();
        for (file, yaml) in BUILTIN_RECIPES {
            let recipe = parse_recipe(file, yaml)?;
            registry.insert(recipe, RecipeSource::Builtin);
        }
        tracing::debug!(count = registry.len(), "loaded built-in recipes");
        Ok(registry)
    }

    /// Parses, validates and registers a recipe from a YAML string.
    ///
    /// `origin` names the source in error messages. A recipe with the same
    /// name is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Parse`] for malformed YAML and
    /// [`LoadError::Invalid`] for recipes that fail validation.
    pub fn add_yaml(&mut self, origin: &str, yaml: &str) -> Result<&Recipe, LoadError> {
        let recipe = parse_recipe(origin, yaml)?;
        let name = recipe.name().to_string();
        self.insert(recipe, RecipeSource::Inline(origin.to_string()));
        self.get(&name)
    }

    /// Reads and registers recipes discovered by a directory scan.
    ///
    /// Files are processed in extension priority order, so a `.yml` file is
    /// skipped when a `.yaml` file with the same base name exists in the
    /// same directory.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Collision`] when a recipe name is already
    /// provided by another file, and [`LoadError::ReadError`],
    /// [`LoadError::Parse`] or [`LoadError::Invalid`] for individual files.
    pub fn add_from_files(&mut self, files: Vec<RecipeFile>) -> Result<(), LoadError> {
        let mut sorted_files = files;
        sorted_files.sort_by(|a, b| {
            (a.extension_priority(), &a.name).cmp(&(b.extension_priority(), &b.name))
        });

        let mut seen: HashMap<(PathBuf, String), PathBuf> = HashMap::new();
        for file in sorted_files {
            let key = (file.source_dir.clone(), file.name.clone());
            if let Some(kept) = seen.get(&key) {
                tracing::debug!(
                    skipped = %file.absolute_path.display(),
                    kept = %kept.display(),
                    "lower priority extension ignored"
                );
                continue;
            }
            seen.insert(key, file.absolute_path.clone());

            let yaml = std::fs::read_to_string(&file.absolute_path).map_err(|e| {
                LoadError::ReadError {
                    path: file.absolute_path.clone(),
                    message: e.to_string(),
                }
            })?;
            let origin = file.absolute_path.display().to_string();
            let recipe = parse_recipe(&origin, &yaml)?;

            if let Some(RecipeSource::File { path, dir }) = self.sources.get(recipe.name()) {
                if path != &file.absolute_path {
                    return Err(LoadError::Collision {
                        name: recipe.name().to_string(),
                        existing_path: path.clone(),
                        existing_dir: dir.clone(),
                        conflicting_path: file.absolute_path,
                        conflicting_dir: file.source_dir,
                    });
                }
            }

            tracing::debug!(recipe = recipe.name(), path = %origin, "loaded recipe file");
            self.insert(
                recipe,
                RecipeSource::File {
                    path: file.absolute_path,
                    dir: file.source_dir,
                },
            );
        }

        Ok(())
    }

    /// Walks `root` and registers every recipe file under it.
    ///
    /// # Errors
    ///
    /// See [`add_from_files`](Self::add_from_files); a directory that can't
    /// be read is a [`LoadError::ReadError`].
    pub fn add_from_dir(&mut self, root: impl AsRef<Path>) -> Result<(), LoadError> {
        let root = root.as_ref();
        let files = walk_recipe_dir(root).map_err(|e| LoadError::ReadError {
            path: root.to_path_buf(),
            message: e.to_string(),
        })?;
        self.add_from_files(files)
    }

    /// Looks up a recipe by name.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::NotFound`] if no recipe has that name.
    pub fn get(&self, name: &str) -> Result<&Recipe, LoadError> {
        self.recipes.get(name).ok_or_else(|| LoadError::NotFound {
            name: name.to_string(),
        })
    }

    /// Where the named recipe was loaded from.
    pub fn source(&self, name: &str) -> Option<&RecipeSource> {
        self.sources.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.recipes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.values()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    fn insert(&mut self, recipe: Recipe, source: RecipeSource) {
        let name = recipe.name().to_string();
        self.sources.insert(name.clone(), source);
        self.recipes.insert(name, recipe);
    }
}

fn parse_recipe(origin: &str, yaml: &str) -> Result<Recipe, LoadError> {
    let def: RecipeDef = serde_yaml::from_str(yaml).map_err(|e| LoadError::Parse {
        origin: origin.to_string(),
        message: e.to_string(),
    })?;
    Recipe::from_def(def).map_err(|source| LoadError::Invalid {
        origin: origin.to_string(),
        source,
    })
}

/// Walks a recipe directory recursively and collects recipe files.
///
/// The result is unsorted.
///
/// # Errors
///
/// Returns an error if the directory cannot be read or traversed.
pub fn walk_recipe_dir(root: impl AsRef<Path>) -> Result<Vec<RecipeFile>, std::io::Error> {
    let root_canonical = root.as_ref().canonicalize()?;
    let mut files = Vec::new();
    walk_dir_recursive(&root_canonical, &root_canonical, &mut files)?;
    Ok(files)
}

fn walk_dir_recursive(
    current: &Path,
    root: &Path,
    files: &mut Vec<RecipeFile>,
) -> Result<(), std::io::Error> {
    for entry in std::fs::read_dir(current)? {
        let path = entry?.path();
        if path.is_dir() {
            walk_dir_recursive(&path, root, files)?;
        } else if let Some(file) = try_parse_recipe_file(&path, root) {
            files.push(file);
        }
    }
    Ok(())
}

fn try_parse_recipe_file(path: &Path, root: &Path) -> Option<RecipeFile> {
    let path_str = path.to_string_lossy();
    let extension = RECIPE_EXTENSIONS
        .iter()
        .find(|ext| path_str.ends_with(*ext))?;

    let relative = path.strip_prefix(root).ok()?;
    let name_with_ext = relative
        .to_string_lossy()
        .replace(std::path::MAIN_SEPARATOR, "/");
    let name = name_with_ext.strip_suffix(extension)?.to_string();

    Some(RecipeFile::new(name, name_with_ext, path, root))
}
