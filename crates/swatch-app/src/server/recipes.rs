//! Recipe listing and resolution.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;
use swatch::{LoadError, Recipe, ResolvedStyle, Selection};

use super::{err, ApiResult, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub axes: BTreeMap<String, Vec<String>>,
    pub slots: Vec<String>,
    pub default_variants: BTreeMap<String, String>,
}

impl From<&Recipe> for RecipeSummary {
    fn from(recipe: &Recipe) -> Self {
        Self {
            name: recipe.name().to_string(),
            description: recipe.description().map(str::to_string),
            axes: recipe
                .axes()
                .iter()
                .map(|axis| {
                    let values = axis.values().map(str::to_string).collect();
                    (axis.name().to_string(), values)
                })
                .collect(),
            slots: recipe.slots().to_vec(),
            default_variants: recipe.defaults().clone(),
        }
    }
}

/// List the loaded recipes
pub async fn list_recipes(State(state): State<AppState>) -> ApiResult<Vec<RecipeSummary>> {
    Ok(Json(state.recipes.iter().map(RecipeSummary::from).collect()))
}

/// Resolve a recipe; each query parameter selects an axis value
pub async fn resolve_recipe(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<BTreeMap<String, String>>,
) -> ApiResult<ResolvedStyle> {
    let recipe = state.recipes.get(&name).map_err(|e| match e {
        LoadError::NotFound { .. } => err(StatusCode::NOT_FOUND, e.to_string()),
        other => err(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    })?;

    let mut selection = Selection::new();
    for (axis, value) in params {
        selection.set(axis, value);
    }

    recipe.resolve(&selection).map(Json).map_err(|e| {
        tracing::debug!(recipe = %name, error = %e, "rejected selection");
        err(StatusCode::BAD_REQUEST, e.to_string())
    })
}
