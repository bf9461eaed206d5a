use std::sync::Arc;

use swatch::RecipeRegistry;

use crate::settings::Settings;
use crate::sink::SharedSink;
use crate::store::TodoStore;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: TodoStore,
    pub recipes: Arc<RecipeRegistry>,
    pub settings: Arc<Settings>,
    pub sink: SharedSink,
}

impl AppState {
    pub fn new(
        store: TodoStore,
        recipes: RecipeRegistry,
        settings: Settings,
        sink: SharedSink,
    ) -> Self {
        Self {
            store,
            recipes: Arc::new(recipes),
            settings: Arc::new(settings),
            sink,
        }
    }
}
