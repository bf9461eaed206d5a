use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::any::Any;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use super::{demo, recipes, todos, ApiError, AppState};
use crate::sink::SharedSink;

/// The `/api` routes, without state or middleware.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/demo", get(demo::demo))
        .route("/todos", get(todos::list_todos).post(todos::create_todo))
        .route(
            "/todos/{id}",
            get(todos::get_todo)
                .patch(todos::update_todo)
                .delete(todos::delete_todo),
        )
        .route("/recipes", get(recipes::list_recipes))
        .route("/recipes/{name}", get(recipes::resolve_recipe))
}

/// The complete application.
pub fn app(state: AppState) -> Router {
    let sink = state.sink.clone();
    let router = Router::new().nest("/api", api_routes()).with_state(state);
    with_layers(router, sink)
}

/// Adds request tracing and turns handler panics into 500 responses
/// reported to `sink`.
pub fn with_layers(router: Router, sink: SharedSink) -> Router {
    router
        .layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send + 'static>| {
            sink.unhandled(&panic_message(panic.as_ref()));
            panic_response()
        }))
        .layer(TraceLayer::new_for_http())
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "handler panicked".to_string()
    }
}

fn panic_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::new("internal server error")),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("boom"));
        assert_eq!(panic_message(owned.as_ref()), "boom");

        let borrowed: Box<dyn Any + Send> = Box::new("static boom");
        assert_eq!(panic_message(borrowed.as_ref()), "static boom");

        let other: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(other.as_ref()), "handler panicked");
    }
}
