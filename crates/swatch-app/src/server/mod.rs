//! HTTP API.
//!
//! | Route                         | Handler                        |
//! |-------------------------------|--------------------------------|
//! | `GET /api/demo`               | [`demo::demo`]                 |
//! | `GET, POST /api/todos`        | [`todos`] list and create      |
//! | `GET, PATCH, DELETE /api/todos/{id}` | [`todos`] single todo   |
//! | `GET /api/recipes`            | [`recipes::list_recipes`]      |
//! | `GET /api/recipes/{name}`     | [`recipes::resolve_recipe`]    |

pub mod demo;
pub mod recipes;
mod routes;
pub mod state;
pub mod todos;

use axum::{http::StatusCode, Json};
use serde::Serialize;
use std::net::SocketAddr;

pub use routes::{api_routes, app, with_layers};
pub use state::AppState;

/// Error body returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

pub(crate) type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

pub(crate) fn err(status: StatusCode, msg: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (status, Json(ApiError::new(msg)))
}

/// Binds `addr` and serves the API until the process is stopped.
pub async fn serve(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        environment = %state.settings.environment,
        "swatch server listening"
    );
    axum::serve(listener, app(state)).await
}
