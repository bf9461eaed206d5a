//! # swatch-app
//!
//! The `swatch` binary and the HTTP service behind it.
//!
//! - [`cli`]: `check`, `list`, `resolve`, `token`, `serve` and `seed`
//! - [`server`]: axum routes for the demo endpoint, todo CRUD and recipe
//!   resolution
//! - [`store`]: todo persistence on SQLite
//! - [`seed`]: the development seed data
//! - [`sink`]: where uncaught errors and warnings go
//!
//! Runtime settings come from the environment, see [`settings`].

pub mod cli;
pub mod output;
pub mod seed;
pub mod server;
pub mod settings;
pub mod sink;
pub mod store;
pub mod telemetry;

pub use server::AppState;
pub use settings::{Settings, SettingsError};
pub use sink::{ErrorSink, SharedSink, TracingSink};
pub use store::{NewTodo, Priority, StoreError, Todo, TodoPatch, TodoStore};
