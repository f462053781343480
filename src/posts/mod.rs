pub mod dto;
mod form;
pub mod handlers;
pub mod moderation;
pub mod nearby;
pub mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::write_routes())
        .merge(handlers::admin_routes())
}
