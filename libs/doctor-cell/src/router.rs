use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_utils::extractor::auth_middleware;
use shared_utils::AppState;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppState>) -> Router {
    // Public directory
    let public_routes = Router::new()
        .route("/", get(handlers::list_doctors))
        .route("/filter", get(handlers::filter_doctors))
        .route("/{doctor_id}", get(handlers::get_doctor));

    // Authenticated; admin-only checks happen in the handlers
    let protected_routes = Router::new()
        .route("/", post(handlers::create_doctor))
        .route(
            "/{doctor_id}",
            put(handlers::update_doctor).delete(handlers::delete_doctor),
        )
        .route("/{doctor_id}/availability", get(handlers::get_doctor_availability))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
