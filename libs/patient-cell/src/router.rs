use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_utils::extractor::auth_middleware;
use shared_utils::AppState;

use crate::handlers;

pub fn patient_routes(state: Arc<AppState>) -> Router {
    let public_routes = Router::new().route("/", post(handlers::register_patient));

    let protected_routes = Router::new()
        .route("/me", get(handlers::get_current_patient))
        .route("/appointments", get(handlers::get_patient_appointments))
        .route("/appointments/filter", get(handlers::filter_patient_appointments))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
