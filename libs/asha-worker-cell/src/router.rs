use axum::{
    Router,
    routing::{get, post},
    middleware,
};

use appointment_cell::AppointmentState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn asha_worker_routes(state: AppointmentState) -> Router {
    let protected_routes = Router::new()
        .route("/me/patients", get(handlers::get_my_managed_patients))
        .route("/book-for-patient", post(handlers::book_for_patient))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
