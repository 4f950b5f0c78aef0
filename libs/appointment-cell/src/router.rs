// libs/appointment-cell/src/router.rs
use axum::{
    Router,
    routing::{get, post},
    middleware,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::state::AppointmentState;

pub fn appointment_routes(state: AppointmentState) -> Router {
    // All slot operations require authentication
    let protected_routes = Router::new()
        .route("/", post(handlers::create_slot))
        .route("/available", get(handlers::list_available_slots))
        .route("/doctor/me", get(handlers::get_doctor_schedule))
        .route("/doctor/{doctor_id}/available", get(handlers::list_doctor_available_slots))
        .route("/patient/me", get(handlers::get_patient_schedule))
        .route("/{appointment_id}", get(handlers::get_slot))
        .route("/{appointment_id}/book", post(handlers::book_slot))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
