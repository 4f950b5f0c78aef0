use axum::{
    Router,
    routing::get,
};

use appointment_cell::{appointment_routes, AppointmentState};
use asha_worker_cell::asha_worker_routes;
use auth_cell::{auth_routes, AuthState};

pub fn create_router(state: AppointmentState) -> Router {
    let auth_state = AuthState::new(state.config.clone(), state.profiles.clone());

    Router::new()
        .route("/", get(|| async { "CareLink API is running!" }))
        .nest("/auth", auth_routes(auth_state))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/asha_worker", asha_worker_routes(state))
}
