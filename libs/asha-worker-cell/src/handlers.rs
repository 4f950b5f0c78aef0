use axum::{
    extract::{Extension, State},
    Json,
};
use axum_extra::extract::WithRejection;
use serde_json::{json, Value};
use tracing::debug;

use appointment_cell::models::DelegatedBookingRequest;
use appointment_cell::services::BookingEngine;
use appointment_cell::AppointmentState;
use profile_cell::ProfileRef;
use shared_models::auth::{Role, User};
use shared_models::error::AppError;
use shared_utils::policy::authorize;

/// Patients onboarded by the calling ASHA worker.
#[axum::debug_handler]
pub async fn get_my_managed_patients(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let principal = authorize(&user, &[Role::AshaWorker])?;

    let asha_id = match state.profiles.resolve(&principal).await? {
        ProfileRef::AshaWorker(id) => id,
        ProfileRef::Doctor(_) | ProfileRef::Patient(_) | ProfileRef::Pharmacist(_) => {
            return Err(AppError::Forbidden("Caller is not an ASHA worker".to_string()));
        }
    };

    let patients = state.profiles.managed_patients(asha_id).await?;

    debug!("ASHA worker {} manages {} patients", asha_id, patients.len());
    Ok(Json(json!(patients)))
}

/// Book a slot on behalf of a patient.
#[axum::debug_handler]
pub async fn book_for_patient(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
    WithRejection(Json(request), _): WithRejection<Json<DelegatedBookingRequest>, AppError>,
) -> Result<Json<Value>, AppError> {
    let principal = authorize(&user, &[Role::AshaWorker])?;

    let record = BookingEngine::new(&state)
        .book_for_patient(&principal, request.appointment_id, request.patient_id)
        .await?;

    Ok(Json(json!(record)))
}
