// libs/appointment-cell/src/handlers.rs
use axum::{
    body::Bytes,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::{Role, User};
use shared_models::error::AppError;
use shared_utils::policy::authorize;

use crate::models::{AvailableSlotsQuery, BookSlotRequest, CreateSlotRequest};
use crate::services::{BookingEngine, QueryService};
use crate::state::AppointmentState;

const ANY_ROLE: &[Role] = &[Role::Doctor, Role::Patient, Role::Pharmacist, Role::AshaWorker];

// ==============================================================================
// SLOT CREATION & BOOKING
// ==============================================================================

#[axum::debug_handler]
pub async fn create_slot(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
    WithRejection(Json(request), _): WithRejection<Json<CreateSlotRequest>, AppError>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let principal = authorize(&user, &[Role::Doctor, Role::AshaWorker])?;

    let slot = BookingEngine::new(&state)
        .create_slot(&principal, request)
        .await?;

    Ok((StatusCode::CREATED, Json(json!(slot))))
}

/// Body is optional: patients send nothing, ASHA workers send `{"patient_id": ...}`.
#[axum::debug_handler]
pub async fn book_slot(
    State(state): State<AppointmentState>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let principal = authorize(&user, &[Role::Patient, Role::AshaWorker])?;

    let request: BookSlotRequest = if body.is_empty() {
        BookSlotRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::ValidationError(format!("Invalid booking request: {}", e)))?
    };

    let slot = BookingEngine::new(&state)
        .book_for_self(&principal, appointment_id, request)
        .await?;

    Ok(Json(json!(slot)))
}

// ==============================================================================
// QUERIES
// ==============================================================================

#[axum::debug_handler]
pub async fn list_available_slots(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
    Query(query): Query<AvailableSlotsQuery>,
) -> Result<Json<Value>, AppError> {
    authorize(&user, ANY_ROLE)?;

    let slots = QueryService::new(&state)
        .available_slots(query.doctor_id)
        .await?;

    Ok(Json(json!(slots)))
}

#[axum::debug_handler]
pub async fn list_doctor_available_slots(
    State(state): State<AppointmentState>,
    Path(doctor_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    authorize(&user, ANY_ROLE)?;

    let slots = QueryService::new(&state)
        .available_slots(Some(doctor_id))
        .await?;

    Ok(Json(json!(slots)))
}

#[axum::debug_handler]
pub async fn get_slot(
    State(state): State<AppointmentState>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    authorize(&user, ANY_ROLE)?;

    let slot = QueryService::new(&state).get_slot(appointment_id).await?;

    Ok(Json(json!(slot)))
}

#[axum::debug_handler]
pub async fn get_doctor_schedule(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let principal = authorize(&user, &[Role::Doctor])?;

    let slots = QueryService::new(&state).doctor_schedule(&principal).await?;

    Ok(Json(json!(slots)))
}

#[axum::debug_handler]
pub async fn get_patient_schedule(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let principal = authorize(&user, &[Role::Patient, Role::AshaWorker])?;

    let slots = QueryService::new(&state).patient_schedule(&principal).await?;

    Ok(Json(json!(slots)))
}
