// libs/appointment-cell/src/models.rs
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::fmt;

use profile_cell::ProfileError;
use shared_models::error::AppError;

// ==============================================================================
// CORE SLOT MODELS
// ==============================================================================

/// A bookable appointment slot owned by one doctor.
///
/// `status == Booked` holds exactly when `patient_id` is set. Values of this
/// type are snapshots; stored slots only change through
/// [`SlotRepository::try_book`](crate::services::repository::SlotRepository::try_book).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentSlot {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Option<Uuid>,
    pub scheduled_at: DateTime<Utc>,
    pub status: SlotStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AppointmentSlot {
    pub fn new(doctor_id: Uuid, scheduled_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            doctor_id,
            patient_id: None,
            scheduled_at,
            status: SlotStatus::Available,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == SlotStatus::Available
    }

    pub(crate) fn mark_booked(&mut self, patient_id: Uuid) {
        self.patient_id = Some(patient_id);
        self.status = SlotStatus::Booked;
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Available,
    Booked,
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotStatus::Available => write!(f, "available"),
            SlotStatus::Booked => write!(f, "booked"),
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

/// Body of `POST /appointments`.
///
/// Doctors create slots for themselves and `doctor_id` is ignored; ASHA
/// workers must name the doctor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSlotRequest {
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub doctor_id: Option<Uuid>,
}

/// Optional body of `POST /appointments/{id}/book`; ASHA workers name the patient.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookSlotRequest {
    #[serde(default)]
    pub patient_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelegatedBookingRequest {
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
}

/// Outcome of a delegated booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRecord {
    pub appointment_id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub status: SlotStatus,
    /// ASHA worker profile that made the booking.
    pub booked_by: Uuid,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailableSlotsQuery {
    pub doctor_id: Option<Uuid>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("Appointment slot not found")]
    NotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Patient not found")]
    PatientNotFound,

    #[error("Appointment slot is already booked")]
    SlotAlreadyBooked,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound
            | AppointmentError::DoctorNotFound
            | AppointmentError::PatientNotFound => AppError::NotFound(err.to_string()),
            AppointmentError::SlotAlreadyBooked => AppError::BadRequest(err.to_string()),
            AppointmentError::ValidationError(msg) => AppError::ValidationError(msg),
            AppointmentError::Forbidden(msg) => AppError::Forbidden(msg),
            AppointmentError::Profile(profile_err) => profile_err.into(),
            AppointmentError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
