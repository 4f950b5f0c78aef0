// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use profile_cell::{ProfileRef, ProfileStore};
use shared_models::auth::Principal;

use crate::models::{
    AppointmentError, AppointmentSlot, BookSlotRequest, BookingRecord, CreateSlotRequest,
};
use crate::services::repository::SlotRepository;
use crate::state::AppointmentState;

/// Slot creation and the available -> booked transition.
pub struct BookingEngine {
    slots: Arc<dyn SlotRepository>,
    profiles: Arc<dyn ProfileStore>,
    restrict_delegated_booking: bool,
}

impl BookingEngine {
    pub fn new(state: &AppointmentState) -> Self {
        Self::with_parts(
            Arc::clone(&state.slots),
            Arc::clone(&state.profiles),
            state.config.restrict_delegated_booking,
        )
    }

    pub fn with_parts(
        slots: Arc<dyn SlotRepository>,
        profiles: Arc<dyn ProfileStore>,
        restrict_delegated_booking: bool,
    ) -> Self {
        Self {
            slots,
            profiles,
            restrict_delegated_booking,
        }
    }

    /// Create an available slot.
    ///
    /// A doctor always creates for its own profile and any `doctor_id` in the
    /// request is ignored. An ASHA worker must name the doctor.
    pub async fn create_slot(
        &self,
        principal: &Principal,
        request: CreateSlotRequest,
    ) -> Result<AppointmentSlot, AppointmentError> {
        let doctor_id = match self.profiles.resolve(principal).await? {
            ProfileRef::Doctor(own_id) => {
                if request.doctor_id.is_some_and(|requested| requested != own_id) {
                    debug!("Ignoring doctor_id in request from doctor {}", own_id);
                }
                own_id
            }
            ProfileRef::AshaWorker(asha_id) => {
                let doctor_id = request.doctor_id.ok_or_else(|| {
                    AppointmentError::ValidationError(
                        "doctor_id is required when an ASHA worker creates a slot".to_string(),
                    )
                })?;
                debug!("ASHA worker {} creating slot for doctor {}", asha_id, doctor_id);
                doctor_id
            }
            ProfileRef::Patient(_) | ProfileRef::Pharmacist(_) => {
                return Err(AppointmentError::Forbidden(format!(
                    "Role {} cannot create appointment slots",
                    principal.role
                )));
            }
        };

        self.slots.create(doctor_id, request.scheduled_at).await
    }

    /// `POST /appointments/{id}/book`: patients book for themselves, ASHA
    /// workers must name the patient and go through the delegated path.
    pub async fn book_for_self(
        &self,
        principal: &Principal,
        slot_id: Uuid,
        request: BookSlotRequest,
    ) -> Result<AppointmentSlot, AppointmentError> {
        match self.profiles.resolve(principal).await? {
            ProfileRef::Patient(patient_id) => self.try_book(slot_id, patient_id).await,
            ProfileRef::AshaWorker(asha_id) => {
                let patient_id = request.patient_id.ok_or_else(|| {
                    AppointmentError::ValidationError(
                        "patient_id is required when an ASHA worker books a slot".to_string(),
                    )
                })?;
                self.book_delegated(asha_id, slot_id, patient_id).await
            }
            ProfileRef::Doctor(_) | ProfileRef::Pharmacist(_) => Err(AppointmentError::Forbidden(
                format!("Role {} cannot book appointment slots", principal.role),
            )),
        }
    }

    /// Delegated booking by an ASHA worker on behalf of `patient_id`.
    pub async fn book_for_patient(
        &self,
        principal: &Principal,
        slot_id: Uuid,
        patient_id: Uuid,
    ) -> Result<BookingRecord, AppointmentError> {
        let asha_id = match self.profiles.resolve(principal).await? {
            ProfileRef::AshaWorker(asha_id) => asha_id,
            ProfileRef::Doctor(_) | ProfileRef::Patient(_) | ProfileRef::Pharmacist(_) => {
                return Err(AppointmentError::Forbidden(
                    "Only ASHA workers can book on behalf of a patient".to_string(),
                ));
            }
        };

        let slot = self.book_delegated(asha_id, slot_id, patient_id).await?;

        Ok(BookingRecord {
            appointment_id: slot.id,
            doctor_id: slot.doctor_id,
            patient_id,
            scheduled_at: slot.scheduled_at,
            status: slot.status,
            booked_by: asha_id,
        })
    }

    async fn book_delegated(
        &self,
        asha_id: Uuid,
        slot_id: Uuid,
        patient_id: Uuid,
    ) -> Result<AppointmentSlot, AppointmentError> {
        let patient = self.profiles
            .get_patient(patient_id)
            .await?
            .ok_or(AppointmentError::PatientNotFound)?;

        if !patient.is_managed_by(asha_id) {
            if self.restrict_delegated_booking {
                warn!("ASHA worker {} denied booking for unmanaged patient {}", asha_id, patient_id);
                return Err(AppointmentError::Forbidden(
                    "Patient is not managed by this ASHA worker".to_string(),
                ));
            }
            warn!("ASHA worker {} booking for unmanaged patient {}", asha_id, patient_id);
        }

        info!("ASHA worker {} booking slot {} for patient {}", asha_id, slot_id, patient_id);
        self.try_book(slot_id, patient.id).await
    }

    /// Book `slot_id` for `patient_id`. Not idempotent: a second attempt by
    /// the same patient is a conflict too. Conflicts are never retried here.
    pub async fn try_book(
        &self,
        slot_id: Uuid,
        patient_id: Uuid,
    ) -> Result<AppointmentSlot, AppointmentError> {
        debug!("Patient {} attempting to book slot {}", patient_id, slot_id);

        match self.slots.try_book(slot_id, patient_id).await {
            Ok(slot) => {
                info!("Slot {} booked by patient {}", slot.id, patient_id);
                Ok(slot)
            }
            Err(AppointmentError::SlotAlreadyBooked) => {
                warn!("Patient {} lost slot {}: already booked", patient_id, slot_id);
                Err(AppointmentError::SlotAlreadyBooked)
            }
            Err(e) => Err(e),
        }
    }
}
