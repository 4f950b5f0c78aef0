// libs/appointment-cell/src/services/query.rs
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::debug;
use uuid::Uuid;

use profile_cell::{ProfileRef, ProfileStore};
use shared_models::auth::Principal;

use crate::models::{AppointmentError, AppointmentSlot};
use crate::services::repository::SlotRepository;
use crate::state::AppointmentState;

/// Read-side projections over the slot repository.
pub struct QueryService {
    slots: Arc<dyn SlotRepository>,
    profiles: Arc<dyn ProfileStore>,
}

impl QueryService {
    pub fn new(state: &AppointmentState) -> Self {
        Self::with_parts(Arc::clone(&state.slots), Arc::clone(&state.profiles))
    }

    pub fn with_parts(slots: Arc<dyn SlotRepository>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self { slots, profiles }
    }

    pub async fn available_slots(
        &self,
        doctor_id: Option<Uuid>,
    ) -> Result<Vec<AppointmentSlot>, AppointmentError> {
        if let Some(doctor_id) = doctor_id {
            if !self.profiles.doctor_exists(doctor_id).await? {
                return Err(AppointmentError::DoctorNotFound);
            }
        }

        debug!("Listing available slots (doctor: {:?})", doctor_id);
        self.slots.list_available(doctor_id).await
    }

    pub async fn get_slot(&self, slot_id: Uuid) -> Result<AppointmentSlot, AppointmentError> {
        self.slots.get(slot_id).await
    }

    /// All slots owned by the calling doctor, booked or not.
    pub async fn doctor_schedule(
        &self,
        principal: &Principal,
    ) -> Result<Vec<AppointmentSlot>, AppointmentError> {
        match self.profiles.resolve(principal).await? {
            ProfileRef::Doctor(doctor_id) => self.slots.list_for_doctor(doctor_id).await,
            ProfileRef::Patient(_) | ProfileRef::Pharmacist(_) | ProfileRef::AshaWorker(_) => {
                Err(AppointmentError::Forbidden("Only doctors have a doctor schedule".to_string()))
            }
        }
    }

    /// Booked slots of the calling patient, or of every patient an ASHA worker manages.
    pub async fn patient_schedule(
        &self,
        principal: &Principal,
    ) -> Result<Vec<AppointmentSlot>, AppointmentError> {
        match self.profiles.resolve(principal).await? {
            ProfileRef::Patient(patient_id) => self.slots.list_for_patient(patient_id).await,
            ProfileRef::AshaWorker(asha_id) => {
                let patients = self.profiles.managed_patients(asha_id).await?;
                debug!("Collecting schedules for {} patients of ASHA worker {}", patients.len(), asha_id);

                let schedules = try_join_all(
                    patients.iter().map(|patient| self.slots.list_for_patient(patient.id)),
                ).await?;

                let mut slots: Vec<AppointmentSlot> = schedules.into_iter().flatten().collect();
                slots.sort_by(|a, b| a.scheduled_at.cmp(&b.scheduled_at).then(a.id.cmp(&b.id)));
                Ok(slots)
            }
            ProfileRef::Doctor(_) | ProfileRef::Pharmacist(_) => {
                Err(AppointmentError::Forbidden("Only patients have a patient schedule".to_string()))
            }
        }
    }
}
