// libs/appointment-cell/src/services/memory.rs
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use profile_cell::ProfileStore;

use crate::models::{AppointmentError, AppointmentSlot};
use crate::services::repository::SlotRepository;

/// Process-local slot store.
///
/// Every mutation runs under the write guard, which is dropped on every exit
/// path; reads run under the read guard and so always see whole transitions.
pub struct InMemorySlotRepository {
    slots: RwLock<HashMap<Uuid, AppointmentSlot>>,
    profiles: Arc<dyn ProfileStore>,
}

impl InMemorySlotRepository {
    pub fn new(profiles: Arc<dyn ProfileStore>) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            profiles,
        }
    }

    async fn select<F>(&self, predicate: F) -> Vec<AppointmentSlot>
    where
        F: Fn(&AppointmentSlot) -> bool + Send,
    {
        let slots = self.slots.read().await;
        let mut selected: Vec<AppointmentSlot> = slots
            .values()
            .filter(|slot| predicate(slot))
            .cloned()
            .collect();
        selected.sort_by(|a, b| a.scheduled_at.cmp(&b.scheduled_at).then(a.id.cmp(&b.id)));
        selected
    }
}

#[async_trait]
impl SlotRepository for InMemorySlotRepository {
    async fn create(&self, doctor_id: Uuid, scheduled_at: DateTime<Utc>) -> Result<AppointmentSlot, AppointmentError> {
        if !self.profiles.doctor_exists(doctor_id).await? {
            return Err(AppointmentError::DoctorNotFound);
        }

        let slot = AppointmentSlot::new(doctor_id, scheduled_at);
        self.slots.write().await.insert(slot.id, slot.clone());

        info!("Created slot {} for doctor {} at {}", slot.id, doctor_id, scheduled_at);
        Ok(slot)
    }

    async fn get(&self, slot_id: Uuid) -> Result<AppointmentSlot, AppointmentError> {
        self.slots.read().await
            .get(&slot_id)
            .cloned()
            .ok_or(AppointmentError::NotFound)
    }

    async fn list_available(&self, doctor_id: Option<Uuid>) -> Result<Vec<AppointmentSlot>, AppointmentError> {
        Ok(self.select(|slot| {
            slot.is_available() && doctor_id.map_or(true, |id| slot.doctor_id == id)
        }).await)
    }

    async fn list_for_doctor(&self, doctor_id: Uuid) -> Result<Vec<AppointmentSlot>, AppointmentError> {
        Ok(self.select(|slot| slot.doctor_id == doctor_id).await)
    }

    async fn list_for_patient(&self, patient_id: Uuid) -> Result<Vec<AppointmentSlot>, AppointmentError> {
        Ok(self.select(|slot| slot.patient_id == Some(patient_id)).await)
    }

    async fn try_book(&self, slot_id: Uuid, patient_id: Uuid) -> Result<AppointmentSlot, AppointmentError> {
        let mut slots = self.slots.write().await;
        let slot = slots.get_mut(&slot_id).ok_or(AppointmentError::NotFound)?;

        if !slot.is_available() {
            return Err(AppointmentError::SlotAlreadyBooked);
        }

        slot.mark_booked(patient_id);
        Ok(slot.clone())
    }
}
