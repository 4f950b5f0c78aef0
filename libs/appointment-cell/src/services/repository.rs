// libs/appointment-cell/src/services/repository.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::{as_supabase_error, SupabaseClient};

use crate::models::{AppointmentError, AppointmentSlot, SlotStatus};

/// Durable store of appointment slots.
///
/// `try_book` is the only operation that writes `status` or `patient_id`, and
/// it performs the availability check and the write as one atomic step.
#[async_trait]
pub trait SlotRepository: Send + Sync {
    /// Insert a new available slot. Fails with `DoctorNotFound` for an unknown doctor.
    async fn create(&self, doctor_id: Uuid, scheduled_at: DateTime<Utc>) -> Result<AppointmentSlot, AppointmentError>;

    async fn get(&self, slot_id: Uuid) -> Result<AppointmentSlot, AppointmentError>;

    /// Available slots ordered by `scheduled_at`, optionally for one doctor.
    async fn list_available(&self, doctor_id: Option<Uuid>) -> Result<Vec<AppointmentSlot>, AppointmentError>;

    async fn list_for_doctor(&self, doctor_id: Uuid) -> Result<Vec<AppointmentSlot>, AppointmentError>;

    async fn list_for_patient(&self, patient_id: Uuid) -> Result<Vec<AppointmentSlot>, AppointmentError>;

    /// Move the slot from available to booked for `patient_id`.
    ///
    /// Exactly one of any number of concurrent calls for the same slot
    /// succeeds; every other call gets `SlotAlreadyBooked`.
    async fn try_book(&self, slot_id: Uuid, patient_id: Uuid) -> Result<AppointmentSlot, AppointmentError>;
}

const SLOTS_TABLE: &str = "/rest/v1/appointment_slots";

/// Slots in the Supabase `appointment_slots` table, accessed with the service role.
pub struct SupabaseSlotRepository {
    supabase: SupabaseClient,
    service_token: String,
}

impl SupabaseSlotRepository {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            service_token: config.supabase_service_role_key.clone(),
        }
    }

    async fn fetch(&self, query: &str) -> Result<Vec<AppointmentSlot>, AppointmentError> {
        let path = format!("{}?{}", SLOTS_TABLE, query);
        let rows: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(&self.service_token),
            None,
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        parse_slots(rows)
    }
}

fn parse_slots(rows: Vec<Value>) -> Result<Vec<AppointmentSlot>, AppointmentError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row)
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse slot: {}", e))))
        .collect()
}

#[async_trait]
impl SlotRepository for SupabaseSlotRepository {
    async fn create(&self, doctor_id: Uuid, scheduled_at: DateTime<Utc>) -> Result<AppointmentSlot, AppointmentError> {
        let slot = AppointmentSlot::new(doctor_id, scheduled_at);
        let body = json!({
            "id": slot.id,
            "doctor_id": slot.doctor_id,
            "patient_id": null,
            "scheduled_at": slot.scheduled_at.to_rfc3339(),
            "status": SlotStatus::Available,
            "created_at": slot.created_at.to_rfc3339(),
            "updated_at": slot.updated_at.to_rfc3339()
        });

        let rows: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            SLOTS_TABLE,
            Some(&self.service_token),
            Some(body),
            Some(SupabaseClient::return_representation()),
        ).await.map_err(|e| match as_supabase_error(&e) {
            Some(err) if err.is_foreign_key_violation() => AppointmentError::DoctorNotFound,
            _ => AppointmentError::DatabaseError(e.to_string()),
        })?;

        let created = parse_slots(rows)?
            .into_iter()
            .next()
            .ok_or_else(|| AppointmentError::DatabaseError("Insert returned no slot".to_string()))?;

        info!("Created slot {} for doctor {} at {}", created.id, doctor_id, created.scheduled_at);
        Ok(created)
    }

    async fn get(&self, slot_id: Uuid) -> Result<AppointmentSlot, AppointmentError> {
        debug!("Fetching slot {}", slot_id);
        self.fetch(&format!("id=eq.{}", slot_id)).await?
            .into_iter()
            .next()
            .ok_or(AppointmentError::NotFound)
    }

    async fn list_available(&self, doctor_id: Option<Uuid>) -> Result<Vec<AppointmentSlot>, AppointmentError> {
        let mut query = String::from("status=eq.available");
        if let Some(doctor_id) = doctor_id {
            query.push_str(&format!("&doctor_id=eq.{}", doctor_id));
        }
        query.push_str("&order=scheduled_at.asc,id.asc");
        self.fetch(&query).await
    }

    async fn list_for_doctor(&self, doctor_id: Uuid) -> Result<Vec<AppointmentSlot>, AppointmentError> {
        self.fetch(&format!("doctor_id=eq.{}&order=scheduled_at.asc,id.asc", doctor_id)).await
    }

    async fn list_for_patient(&self, patient_id: Uuid) -> Result<Vec<AppointmentSlot>, AppointmentError> {
        self.fetch(&format!("patient_id=eq.{}&order=scheduled_at.asc,id.asc", patient_id)).await
    }

    async fn try_book(&self, slot_id: Uuid, patient_id: Uuid) -> Result<AppointmentSlot, AppointmentError> {
        // Single conditional UPDATE: the status filter is re-checked under the row lock.
        let path = format!("{}?id=eq.{}&status=eq.available", SLOTS_TABLE, slot_id);
        let body = json!({
            "patient_id": patient_id,
            "status": SlotStatus::Booked,
            "updated_at": Utc::now().to_rfc3339()
        });

        let rows: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(&self.service_token),
            Some(body),
            Some(SupabaseClient::return_representation()),
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        if let Some(booked) = parse_slots(rows)?.into_iter().next() {
            return Ok(booked);
        }

        // Nothing matched: either the slot is missing or it was not available.
        self.get(slot_id).await?;
        Err(AppointmentError::SlotAlreadyBooked)
    }
}
