use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use chrono::Utc;
use mockall::mock;
use mockall::predicate::eq;
use uuid::Uuid;

use appointment_cell::models::{AppointmentError, CreateSlotRequest};
use appointment_cell::services::{BookingEngine, InMemorySlotRepository, SlotRepository};
use profile_cell::{DoctorProfile, PatientProfile, ProfileError, ProfileRef, ProfileStore};
use shared_models::auth::{Principal, Role};

mock! {
    pub Profiles {}

    #[async_trait]
    impl ProfileStore for Profiles {
        async fn resolve(&self, principal: &Principal) -> Result<ProfileRef, ProfileError>;
        async fn get_doctor(&self, doctor_id: Uuid) -> Result<Option<DoctorProfile>, ProfileError>;
        async fn get_patient(&self, patient_id: Uuid) -> Result<Option<PatientProfile>, ProfileError>;
        async fn managed_patients(&self, asha_worker_id: Uuid) -> Result<Vec<PatientProfile>, ProfileError>;
    }
}

fn engine_with(profiles: MockProfiles, restricted: bool) -> BookingEngine {
    let profiles: Arc<dyn ProfileStore> = Arc::new(profiles);
    let slots: Arc<dyn SlotRepository> = Arc::new(InMemorySlotRepository::new(Arc::clone(&profiles)));
    BookingEngine::with_parts(slots, profiles, restricted)
}

fn principal(role: Role) -> Principal {
    Principal { id: Uuid::new_v4().to_string(), role }
}

#[tokio::test]
async fn test_profile_lookup_failure_propagates() {
    let mut profiles = MockProfiles::new();
    profiles
        .expect_resolve()
        .returning(|_| Err(ProfileError::DatabaseError("connection reset".to_string())));

    let engine = engine_with(profiles, false);
    let result = engine
        .create_slot(&principal(Role::Doctor), CreateSlotRequest { scheduled_at: Utc::now(), doctor_id: None })
        .await;

    assert_matches!(result, Err(AppointmentError::Profile(ProfileError::DatabaseError(_))));
}

#[tokio::test]
async fn test_missing_profile_surfaces_as_profile_not_found() {
    let mut profiles = MockProfiles::new();
    profiles.expect_resolve().returning(|p| {
        Err(ProfileError::ProfileNotFound { role: p.role, user_id: p.id.clone() })
    });

    let engine = engine_with(profiles, false);
    let result = engine
        .create_slot(&principal(Role::Doctor), CreateSlotRequest { scheduled_at: Utc::now(), doctor_id: None })
        .await;

    assert_matches!(result, Err(AppointmentError::Profile(ProfileError::ProfileNotFound { role: Role::Doctor, .. })));
}

#[tokio::test]
async fn test_doctor_slot_uses_resolved_profile_id() {
    let own_id = Uuid::new_v4();
    let mut profiles = MockProfiles::new();
    profiles.expect_resolve().returning(move |_| Ok(ProfileRef::Doctor(own_id)));
    profiles.expect_get_doctor().with(eq(own_id)).times(1).returning(move |id| {
        Ok(Some(DoctorProfile {
            id,
            user_id: "doctor-user".to_string(),
            full_name: "Dr. Rao".to_string(),
            specialization: None,
        }))
    });

    let engine = engine_with(profiles, false);
    let slot = engine
        .create_slot(&principal(Role::Doctor), CreateSlotRequest {
            scheduled_at: Utc::now(),
            doctor_id: Some(Uuid::new_v4()),
        })
        .await
        .unwrap();

    assert_eq!(slot.doctor_id, own_id);
}

#[tokio::test]
async fn test_asha_validation_happens_before_any_doctor_lookup() {
    let mut profiles = MockProfiles::new();
    profiles.expect_resolve().returning(|_| Ok(ProfileRef::AshaWorker(Uuid::new_v4())));
    profiles.expect_get_doctor().never();

    let engine = engine_with(profiles, false);
    let result = engine
        .create_slot(&principal(Role::AshaWorker), CreateSlotRequest { scheduled_at: Utc::now(), doctor_id: None })
        .await;

    assert_matches!(result, Err(AppointmentError::ValidationError(_)));
}

#[tokio::test]
async fn test_restricted_delegation_checks_manager_before_touching_slot() {
    let asha_id = Uuid::new_v4();
    let patient_id = Uuid::new_v4();

    let mut profiles = MockProfiles::new();
    profiles.expect_resolve().returning(move |_| Ok(ProfileRef::AshaWorker(asha_id)));
    profiles.expect_get_patient().with(eq(patient_id)).returning(|id| {
        Ok(Some(PatientProfile {
            id,
            user_id: "patient-user".to_string(),
            full_name: "Priya".to_string(),
            date_of_birth: None,
            managed_by: Some(Uuid::new_v4()),
        }))
    });

    let engine = engine_with(profiles, true);
    // The slot does not exist; the ownership check must reject first.
    let result = engine
        .book_for_patient(&principal(Role::AshaWorker), Uuid::new_v4(), patient_id)
        .await;

    assert_matches!(result, Err(AppointmentError::Forbidden(_)));
}
