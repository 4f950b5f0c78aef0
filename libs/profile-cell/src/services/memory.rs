use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use shared_models::auth::{Principal, Role};

use crate::models::{
    AshaWorkerProfile, DoctorProfile, PatientProfile, PharmacistProfile, ProfileError, ProfileRef,
    ProfileSeed,
};
use crate::services::store::ProfileStore;

#[derive(Default)]
struct Profiles {
    doctors: HashMap<Uuid, DoctorProfile>,
    patients: HashMap<Uuid, PatientProfile>,
    pharmacists: HashMap<Uuid, PharmacistProfile>,
    asha_workers: HashMap<Uuid, AshaWorkerProfile>,
}

/// Process-local profile store, used for local runs and tests.
#[derive(Default)]
pub struct InMemoryProfileStore {
    inner: RwLock<Profiles>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `seed`. A patient's `managed_by` must name a seeded ASHA worker.
    pub fn from_seed(seed: ProfileSeed) -> Result<Self, ProfileError> {
        let asha_workers: HashMap<Uuid, AshaWorkerProfile> =
            seed.asha_workers.into_iter().map(|p| (p.id, p)).collect();

        if let Some(orphan) = seed.patients.iter().find(|p| {
            p.managed_by.is_some_and(|asha_id| !asha_workers.contains_key(&asha_id))
        }) {
            return Err(ProfileError::InvalidSeed(format!(
                "patient {} is managed by an unknown ASHA worker",
                orphan.id
            )));
        }

        let profiles = Profiles {
            doctors: seed.doctors.into_iter().map(|p| (p.id, p)).collect(),
            patients: seed.patients.into_iter().map(|p| (p.id, p)).collect(),
            pharmacists: seed.pharmacists.into_iter().map(|p| (p.id, p)).collect(),
            asha_workers,
        };

        info!(
            "Seeded in-memory profiles: {} doctors, {} patients, {} pharmacists, {} ASHA workers",
            profiles.doctors.len(),
            profiles.patients.len(),
            profiles.pharmacists.len(),
            profiles.asha_workers.len()
        );

        Ok(Self { inner: RwLock::new(profiles) })
    }

    pub async fn add_doctor(&self, user_id: &str, full_name: &str, specialization: Option<&str>) -> DoctorProfile {
        let profile = DoctorProfile {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            full_name: full_name.to_string(),
            specialization: specialization.map(str::to_string),
        };
        self.inner.write().await.doctors.insert(profile.id, profile.clone());
        profile
    }

    pub async fn add_patient(&self, user_id: &str, full_name: &str, managed_by: Option<Uuid>) -> PatientProfile {
        let profile = PatientProfile {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            full_name: full_name.to_string(),
            date_of_birth: None,
            managed_by,
        };
        self.inner.write().await.patients.insert(profile.id, profile.clone());
        profile
    }

    pub async fn add_pharmacist(&self, user_id: &str, full_name: &str, pharmacy_name: Option<&str>) -> PharmacistProfile {
        let profile = PharmacistProfile {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            full_name: full_name.to_string(),
            pharmacy_name: pharmacy_name.map(str::to_string),
        };
        self.inner.write().await.pharmacists.insert(profile.id, profile.clone());
        profile
    }

    pub async fn add_asha_worker(&self, user_id: &str, full_name: &str, village_assigned: Option<&str>) -> AshaWorkerProfile {
        let profile = AshaWorkerProfile {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            full_name: full_name.to_string(),
            village_assigned: village_assigned.map(str::to_string),
        };
        self.inner.write().await.asha_workers.insert(profile.id, profile.clone());
        profile
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn resolve(&self, principal: &Principal) -> Result<ProfileRef, ProfileError> {
        let profiles = self.inner.read().await;
        let user_id = principal.id.as_str();

        let found = match principal.role {
            Role::Doctor => profiles.doctors.values()
                .find(|p| p.user_id == user_id)
                .map(|p| ProfileRef::Doctor(p.id)),
            Role::Patient => profiles.patients.values()
                .find(|p| p.user_id == user_id)
                .map(|p| ProfileRef::Patient(p.id)),
            Role::Pharmacist => profiles.pharmacists.values()
                .find(|p| p.user_id == user_id)
                .map(|p| ProfileRef::Pharmacist(p.id)),
            Role::AshaWorker => profiles.asha_workers.values()
                .find(|p| p.user_id == user_id)
                .map(|p| ProfileRef::AshaWorker(p.id)),
        };

        found.ok_or_else(|| ProfileError::ProfileNotFound {
            role: principal.role,
            user_id: principal.id.clone(),
        })
    }

    async fn get_doctor(&self, doctor_id: Uuid) -> Result<Option<DoctorProfile>, ProfileError> {
        Ok(self.inner.read().await.doctors.get(&doctor_id).cloned())
    }

    async fn get_patient(&self, patient_id: Uuid) -> Result<Option<PatientProfile>, ProfileError> {
        Ok(self.inner.read().await.patients.get(&patient_id).cloned())
    }

    async fn managed_patients(&self, asha_worker_id: Uuid) -> Result<Vec<PatientProfile>, ProfileError> {
        let mut patients: Vec<PatientProfile> = self.inner.read().await
            .patients
            .values()
            .filter(|p| p.is_managed_by(asha_worker_id))
            .cloned()
            .collect();
        patients.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(patients)
    }
}
