use async_trait::async_trait;
use uuid::Uuid;

use shared_models::auth::Principal;

use crate::models::{DoctorProfile, PatientProfile, ProfileError, ProfileRef};

/// Read access to the role profiles behind authenticated users.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Resolve the profile belonging to `principal`; the variant always matches its role.
    async fn resolve(&self, principal: &Principal) -> Result<ProfileRef, ProfileError>;

    async fn get_doctor(&self, doctor_id: Uuid) -> Result<Option<DoctorProfile>, ProfileError>;

    async fn get_patient(&self, patient_id: Uuid) -> Result<Option<PatientProfile>, ProfileError>;

    async fn managed_patients(&self, asha_worker_id: Uuid) -> Result<Vec<PatientProfile>, ProfileError>;

    async fn doctor_exists(&self, doctor_id: Uuid) -> Result<bool, ProfileError> {
        Ok(self.get_doctor(doctor_id).await?.is_some())
    }
}
