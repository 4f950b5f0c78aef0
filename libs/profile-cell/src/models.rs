use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use chrono::NaiveDate;

use shared_models::auth::Role;
use shared_models::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub id: Uuid,
    pub user_id: String,
    pub full_name: String,
    pub specialization: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    pub id: Uuid,
    pub user_id: String,
    pub full_name: String,
    pub date_of_birth: Option<NaiveDate>,
    /// ASHA worker profile that onboarded this patient; `None` when self-registered.
    pub managed_by: Option<Uuid>,
}

impl PatientProfile {
    pub fn is_managed_by(&self, asha_worker_id: Uuid) -> bool {
        self.managed_by == Some(asha_worker_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PharmacistProfile {
    pub id: Uuid,
    pub user_id: String,
    pub full_name: String,
    pub pharmacy_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AshaWorkerProfile {
    pub id: Uuid,
    pub user_id: String,
    pub full_name: String,
    pub village_assigned: Option<String>,
}

/// The role-specific profile a principal resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "profile_id", rename_all = "snake_case")]
pub enum ProfileRef {
    Doctor(Uuid),
    Patient(Uuid),
    Pharmacist(Uuid),
    AshaWorker(Uuid),
}

impl ProfileRef {
    pub fn id(&self) -> Uuid {
        match *self {
            ProfileRef::Doctor(id)
            | ProfileRef::Patient(id)
            | ProfileRef::Pharmacist(id)
            | ProfileRef::AshaWorker(id) => id,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            ProfileRef::Doctor(_) => Role::Doctor,
            ProfileRef::Patient(_) => Role::Patient,
            ProfileRef::Pharmacist(_) => Role::Pharmacist,
            ProfileRef::AshaWorker(_) => Role::AshaWorker,
        }
    }
}

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("No {role} profile for user {user_id}")]
    ProfileNotFound { role: Role, user_id: String },

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid profile seed: {0}")]
    InvalidSeed(String),
}

impl From<ProfileError> for AppError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::ProfileNotFound { .. } => AppError::NotFound(err.to_string()),
            ProfileError::DatabaseError(msg) => AppError::Database(msg),
            ProfileError::InvalidSeed(msg) => AppError::Internal(msg),
        }
    }
}

/// Initial contents of the in-memory profile store, read from `PROFILE_SEED_FILE`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileSeed {
    #[serde(default)]
    pub doctors: Vec<DoctorProfile>,
    #[serde(default)]
    pub patients: Vec<PatientProfile>,
    #[serde(default)]
    pub pharmacists: Vec<PharmacistProfile>,
    #[serde(default)]
    pub asha_workers: Vec<AshaWorkerProfile>,
}

impl ProfileSeed {
    pub fn from_json(json: &str) -> Result<Self, ProfileError> {
        serde_json::from_str(json).map_err(|e| ProfileError::InvalidSeed(e.to_string()))
    }

    pub fn from_file(path: &str) -> Result<Self, ProfileError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ProfileError::InvalidSeed(format!("{}: {}", path, e)))?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_ref_serializes_with_role_tag() {
        let id = Uuid::new_v4();
        let value = serde_json::to_value(ProfileRef::AshaWorker(id)).unwrap();

        assert_eq!(value, json!({ "role": "asha_worker", "profile_id": id }));
        assert_eq!(ProfileRef::AshaWorker(id).role(), Role::AshaWorker);
        assert_eq!(ProfileRef::AshaWorker(id).id(), id);
    }

    #[test]
    fn test_is_managed_by() {
        let asha = Uuid::new_v4();
        let patient = PatientProfile {
            id: Uuid::new_v4(),
            user_id: "u".to_string(),
            full_name: "P".to_string(),
            date_of_birth: None,
            managed_by: Some(asha),
        };

        assert!(patient.is_managed_by(asha));
        assert!(!patient.is_managed_by(Uuid::new_v4()));
    }
}
