use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::{Principal, Role};

use crate::models::{DoctorProfile, PatientProfile, ProfileError, ProfileRef};
use crate::services::store::ProfileStore;

#[derive(Deserialize)]
struct IdRow {
    id: Uuid,
}

/// Profiles stored in the `doctors`, `patients`, `pharmacists` and `asha_workers` tables.
pub struct SupabaseProfileStore {
    supabase: SupabaseClient,
    service_token: String,
}

impl SupabaseProfileStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            service_token: config.supabase_service_role_key.clone(),
        }
    }

    fn table_for(role: Role) -> &'static str {
        match role {
            Role::Doctor => "doctors",
            Role::Patient => "patients",
            Role::Pharmacist => "pharmacists",
            Role::AshaWorker => "asha_workers",
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ProfileError> {
        let rows: Vec<Value> = self.supabase.request(
            Method::GET,
            path,
            Some(&self.service_token),
            None,
        ).await.map_err(|e| ProfileError::DatabaseError(e.to_string()))?;

        rows.into_iter()
            .map(|row| serde_json::from_value(row)
                .map_err(|e| ProfileError::DatabaseError(format!("Failed to parse profile: {}", e))))
            .collect()
    }
}

#[async_trait]
impl ProfileStore for SupabaseProfileStore {
    async fn resolve(&self, principal: &Principal) -> Result<ProfileRef, ProfileError> {
        debug!("Resolving {} profile for user {}", principal.role, principal.id);

        let path = format!(
            "/rest/v1/{}?user_id=eq.{}&select=id",
            Self::table_for(principal.role),
            principal.id
        );
        let row = self.fetch::<IdRow>(&path).await?
            .into_iter()
            .next()
            .ok_or_else(|| ProfileError::ProfileNotFound {
                role: principal.role,
                user_id: principal.id.clone(),
            })?;

        Ok(match principal.role {
            Role::Doctor => ProfileRef::Doctor(row.id),
            Role::Patient => ProfileRef::Patient(row.id),
            Role::Pharmacist => ProfileRef::Pharmacist(row.id),
            Role::AshaWorker => ProfileRef::AshaWorker(row.id),
        })
    }

    async fn get_doctor(&self, doctor_id: Uuid) -> Result<Option<DoctorProfile>, ProfileError> {
        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        Ok(self.fetch(&path).await?.into_iter().next())
    }

    async fn get_patient(&self, patient_id: Uuid) -> Result<Option<PatientProfile>, ProfileError> {
        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        Ok(self.fetch(&path).await?.into_iter().next())
    }

    async fn managed_patients(&self, asha_worker_id: Uuid) -> Result<Vec<PatientProfile>, ProfileError> {
        debug!("Fetching patients managed by ASHA worker {}", asha_worker_id);

        let path = format!("/rest/v1/patients?managed_by=eq.{}&order=full_name.asc", asha_worker_id);
        self.fetch(&path).await
    }
}
