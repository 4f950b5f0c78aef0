// libs/appointment-cell/src/state.rs
use std::sync::Arc;

use tracing::{info, warn};

use profile_cell::{InMemoryProfileStore, ProfileError, ProfileSeed, ProfileStore, SupabaseProfileStore};
use shared_config::{AppConfig, StoreBackend};

use crate::services::{InMemorySlotRepository, SlotRepository, SupabaseSlotRepository};

/// Shared handles for the appointment and ASHA worker routes.
#[derive(Clone)]
pub struct AppointmentState {
    pub config: Arc<AppConfig>,
    pub slots: Arc<dyn SlotRepository>,
    pub profiles: Arc<dyn ProfileStore>,
}

impl AppointmentState {
    pub fn new(
        config: Arc<AppConfig>,
        slots: Arc<dyn SlotRepository>,
        profiles: Arc<dyn ProfileStore>,
    ) -> Self {
        Self { config, slots, profiles }
    }

    /// Build the stores selected by `SLOT_STORE` and `PROFILE_STORE`.
    ///
    /// The in-memory profile store is loaded from `PROFILE_SEED_FILE`; a bad
    /// seed file fails startup.
    pub fn from_config(config: Arc<AppConfig>) -> Result<Self, ProfileError> {
        let profiles: Arc<dyn ProfileStore> = match config.profile_store {
            StoreBackend::Supabase => Arc::new(SupabaseProfileStore::new(&config)),
            StoreBackend::Memory => match config.profile_seed_file.as_deref() {
                Some(path) => Arc::new(InMemoryProfileStore::from_seed(ProfileSeed::from_file(path)?)?),
                None => {
                    warn!("PROFILE_STORE=memory without PROFILE_SEED_FILE: no profiles, every caller resolves to 404");
                    Arc::new(InMemoryProfileStore::new())
                }
            },
        };

        let slots: Arc<dyn SlotRepository> = match config.slot_store {
            StoreBackend::Supabase => Arc::new(SupabaseSlotRepository::new(&config)),
            StoreBackend::Memory => Arc::new(InMemorySlotRepository::new(Arc::clone(&profiles))),
        };

        info!(
            "Appointment stores: slots={:?}, profiles={:?}, restricted delegated booking={}",
            config.slot_store, config.profile_store, config.restrict_delegated_booking
        );

        Ok(Self::new(config, slots, profiles))
    }
}
