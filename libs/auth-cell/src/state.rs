use std::sync::Arc;

use shared_config::AppConfig;
use profile_cell::ProfileStore;

#[derive(Clone)]
pub struct AuthState {
    pub config: Arc<AppConfig>,
    pub profiles: Arc<dyn ProfileStore>,
}

impl AuthState {
    pub fn new(config: Arc<AppConfig>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self { config, profiles }
    }
}
