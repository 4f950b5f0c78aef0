use std::env;
use tracing::warn;

/// Backing store for slots and profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Supabase,
    Memory,
}

impl StoreBackend {
    fn from_var(name: &str) -> Self {
        match env::var(name).as_deref() {
            Ok("memory") => StoreBackend::Memory,
            Ok("supabase") | Err(_) => StoreBackend::Supabase,
            Ok(other) => {
                warn!("{} has unknown value '{}', using supabase", name, other);
                StoreBackend::Supabase
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: String,
    pub supabase_jwt_secret: String,
    pub slot_store: StoreBackend,
    pub profile_store: StoreBackend,
    /// JSON file of profiles loaded into the in-memory profile store.
    pub profile_seed_file: Option<String>,
    /// When set, an ASHA worker may only book for patients it manages.
    pub restrict_delegated_booking: bool,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_service_role_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_SERVICE_ROLE_KEY not set, using empty value");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            slot_store: StoreBackend::from_var("SLOT_STORE"),
            profile_store: StoreBackend::from_var("PROFILE_STORE"),
            profile_seed_file: env::var("PROFILE_SEED_FILE").ok().filter(|p| !p.is_empty()),
            restrict_delegated_booking: env::var("RESTRICT_DELEGATED_BOOKING")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        if self.supabase_jwt_secret.is_empty() {
            return false;
        }
        if !self.uses_supabase() {
            return true;
        }
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_service_role_key.is_empty()
    }

    pub fn uses_supabase(&self) -> bool {
        self.slot_store == StoreBackend::Supabase || self.profile_store == StoreBackend::Supabase
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
