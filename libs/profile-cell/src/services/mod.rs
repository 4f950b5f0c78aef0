pub mod store;
pub mod supabase;
pub mod memory;

pub use store::ProfileStore;
pub use supabase::SupabaseProfileStore;
pub use memory::InMemoryProfileStore;
