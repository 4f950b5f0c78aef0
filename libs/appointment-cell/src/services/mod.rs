pub mod repository;
pub mod memory;
pub mod booking;
pub mod query;

pub use repository::{SlotRepository, SupabaseSlotRepository};
pub use memory::InMemorySlotRepository;
pub use booking::BookingEngine;
pub use query::QueryService;
