pub mod handlers;
pub mod router;

pub use router::asha_worker_routes;
