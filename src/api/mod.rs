// API layer module (adapters for controllers)
// Follows Hexagonal Architecture - API is an adapter

pub mod errors;
pub mod handlers;
pub mod params;
pub mod router;
pub mod state;

pub use router::app;
pub use state::AppState;
