//! Fyle server: HTTP API over the document store, extractor, reminders,
//! and share payloads.

pub mod routes;
pub mod state;
pub mod worker;

pub use routes::build_router;
pub use state::AppState;
