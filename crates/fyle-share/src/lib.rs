//! Document sharing between peers.
//!
//! Defines the JSON payload exchanged with nearby devices and the export and
//! import paths between that payload and the store. The carrier that moves
//! payload bytes between devices lives outside this crate.

pub mod exchange;
pub mod types;

pub use exchange::ShareExchange;
pub use types::*;
