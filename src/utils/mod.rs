//! Utility modules shared across the negotiation pipeline.

pub mod date;
pub mod slug;
