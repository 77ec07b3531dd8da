//! Utility modules shared by the converter and the sync pipeline.

pub mod date;
pub mod slug;
