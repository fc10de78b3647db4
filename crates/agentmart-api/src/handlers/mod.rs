//! API Handlers
//!
//! Each module handles one group of storefront endpoints.

pub mod agents;
pub mod chat;
pub mod health;
pub mod history;
pub mod jobs;
pub mod orchestrate;
