//! Request and response bodies
//!
//! Field names follow the storefront's camelCase JSON.

pub mod chat;
pub mod history;
pub mod jobs;
pub mod orchestrate;

pub use chat::*;
pub use history::*;
pub use jobs::*;
pub use orchestrate::*;
