//! Repository implementations

mod history;
mod user;

pub use history::HistoryRepo;
pub use user::UserRepo;
