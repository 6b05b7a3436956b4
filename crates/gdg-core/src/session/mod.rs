//! Per-user conversation session management

mod store;
mod types;

pub use store::SessionStore;
pub use types::{Session, SessionStats};
