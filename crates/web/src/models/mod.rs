//! Domain models owned by the web crate.
//!
//! Inventory, sales, and chat records live in `tokoku-core`; this module
//! holds the account types and what the session stores about them.

pub mod session;
pub mod user;

pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
