//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use tokoku_core::{Email, UserId};

/// A Tokoku account (domain type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Name shown in the dashboard.
    pub display_name: String,
    /// Avatar URL.
    pub photo_url: Option<String>,
    /// Google account subject, when linked.
    pub google_sub: Option<String>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
