//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use tokoku_core::{Email, UserId};

use super::user::User;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user and
/// render the navigation bar without a database round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Name shown in the navigation bar.
    pub display_name: String,
    /// Avatar URL (from Google sign-in).
    pub photo_url: Option<String>,
}

impl CurrentUser {
    /// Up to two initials for the avatar placeholder.
    #[must_use]
    pub fn initials(&self) -> String {
        self.display_name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            photo_url: user.photo_url.clone(),
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the point-of-sale cart.
    pub const CART: &str = "cart";

    /// Key for Google OAuth state (CSRF protection).
    pub const GOOGLE_OAUTH_STATE: &str = "google_oauth_state";

    /// Key for Google OAuth nonce (`OpenID` Connect replay protection).
    pub const GOOGLE_OAUTH_NONCE: &str = "google_oauth_nonce";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initials() {
        let user = CurrentUser {
            id: UserId::new(1),
            email: Email::parse("sari@warungsari.id").expect("email"),
            display_name: "sari dewi lestari".to_string(),
            photo_url: None,
        };
        assert_eq!(user.initials(), "SD");
    }
}
