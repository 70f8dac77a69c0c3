//! Chat assistant sessions and messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ChatMessageId, ChatRole, ChatSessionId, UserId};
use crate::validation::ValidationError;

/// Longest message a user may send.
pub const MAX_MESSAGE_LENGTH: usize = 8_000;

const MAX_TITLE_LENGTH: usize = 50;

/// A conversation with the assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: ChatSessionId,
    pub user_id: UserId,
    /// Set from the first user message.
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    /// Title shown in the session list.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Percakapan baru")
    }
}

/// One message in a session. Messages are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: ChatMessageId,
    pub session_id: ChatSessionId,
    pub role: ChatRole,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Sort messages into conversation order.
pub fn sort_oldest_first(messages: &mut [ChatMessage]) {
    messages.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then(a.id.as_i32().cmp(&b.id.as_i32()))
    });
}

/// Sort sessions most recently active first.
pub fn sort_recent_first(sessions: &mut [ChatSession]) {
    sessions.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then(b.id.as_i32().cmp(&a.id.as_i32()))
    });
}

/// Trim a message and enforce length limits.
///
/// # Errors
///
/// Returns [`ValidationError`] for blank or oversized messages.
pub fn validate_message(text: &str) -> Result<String, ValidationError> {
    crate::validation::required_text("message", text, MAX_MESSAGE_LENGTH)
}

/// Session title from the first user message.
///
/// Messages longer than 50 characters are cut at the last word boundary
/// and get an ellipsis.
#[must_use]
pub fn generate_title(message: &str) -> String {
    let trimmed = message.trim();
    if trimmed.chars().count() <= MAX_TITLE_LENGTH {
        return trimmed.to_owned();
    }

    let truncated: String = trimmed.chars().take(MAX_TITLE_LENGTH).collect();
    match truncated.rfind(' ') {
        Some(space) if space > 0 => {
            let head = truncated.get(..space).unwrap_or(&truncated);
            format!("{}...", head.trim_end())
        }
        _ => format!("{truncated}..."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_title_short() {
        assert_eq!(generate_title("  Ide promo bulan puasa  "), "Ide promo bulan puasa");
    }

    #[test]
    fn test_generate_title_breaks_at_word() {
        let title = generate_title(
            "Bagaimana cara meningkatkan penjualan keripik pisang di marketplace saat akhir tahun?",
        );
        assert!(title.ends_with("..."));
        assert!(title.chars().count() <= MAX_TITLE_LENGTH + 3);
        assert!(!title.trim_end_matches("...").ends_with(' '));
    }

    #[test]
    fn test_generate_title_multibyte_safe() {
        let title = generate_title(&"é".repeat(80));
        assert_eq!(title.chars().count(), MAX_TITLE_LENGTH + 3);
    }

    #[test]
    fn test_validate_message() {
        assert_eq!(validate_message(" halo "), Ok("halo".to_owned()));
        assert!(validate_message("   ").is_err());
    }
}
