//! The conversation sent to the model for a reply.

use chrono::Duration;
use tokoku_core::chat::{generate_title, sort_oldest_first, validate_message};
use tokoku_core::{ChatMessage, ChatMessageId, ChatRole, ChatSessionId};
use tokoku_integration_tests::fixed_time;
use tokoku_web::gemini::{Content, GenerateContentRequest};
use tokoku_web::services::chat::build_contents;

fn message(id: i32, role: ChatRole, text: &str, minutes: i64) -> ChatMessage {
    ChatMessage {
        id: ChatMessageId::new(id),
        session_id: ChatSessionId::new(7),
        role,
        text: text.to_owned(),
        created_at: fixed_time() + Duration::minutes(minutes),
    }
}

#[test]
fn test_history_matches_rendered_messages_then_pending_text() {
    // Stored out of order; the screen shows them oldest first.
    let mut history = vec![
        message(3, ChatRole::User, "Kalau harga kopi dinaikkan?", 2),
        message(1, ChatRole::User, "Produk apa yang paling laku?", 0),
        message(2, ChatRole::Model, "Kopi Susu paling laku minggu ini.", 1),
        message(4, ChatRole::Model, "Naikkan sedikit, pantau seminggu.", 3),
    ];
    sort_oldest_first(&mut history);

    let contents = build_contents(&history, "Buatkan ide promo akhir pekan");

    let rendered: Vec<(Option<&str>, String)> = history
        .iter()
        .map(|m| (Some(m.role.as_str()), m.text.clone()))
        .chain(std::iter::once((
            Some("user"),
            "Buatkan ide promo akhir pekan".to_owned(),
        )))
        .collect();
    let sent: Vec<(Option<&str>, String)> = contents
        .iter()
        .map(|c| (c.role.as_deref(), c.joined_text()))
        .collect();

    assert_eq!(sent, rendered);
    assert_eq!(contents.len(), 5);
}

#[test]
fn test_first_message_has_no_history() {
    let contents = build_contents(&[], "Halo");
    assert_eq!(contents, [Content::text(ChatRole::User, "Halo")]);
}

#[test]
fn test_request_serializes_roles_and_system_instruction() {
    let history = [message(1, ChatRole::Model, "Halo, ada yang bisa dibantu?", 0)];
    let request = GenerateContentRequest::new(build_contents(&history, "Stok menipis apa saja?"))
        .with_system("Kamu asisten bisnis UMKM.");

    let json = serde_json::to_value(&request).expect("serialize");
    assert_eq!(json["contents"][0]["role"], "model");
    assert_eq!(json["contents"][1]["role"], "user");
    assert_eq!(json["contents"][1]["parts"][0]["text"], "Stok menipis apa saja?");
    assert_eq!(
        json["systemInstruction"]["parts"][0]["text"],
        "Kamu asisten bisnis UMKM."
    );
    assert!(json["systemInstruction"].get("role").is_none());
}

#[test]
fn test_message_validation_and_titles() {
    assert_eq!(validate_message("  halo  ").expect("valid"), "halo");
    assert!(validate_message("   ").is_err());

    assert_eq!(generate_title("Ide promo"), "Ide promo");
    let title = generate_title(
        "Bagaimana cara menaikkan penjualan keripik di bulan puasa tanpa banting harga?",
    );
    assert!(title.ends_with("..."));
    assert!(title.chars().count() <= 53);
}
