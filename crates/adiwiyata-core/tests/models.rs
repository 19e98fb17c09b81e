use adiwiyata_core::models::attachment::Attachment;
use adiwiyata_core::models::chat::{ChatRole, ChatTurn, Part, SYSTEM_INSTRUCTION};
use adiwiyata_core::models::message::{DisplayMessage, Sender};

#[test]
fn attachment_data_uri_decodes_to_original_bytes() {
    let bytes: Vec<u8> = (0u8..=255).chain([0x89, b'P', b'N', b'G']).collect();
    let attachment = Attachment::from_bytes(&bytes, "image/png");

    let uri = attachment.data_uri();
    assert!(uri.starts_with("data:image/png;base64,"));

    let parsed = Attachment::from_data_uri(&uri).unwrap();
    assert_eq!(parsed.mime_type, "image/png");
    assert_eq!(parsed.decode().unwrap(), bytes);
}

#[test]
fn malformed_data_uris_are_rejected() {
    assert!(Attachment::from_data_uri("image/png;base64,AAAA").is_err());
    assert!(Attachment::from_data_uri("data:image/png;base64").is_err());
    assert!(Attachment::from_data_uri("data:image/png,AAAA").is_err());
    assert!(Attachment::from_data_uri("data:image/png;base64,!!!").is_err());
}

#[test]
fn only_images_count_as_images() {
    assert!(Attachment::from_bytes(b"x", "image/jpeg").is_image());
    assert!(!Attachment::from_bytes(b"x", "application/pdf").is_image());
}

#[test]
fn seed_turn_carries_system_instruction() {
    let seed = ChatTurn::seed();
    assert_eq!(seed.role, ChatRole::User);
    assert_eq!(seed.first_text(), Some(SYSTEM_INSTRUCTION));
}

#[test]
fn turn_serializes_in_endpoint_shape() {
    let attachment = Attachment::from_bytes(b"abc", "image/png");
    let turn = ChatTurn::new(ChatRole::User, vec![Part::text("Halo"), attachment.to_part()]);

    let json = serde_json::to_value(&turn).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "role": "user",
            "parts": [
                { "text": "Halo" },
                { "inline_data": { "data": "YWJj", "mime_type": "image/png" } }
            ]
        })
    );
}

#[test]
fn camel_case_inline_data_is_accepted() {
    let part: Part = serde_json::from_value(serde_json::json!({
        "inlineData": { "data": "YWJj", "mimeType": "image/png" }
    }))
    .unwrap();

    match part {
        Part::InlineData { inline_data } => assert_eq!(inline_data.mime_type, "image/png"),
        other => panic!("expected inline data, got {other:?}"),
    }
}

#[test]
fn display_messages_get_distinct_ids() {
    let a = DisplayMessage::new(Sender::User, "a", None, "10:00");
    let b = DisplayMessage::new(Sender::User, "a", None, "10:00");
    assert_ne!(a.id, b.id);
    assert!(a.is_user());
}
