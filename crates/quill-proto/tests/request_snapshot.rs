//! Snapshot of the outbound request wire shape.

use quill_proto::{ChatMode, ChatRequest, Correlation, ModelId};

#[test]
fn chat_request_wire_shape() {
    let request = ChatRequest::new(
        "Summarize this paragraph",
        ModelId::ClaudeSonnet4,
        ChatMode::Chat,
        Correlation::default(),
    );

    insta::assert_json_snapshot!(request, @r#"
    {
      "name": "chat_message",
      "message": {
        "content": "Summarize this paragraph",
        "role": "user"
      },
      "model": "claude-sonnet-4",
      "mode": "chat",
      "block_ids": "234234234AWEFAWEF",
      "document_id": "AWEFAWE3453453453",
      "chat_id": "34234DFAWFA",
      "user_id": "23423423AWEFAWEFAWEF"
    }
    "#);
}
