use serde::Deserialize;

/// `object` value carried by every WhatsApp Business webhook delivery.
pub const WHATSAPP_OBJECT: &str = "whatsapp_business_account";

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub entry: Vec<WebhookEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct WebhookEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub changes: Vec<WebhookChange>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct WebhookChange {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub value: ChangeValue,
}

/// Status receipts arrive in `statuses` with no `messages`; they are acknowledged and dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub messages: Vec<RawMessage>,
    #[serde(default)]
    pub statuses: Vec<serde_json::Value>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RawMessage {
    #[serde(default)]
    pub id: String,
    pub from: String,
    #[serde(rename = "type", default)]
    pub message_type: String,
    #[serde(default)]
    pub text: Option<TextBody>,
    #[serde(default)]
    pub interactive: Option<InteractiveReply>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TextBody {
    pub body: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct InteractiveReply {
    #[serde(rename = "type")]
    pub reply_type: String,
    #[serde(default)]
    pub button_reply: Option<ReplyRef>,
    #[serde(default)]
    pub list_reply: Option<ReplyRef>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ReplyRef {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
}

impl WebhookPayload {
    pub fn is_whatsapp(&self) -> bool {
        self.object == WHATSAPP_OBJECT
    }

    /// Every customer message in the delivery, in payload order.
    pub fn messages(&self) -> Vec<InboundMessage> {
        self.entry
            .iter()
            .flat_map(|entry| entry.changes.iter())
            .flat_map(|change| change.value.messages.iter())
            .map(InboundMessage::from_raw)
            .collect()
    }

    pub fn status_count(&self) -> usize {
        self.entry
            .iter()
            .flat_map(|entry| entry.changes.iter())
            .map(|change| change.value.statuses.len())
            .sum()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundMessage {
    pub message_id: String,
    pub from: String,
    pub kind: InboundMessageKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundMessageKind {
    Text(String),
    ButtonReply { id: String, title: Option<String> },
    ListReply { id: String, title: Option<String> },
    Unsupported { message_type: String },
}

impl InboundMessage {
    pub fn from_raw(raw: &RawMessage) -> Self {
        let kind = match (raw.message_type.as_str(), &raw.text, &raw.interactive) {
            ("text", Some(text), _) => InboundMessageKind::Text(text.body.clone()),
            ("interactive", _, Some(interactive)) => interactive_kind(interactive),
            (other, _, _) => InboundMessageKind::Unsupported { message_type: other.to_string() },
        };

        Self { message_id: raw.id.clone(), from: raw.from.clone(), kind }
    }

    /// Token the dialogue matches on: trimmed lowercase text, or the reply id
    /// as sent. Unsupported kinds yield an empty token.
    pub fn token(&self) -> String {
        match &self.kind {
            InboundMessageKind::Text(body) => body.trim().to_lowercase(),
            InboundMessageKind::ButtonReply { id, .. }
            | InboundMessageKind::ListReply { id, .. } => id.clone(),
            InboundMessageKind::Unsupported { .. } => String::new(),
        }
    }

    pub fn kind_label(&self) -> &str {
        match &self.kind {
            InboundMessageKind::Text(_) => "text",
            InboundMessageKind::ButtonReply { .. } => "button_reply",
            InboundMessageKind::ListReply { .. } => "list_reply",
            InboundMessageKind::Unsupported { message_type } => message_type,
        }
    }
}

fn interactive_kind(interactive: &InteractiveReply) -> InboundMessageKind {
    match (interactive.reply_type.as_str(), &interactive.button_reply, &interactive.list_reply) {
        ("button_reply", Some(reply), _) => {
            InboundMessageKind::ButtonReply { id: reply.id.clone(), title: reply.title.clone() }
        }
        ("list_reply", _, Some(reply)) => {
            InboundMessageKind::ListReply { id: reply.id.clone(), title: reply.title.clone() }
        }
        (other, _, _) => {
            InboundMessageKind::Unsupported { message_type: format!("interactive.{other}") }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{InboundMessageKind, WebhookPayload};

    fn payload(message: serde_json::Value) -> WebhookPayload {
        serde_json::from_value(json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "102290129340398",
                "changes": [{
                    "field": "messages",
                    "value": {
                        "messaging_product": "whatsapp",
                        "metadata": { "phone_number_id": "846227168563844" },
                        "messages": [message]
                    }
                }]
            }]
        }))
        .expect("decode payload")
    }

    #[test]
    fn text_messages_are_trimmed_and_lowercased() {
        let payload = payload(json!({
            "from": "919812345678",
            "id": "wamid.A1",
            "type": "text",
            "text": { "body": "  Hi There  " }
        }));

        assert!(payload.is_whatsapp());
        let messages = payload.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].from, "919812345678");
        assert_eq!(messages[0].message_id, "wamid.A1");
        assert_eq!(messages[0].token(), "hi there");
    }

    #[test]
    fn interactive_replies_yield_their_ids_unchanged() {
        let button = payload(json!({
            "from": "919812345678",
            "id": "wamid.B1",
            "type": "interactive",
            "interactive": {
                "type": "button_reply",
                "button_reply": { "id": "browse_spaces", "title": "Browse Spaces" }
            }
        }));
        let list = payload(json!({
            "from": "919812345678",
            "id": "wamid.L1",
            "type": "interactive",
            "interactive": {
                "type": "list_reply",
                "list_reply": { "id": "New_Delhi", "title": "New Delhi" }
            }
        }));

        let button = button.messages().remove(0);
        assert!(matches!(button.kind, InboundMessageKind::ButtonReply { .. }));
        assert_eq!(button.token(), "browse_spaces");
        assert_eq!(button.kind_label(), "button_reply");

        assert_eq!(list.messages()[0].token(), "New_Delhi");
    }

    #[test]
    fn unsupported_messages_carry_an_empty_token() {
        let payload = payload(json!({
            "from": "919812345678",
            "id": "wamid.I1",
            "type": "image",
            "image": { "id": "media-1" }
        }));

        let message = payload.messages().remove(0);
        assert_eq!(message.kind_label(), "image");
        assert_eq!(message.token(), "");
    }

    #[test]
    fn status_receipts_have_no_messages() {
        let payload: WebhookPayload = serde_json::from_value(json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "changes": [{
                    "value": { "statuses": [{ "id": "wamid.S1", "status": "delivered" }] }
                }]
            }]
        }))
        .expect("decode payload");

        assert!(payload.messages().is_empty());
        assert_eq!(payload.status_count(), 1);
    }

    #[test]
    fn other_objects_are_not_whatsapp() {
        let payload: WebhookPayload =
            serde_json::from_value(json!({ "object": "page", "entry": [] })).expect("decode");
        assert!(!payload.is_whatsapp());
    }
}
