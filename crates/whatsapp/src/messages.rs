use serde::Serialize;
use serde_json::{json, Value};

/// Reply buttons the Cloud API renders per message.
pub const MAX_REPLY_BUTTONS: usize = 3;
pub const MAX_BUTTON_TITLE_CHARS: usize = 20;
pub const MAX_ROW_TITLE_CHARS: usize = 24;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReplyButton {
    pub id: String,
    pub title: String,
}

impl ReplyButton {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self { id: id.into(), title: title.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ListRow {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ListRow {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self { id: id.into(), title: title.into(), description: None }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ListSection {
    pub title: String,
    pub rows: Vec<ListRow>,
}

impl ListSection {
    pub fn new(title: impl Into<String>, rows: Vec<ListRow>) -> Self {
        Self { title: title.into(), rows }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessageBody {
    Text { body: String },
    Buttons { body: String, buttons: Vec<ReplyButton> },
    List { body: String, button: String, sections: Vec<ListSection> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundMessage {
    pub to: String,
    pub body: MessageBody,
}

impl OutboundMessage {
    pub fn text(to: impl Into<String>, body: impl Into<String>) -> Self {
        Self { to: to.into(), body: MessageBody::Text { body: body.into() } }
    }

    pub fn buttons(
        to: impl Into<String>,
        body: impl Into<String>,
        buttons: Vec<ReplyButton>,
    ) -> Self {
        Self { to: to.into(), body: MessageBody::Buttons { body: body.into(), buttons } }
    }

    pub fn list(
        to: impl Into<String>,
        body: impl Into<String>,
        button: impl Into<String>,
        sections: Vec<ListSection>,
    ) -> Self {
        Self {
            to: to.into(),
            body: MessageBody::List { body: body.into(), button: button.into(), sections },
        }
    }

    pub fn body_text(&self) -> &str {
        match &self.body {
            MessageBody::Text { body }
            | MessageBody::Buttons { body, .. }
            | MessageBody::List { body, .. } => body,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self.body {
            MessageBody::Text { .. } => "text",
            MessageBody::Buttons { .. } => "buttons",
            MessageBody::List { .. } => "list",
        }
    }

    /// Ids a customer can reply with: button ids or list row ids.
    pub fn reply_ids(&self) -> Vec<&str> {
        match &self.body {
            MessageBody::Text { .. } => Vec::new(),
            MessageBody::Buttons { buttons, .. } => {
                buttons.iter().take(MAX_REPLY_BUTTONS).map(|button| button.id.as_str()).collect()
            }
            MessageBody::List { sections, .. } => sections
                .iter()
                .flat_map(|section| section.rows.iter())
                .map(|row| row.id.as_str())
                .collect(),
        }
    }

    /// Request body for `POST /{version}/{phone_number_id}/messages`.
    ///
    /// Buttons beyond the third are dropped and button titles are cut to 20 characters.
    pub fn to_cloud_api_payload(&self) -> Value {
        match &self.body {
            MessageBody::Text { body } => json!({
                "messaging_product": "whatsapp",
                "to": self.to,
                "type": "text",
                "text": { "body": body },
            }),
            MessageBody::Buttons { body, buttons } => {
                let buttons = buttons
                    .iter()
                    .take(MAX_REPLY_BUTTONS)
                    .map(|button| {
                        json!({
                            "type": "reply",
                            "reply": {
                                "id": button.id,
                                "title": truncate_chars(&button.title, MAX_BUTTON_TITLE_CHARS),
                            },
                        })
                    })
                    .collect::<Vec<_>>();
                json!({
                    "messaging_product": "whatsapp",
                    "to": self.to,
                    "type": "interactive",
                    "interactive": {
                        "type": "button",
                        "body": { "text": body },
                        "action": { "buttons": buttons },
                    },
                })
            }
            MessageBody::List { body, button, sections } => json!({
                "messaging_product": "whatsapp",
                "to": self.to,
                "type": "interactive",
                "interactive": {
                    "type": "list",
                    "body": { "text": body },
                    "action": { "button": button, "sections": sections },
                },
            }),
        }
    }
}

/// Cuts on character boundaries, never inside a multi-byte code point.
pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}
