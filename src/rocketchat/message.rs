use serde::{Deserialize, Serialize};

/// A chat message: one line of text followed by attachments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub fields: Vec<AttachmentField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentField {
    pub title: String,
    pub value: String,
    /// Rendered inline next to other short fields
    #[serde(default)]
    pub short: bool,
}

/// Body of `chat.postMessage`.
#[derive(Debug, Serialize)]
pub struct PostMessageRequest<'a> {
    pub channel: &'a str,
    #[serde(flatten)]
    pub message: &'a ChatMessage,
}

impl ChatMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachments: Vec::new(),
        }
    }

    pub fn add_attachment(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }
}

impl AttachmentField {
    pub fn new(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            short: false,
        }
    }

    pub fn short(mut self) -> Self {
        self.short = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_post_message_request_shape() {
        let mut message = ChatMessage::new("hello");
        message.add_attachment(Attachment {
            fields: vec![AttachmentField::new("Label", "1.2").short()],
        });

        let body = serde_json::to_value(PostMessageRequest {
            channel: "#ci",
            message: &message,
        })
        .unwrap();

        assert_eq!(
            body,
            json!({
                "channel": "#ci",
                "text": "hello",
                "attachments": [{"fields": [{"title": "Label", "value": "1.2", "short": true}]}]
            })
        );
    }

    #[test]
    fn test_message_without_attachments_omits_the_key() {
        let body = serde_json::to_value(ChatMessage::new("plain")).unwrap();
        assert_eq!(body, json!({"text": "plain"}));
    }
}
