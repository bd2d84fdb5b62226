//! Conversation message types.

use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies a message for its whole lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    #[inline]
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// Who wrote a message.
///
/// Replies from a human agent and canned widget replies are also
/// `Assistant` messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The customer.
    User,
    /// The business side of the conversation.
    Assistant,
}

/// Customer feedback on a reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    /// Thumbs up.
    Positive,
    /// Thumbs down.
    Negative,
}

/// A file or voice recording sent along with a message.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// File name shown to the user.
    pub name: String,
    /// MIME type, e.g. `audio/webm`.
    pub mime_type: String,
    /// Where the bytes can be fetched from.
    pub url: String,
}

impl Attachment {
    /// Creates an attachment.
    #[inline]
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            url: url.into(),
        }
    }
}

/// One conversation turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub(crate) id: MessageId,
    pub(crate) role: Role,
    pub(crate) text: String,
    pub(crate) attachment: Option<Attachment>,
    pub(crate) feedback: Option<Feedback>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) finalized: bool,
}

impl Message {
    pub(crate) fn new(role: Role, text: String) -> Self {
        Self {
            id: MessageId::new(),
            role,
            text,
            attachment: None,
            feedback: None,
            created_at: Utc::now(),
            finalized: true,
        }
    }

    /// Returns the id of this message.
    #[inline]
    pub fn id(&self) -> MessageId {
        self.id
    }

    /// Returns who wrote this message.
    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the text of this message.
    ///
    /// For a message that is still receiving a reply, this is the text
    /// received so far.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the attached file, if any.
    #[inline]
    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    /// Returns the customer feedback on this message, if any.
    #[inline]
    pub fn feedback(&self) -> Option<Feedback> {
        self.feedback
    }

    /// Returns when this message was created.
    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns `true` once the text of this message is complete.
    #[inline]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_serialize_message() {
        let mut msg = Message::new(Role::User, "Sent a voice message".into());
        msg.attachment = Some(Attachment::new(
            "voice-message.webm",
            "audio/webm",
            "blob:voice",
        ));

        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["role"], json!("user"));
        assert_eq!(value["attachment"]["mimeType"], json!("audio/webm"));
        assert_eq!(value["id"], json!(msg.id().to_string()));
        assert_eq!(value["finalized"], json!(true));
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Message::new(Role::Assistant, String::new());
        let b = Message::new(Role::Assistant, String::new());
        assert_ne!(a.id(), b.id());
    }
}
