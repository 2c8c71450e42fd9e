//! Chat models
//!
//! A chat is identified by (`companyId`, `contact.phone`) and owns an
//! append-only sequence of messages.

use crate::models::lenient::{int_or_string, opt_string_or_number};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A single message in a chat
///
/// Messages are stored as received and never mutated afterwards. Numeric
/// fields sent as strings, and string fields sent as numbers, are coerced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Client-assigned message identifier
    pub message_id: String,
    /// Sender role tag (e.g. "user", "assistant")
    pub role: String,
    /// Message text
    pub body: String,
    /// Numeric timestamp supplied by the sender
    #[serde(deserialize_with = "int_or_string")]
    pub timestamp: i64,
    /// Date string supplied by the sender
    pub date: String,
    /// Delivery status
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub status: Option<String>,
    /// Message type (text, image, ...)
    #[serde(default, rename = "type", deserialize_with = "opt_string_or_number")]
    pub kind: Option<String>,
    /// Acknowledgment marker
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub ack: Option<String>,
}

/// Contact on the other side of a chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    /// Contact display name
    #[serde(default)]
    pub display_name: Option<String>,
    /// Contact phone number, half of the chat identity
    pub phone: String,
}

/// A stored chat with its full message history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    /// Owning company key
    pub company_id: String,
    /// Company alias at chat creation
    pub company_alias: String,
    /// Company phone at chat creation
    pub company_phone: String,
    /// Chat identifier
    pub chat_id: String,
    /// Contact descriptor
    pub contact: ContactInfo,
    /// Messages in arrival order
    #[serde(default)]
    pub messages: Vec<Message>,
    /// When the chat was created (ISO-8601, UTC)
    #[serde(default)]
    pub created_at: Option<String>,
    /// When a message was last appended (ISO-8601, UTC)
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Payload accepted by `POST /chats`
///
/// Carries the chat identity plus the messages to append. Any
/// `createdAt`/`updatedAt` sent by the client is ignored; the store stamps
/// those itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChat {
    /// Owning company key
    pub company_id: String,
    /// Company alias
    pub company_alias: String,
    /// Company phone
    pub company_phone: String,
    /// Chat identifier; defaults to the contact phone when absent
    #[serde(default)]
    pub chat_id: Option<String>,
    /// Contact descriptor
    pub contact: ContactInfo,
    /// Messages to append, in order
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl NewChat {
    /// Validate the payload before any storage access
    /// Returns Ok(()) if valid, Err with message if invalid
    pub fn validate(&self) -> Result<(), String> {
        if self.company_id.trim().is_empty() {
            return Err("companyId cannot be empty".to_string());
        }
        if self.contact.phone.trim().is_empty() {
            return Err("contact.phone cannot be empty".to_string());
        }
        if self.messages.is_empty() {
            return Err("messages must contain at least one message".to_string());
        }
        Ok(())
    }

    /// Effective chat identifier
    pub fn chat_id(&self) -> &str {
        match self.chat_id.as_deref() {
            Some(id) if !id.trim().is_empty() => id,
            _ => &self.contact.phone,
        }
    }

    /// Build the chat that is persisted when no chat exists yet
    pub fn into_chat(self, now: &str) -> Chat {
        let chat_id = self.chat_id().to_string();
        Chat {
            company_id: self.company_id,
            company_alias: self.company_alias,
            company_phone: self.company_phone,
            chat_id,
            contact: self.contact,
            messages: self.messages,
            created_at: Some(now.to_string()),
            updated_at: Some(now.to_string()),
        }
    }
}

/// Chat summary returned by `GET /chats/list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatListItem {
    /// Chat identifier
    pub chat_id: String,
    /// Contact phone
    pub contact_phone: String,
    /// Contact display name
    pub display_name: Option<String>,
    /// Last append time
    pub updated_at: Option<String>,
}

impl From<&Chat> for ChatListItem {
    fn from(chat: &Chat) -> Self {
        Self {
            chat_id: chat.chat_id.clone(),
            contact_phone: chat.contact.phone.clone(),
            display_name: chat.contact.display_name.clone(),
            updated_at: chat.updated_at.clone(),
        }
    }
}

/// Format a point in time the way chat timestamps are stored
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Micros, true)
}
