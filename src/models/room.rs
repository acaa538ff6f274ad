// src/models/room.rs
use chrono::Local;
use serde::{Deserialize, Serialize};

/// Timestamp format used throughout the store, e.g. "2025-12-05 14:38:02".
/// The mobile clients parse this exact shape, so it stays a plain string.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// A chat room document in the `chat_rooms` collection. Field keys are
/// camelCase in the store, as written by the first deployment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub created_at: String,
    pub updated_at: String,
    pub user_id: String,
}

impl Room {
    pub fn new(user_id: &str) -> Self {
        let now = format_timestamp();
        Self {
            created_at: now.clone(),
            updated_at: now,
            user_id: user_id.to_string(),
        }
    }
}

/// One message in a room's `messages` sub-collection. Append-only; the
/// gateway only ever reads these (the RAG server writes both sides of
/// every exchange).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub sender: String,
    pub message_type: String,
    pub text: String,
    pub timestamp: String,
}
