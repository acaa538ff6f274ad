// src/models/chat.rs
use serde::{Deserialize, Serialize};

/// Inbound question from the mobile/web client. The clients send camelCase
/// keys (userId, sessionId), so rename at this boundary.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub message: String,
    /// When present this is used verbatim as the room id
    /// (e.g. room_user_001); otherwise the room is derived from the user id.
    pub session_id: Option<String>,
    /// Message origin tag, 'chat' or 'live'. Logged only.
    pub source: Option<String>,
}

/// Answer returned to the client. Also the exact shape the RAG server
/// responds with, so it deserializes the upstream body directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub answer: String,
    pub sources: Vec<String>,
}

impl ChatResponse {
    /// Placeholder response carrying a human-readable message and no
    /// sources. Every failure path funnels through here.
    pub fn message_only(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            sources: Vec::new(),
        }
    }
}

/// Outbound request to the RAG server, which expects snake_case keys.
/// `session_id` carries the resolved room id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendChatRequest {
    pub user_id: String,
    pub user_message: String,
    pub session_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRoomRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub room_id: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRoomResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_room_id: Option<String>,
}

impl DeleteRoomResponse {
    pub fn ok(message: impl Into<String>, new_room_id: String) -> Self {
        Self {
            success: true,
            message: message.into(),
            new_room_id: Some(new_room_id),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            new_room_id: None,
        }
    }
}
