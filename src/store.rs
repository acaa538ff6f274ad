// src/store.rs
use crate::models::room::{ChatMessage, Room};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Could not reach the document store: {0}")]
    Unavailable(String),
    #[error("Document store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to decode a document store response: {0}")]
    Decode(String),
    #[error("Failed to obtain a store access token: {0}")]
    Auth(String),
}

/// The handful of document operations the gateway needs from the store.
/// The production implementation is `FirestoreClient`; tests swap in an
/// in-memory store.
///
/// `put_room` has set/overwrite semantics (last write wins) - there is no
/// create-if-absent primitive, so callers that need unique creation must
/// serialize scan-then-write sequences themselves.
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Ids of every document in the `chat_rooms` collection, unfiltered.
    async fn list_room_ids(&self) -> Result<Vec<String>, StoreError>;

    /// Read one room document, `None` if it does not exist.
    async fn get_room(&self, room_id: &str) -> Result<Option<Room>, StoreError>;

    /// Write a full room document at `room_id` in a single call.
    async fn put_room(&self, room_id: &str, room: &Room) -> Result<(), StoreError>;

    /// A room's messages in timestamp order.
    async fn list_messages(&self, room_id: &str) -> Result<Vec<ChatMessage>, StoreError>;
}
