// src/services/mod.rs
pub mod chat;
pub mod room_allocator;

pub use chat::ChatService;
