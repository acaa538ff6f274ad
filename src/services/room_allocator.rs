// src/services/room_allocator.rs
//
// Computes the next generated chat-room id. Generated ids follow the
// room_user_<NNN> convention (zero-padded to at least three digits);
// anything else in the collection is a client-supplied session id and is
// ignored by the scan.
use crate::models::room::Room;
use crate::store::{RoomStore, StoreError};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::info;

lazy_static! {
    static ref ROOM_ID_PATTERN: Regex = Regex::new(r"^room_user_(\d+)$").unwrap();
}

/// Numeric suffix of a generated room id, `None` for any id that is not
/// exactly `room_user_<digits>`. Pure; no store access.
pub fn parse_room_number(room_id: &str) -> Option<u32> {
    ROOM_ID_PATTERN
        .captures(room_id)?
        .get(1)?
        .as_str()
        .parse()
        .ok()
}

/// Zero-pads to three digits minimum; larger numbers keep all digits.
pub fn format_room_id(number: u32) -> String {
    format!("room_user_{:03}", number)
}

/// Next free room number given every id currently in the store. The
/// baseline max is 1 even when nothing matches, so the first generated id
/// is room_user_002 - the numbering the deployed clients already hold.
pub fn next_room_number(room_ids: &[String]) -> u32 {
    let mut max_number = 1;
    for id in room_ids {
        if let Some(number) = parse_room_number(id) {
            if number > max_number {
                max_number = number;
            }
        }
    }
    max_number + 1
}

/// Scan the store, compute the next id, and create the new room record.
/// The previous room is left untouched; this only ever adds a document.
///
/// The scan and the write are two separate store calls with no transaction
/// between them. Concurrent callers can compute the same id, so the chat
/// service holds its allocation mutex across this call.
pub async fn allocate_next_room(
    store: &dyn RoomStore,
    user_id: &str,
) -> Result<String, StoreError> {
    let room_ids = store.list_room_ids().await?;
    info!("📋 Room scan complete: {} document(s)", room_ids.len());

    let next = next_room_number(&room_ids);
    let new_room_id = format_room_id(next);

    store.put_room(&new_room_id, &Room::new(user_id)).await?;
    info!("✅ Created new room {} for user {}", new_room_id, user_id);

    Ok(new_room_id)
}
