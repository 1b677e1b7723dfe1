//! Identifier generation and format checks.
//!
//! # Responsibility
//! - Mint client-style entity ids for containers, items and counters.
//! - Mint database-style document ids for games and players.
//!
//! # Invariants
//! - Entity ids are hyphenated UUID v4 strings, always 36 chars.
//! - Document ids are 24 lowercase hex chars; the first 8 encode the
//!   creation time in unix seconds.
//! - Incoming document ids are compared and stored in canonical form:
//!   trimmed and lowercased.

use once_cell::sync::Lazy;
use regex::Regex;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Length of a generated entity id.
pub const ENTITY_ID_LEN: usize = 36;
/// Length of a database-assigned document id.
pub const DOCUMENT_ID_LEN: usize = 24;

static ENTITY_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("valid entity id regex")
});
static DOCUMENT_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-fA-F]{24}$").expect("valid document id regex"));

/// Identifier of a container, item or counter inside one game.
pub type EntityId = String;

/// Identifier of a stored game or of a player/user.
pub type DocumentId = String;

/// Returns a fresh entity id.
pub fn new_entity_id() -> EntityId {
    Uuid::new_v4().hyphenated().to_string()
}

/// Returns a fresh document id.
///
/// Layout: 4 bytes of big-endian unix seconds, then 8 random bytes.
pub fn new_document_id() -> DocumentId {
    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as u32)
        .unwrap_or(0);
    let random = Uuid::new_v4();

    let mut bytes = [0u8; 12];
    bytes[..4].copy_from_slice(&seconds.to_be_bytes());
    bytes[4..].copy_from_slice(&random.as_bytes()[..8]);

    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// Canonical form of a document id: surrounding whitespace removed, hex
/// digits lowercased. The result is not checked.
pub fn normalize_document_id(value: &str) -> DocumentId {
    value.trim().to_ascii_lowercase()
}

/// Whether `value` has the shape of an entity id.
pub fn is_entity_id(value: &str) -> bool {
    ENTITY_ID_RE.is_match(value)
}

/// Whether `value` has the shape of a document id.
pub fn is_document_id(value: &str) -> bool {
    DOCUMENT_ID_RE.is_match(value)
}
