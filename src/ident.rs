//! Record identifier generation and validation
//! -------------------------------------------
//! Single source of truth for what a record id looks like: a random 128-bit
//! value rendered as a canonical, hyphenated UUID v4 string.

use uuid::{Uuid, Variant};

/// Length of the canonical 8-4-4-4-12 hyphenated form.
const HYPHENATED_LEN: usize = 36;

/// Generate a fresh record identifier (UUID v4, lowercase hyphenated).
pub fn new_record_id() -> String {
    Uuid::new_v4().hyphenated().to_string()
}

/// Return true iff `id` is a canonical hyphenated UUID whose version nibble is 4
/// and whose variant bits are RFC 4122. Hex digits may be either case.
///
/// Braced, URN and simple (unhyphenated) renderings are rejected even though
/// the `uuid` parser accepts them; only the 8-4-4-4-12 form reaches the store.
pub fn is_valid_record_id(id: &str) -> bool {
    if id.len() != HYPHENATED_LEN {
        return false;
    }
    let groups: Vec<&str> = id.split('-').collect();
    if groups.len() != 5 || groups.iter().map(|g| g.len()).ne([8usize, 4, 4, 4, 12]) {
        return false;
    }
    if !groups.iter().all(|g| g.bytes().all(|b| b.is_ascii_hexdigit())) {
        return false;
    }
    match Uuid::try_parse(id) {
        Ok(u) => u.get_version_num() == 4 && u.get_variant() == Variant::RFC4122,
        Err(_) => false,
    }
}
