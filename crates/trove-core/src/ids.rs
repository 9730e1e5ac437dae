//! UUID v7 utilities for time-ordered identifiers.
//!
//! All rows created by trove use UUIDv7 primary keys: the first 48 bits
//! embed a millisecond Unix timestamp, so ids sort in creation order and
//! index inserts stay append-mostly.

use uuid::Uuid;

/// Generate a new UUIDv7 identifier.
///
/// # Example
///
/// ```
/// use trove_core::ids::new_v7;
///
/// let id = new_v7();
/// // IDs generated later will be lexicographically greater
/// ```
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}

/// Check if a UUID is version 7.
#[inline]
pub fn is_v7(uuid: &Uuid) -> bool {
    uuid.get_version_num() == 7
}
