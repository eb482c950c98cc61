//! Identifier and timestamp helpers.

use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

const ORDER_ID_PREFIX: &str = "ORD-";
const ORDER_ID_SUFFIX_LEN: usize = 9;
const BASE36_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Current time as unix seconds. Clamps to zero if the clock reports a
/// pre-epoch time.
pub fn unix_timestamp() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|d| d.as_secs())
		.unwrap_or(0)
}

/// Generates a new order identifier: `ORD-` followed by nine uppercase
/// base-36 characters, with the randomness drawn from a v4 UUID.
///
/// Nine base-36 digits are roughly 46 bits of entropy. Collisions are
/// not otherwise mitigated; the store assumes a single writer per id.
pub fn generate_order_id() -> String {
	let mut n = Uuid::new_v4().as_u128();
	let mut id = String::with_capacity(ORDER_ID_PREFIX.len() + ORDER_ID_SUFFIX_LEN);
	id.push_str(ORDER_ID_PREFIX);
	for _ in 0..ORDER_ID_SUFFIX_LEN {
		id.push(BASE36_ALPHABET[(n % 36) as usize] as char);
		n /= 36;
	}
	id
}

/// Mints a line-item id from the catalog item id it references. The
/// UUID suffix keeps two lines of the same product distinct.
pub fn line_item_id(catalog_id: &str) -> String {
	format!("{}-{}", catalog_id, Uuid::new_v4())
}
