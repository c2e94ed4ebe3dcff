//! Session codes and round identifiers

use rand::Rng;

/// Lowercase letters and digits
const CODE_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
pub const DEFAULT_CODE_LENGTH: usize = 4;

/// Generate a random short session code. Collisions are the caller's problem.
pub fn new_session_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
        .collect()
}

/// Globally unique round identifier
pub fn new_round_id() -> String {
    ulid::Ulid::new().to_string()
}

/// Identifier for a subscriber connection
pub fn new_subscriber_id() -> String {
    ulid::Ulid::new().to_string()
}
