//! Randomness for Signpost records.

use rand::RngCore;

/// Length in bytes of a user's secret fragment before hex encoding.
const FRAGMENT_BYTES: usize = 4;

/// Generate the 8-character secret fragment stored on each user record.
pub fn secret_fragment() -> String {
    let mut bytes = [0u8; FRAGMENT_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
