//! Name-derived identifiers
//!
//! Two derivations from a person's display name:
//!
//! | Derivation | Used for | Persisted? |
//! |------------|----------|------------|
//! | `name_hash` | storage keys for progress records | yes |
//! | `identity_slug` | in-memory answer ids within one game | no |
//!
//! The hash keeps raw names out of the database: progress is keyed by a
//! non-reversible digest, and full records are only rebuilt against a live
//! roster fetch. It is deliberately non-cryptographic; it only has to be
//! stable across sessions. Collisions are tolerated.

/// Base-36 digest of a display name.
///
/// Rolls a 32-bit signed accumulator over the UTF-16 code units of the name
/// (`acc = acc * 31 + unit`, wrapping), then renders the absolute value in
/// base 36. The empty string hashes to `"0"`.
pub fn name_hash(name: &str) -> NameHash {
    let mut acc: i32 = 0;
    for unit in name.encode_utf16() {
        acc = acc.wrapping_mul(31).wrapping_add(unit as i32);
    }
    to_base36((acc as i64).unsigned_abs())
}

/// Answer id for a person within one extraction pass: the lowercased name
/// stripped to ASCII alphanumerics.
pub fn identity_slug(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// A `name_hash` digest. Plain string so it can key JSON documents directly.
pub type NameHash = String;

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).expect("base-36 digits are ASCII")
}
