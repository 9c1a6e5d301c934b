//! Registration identifiers
//!
//! Host block types must be hyphenated slugs that do not start with a digit.
//! Block keys may contain underscores and may start with a digit, so each key
//! is rewritten before registration. Collisions after the rewrite are left to
//! the host: the last registration wins.

/// Prefix added to keys that start with a digit
pub const DEFAULT_IDENTIFIER_PREFIX: &str = "block-";

/// Compute the registration identifier of a block key using the default prefix
pub fn registration_identifier(block_key: &str) -> String {
    registration_identifier_with_prefix(block_key, DEFAULT_IDENTIFIER_PREFIX)
}

/// Compute the registration identifier of a block key.
///
/// Every `_` becomes `-`; a leading ASCII digit gets `prefix` prepended.
pub fn registration_identifier_with_prefix(block_key: &str, prefix: &str) -> String {
    let identifier = block_key.replace('_', "-");

    if identifier.starts_with(|c: char| c.is_ascii_digit()) {
        format!("{prefix}{identifier}")
    } else {
        identifier
    }
}
