//! Identifier grammar checks.
//!
//! Each predicate is a fixed character-class test compiled once with
//! [`once_cell`] and matched with [`regex`] — the same lazily-compiled
//! pattern used elsewhere for user-supplied path matchers, applied here to
//! proto3's fixed naming grammars instead. Per Design Note §9, these are
//! pure ASCII character-class tests; nothing here is locale-aware.

use once_cell::sync::Lazy;
use regex::Regex;

static FIELD_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z_][a-zA-Z0-9_]*$").unwrap());
static MESSAGE_OR_SERVICE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][a-zA-Z0-9_]*$").unwrap());
static METHOD_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][a-zA-Z0-9_]*$").unwrap());
static ENUM_VALUE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z_][A-Z0-9_]*$").unwrap());
static PACKAGE_COMPONENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").unwrap());
static SCREAMING_SNAKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9_]+$").unwrap());
static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// `[a-z_][a-zA-Z0-9_]*` — field names.
pub fn is_valid_field_name(s: &str) -> bool {
    FIELD_NAME.is_match(s)
}

/// `[A-Z][a-zA-Z0-9_]*` — message, enum, and service names.
pub fn is_valid_message_or_service_name(s: &str) -> bool {
    MESSAGE_OR_SERVICE_NAME.is_match(s)
}

/// `[A-Za-z][a-zA-Z0-9_]*` — RPC method names.
pub fn is_valid_method_name(s: &str) -> bool {
    METHOD_NAME.is_match(s)
}

/// `[A-Z_][A-Z0-9_]*` — enum value names.
pub fn is_valid_enum_value_name(s: &str) -> bool {
    ENUM_VALUE_NAME.is_match(s)
}

/// `[a-z][a-z0-9_]*` — a single dot-separated package component.
pub fn is_valid_package_component(s: &str) -> bool {
    PACKAGE_COMPONENT.is_match(s)
}

/// `[A-Za-z_][A-Za-z0-9_]*` — a single dotted-path component of a custom
/// option name, e.g. each of `my`, `custom`, `opt` in `(my.custom.opt)`.
pub fn is_valid_identifier(s: &str) -> bool {
    IDENTIFIER.is_match(s)
}

/// True if every character is uppercase, a digit, or `_` — used to reject
/// message names that, despite matching `[A-Z][a-zA-Z0-9_]*`, read as
/// SCREAMING_SNAKE_CASE (§4.4).
pub fn is_screaming_snake_case(s: &str) -> bool {
    !s.is_empty() && SCREAMING_SNAKE.is_match(s) && s.contains(|c: char| c.is_ascii_uppercase())
}
