//! Format checks used by the input schemas.

use std::sync::OnceLock;

/// Best-effort email validation.
///
/// Not RFC-complete: one `@`, something before it, and a dotted domain after.
pub fn is_email(s: &str) -> bool {
    static EMAIL_RE: OnceLock<regex::Regex> = OnceLock::new();
    EMAIL_RE
        .get_or_init(|| {
            regex::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid built-in email regex")
        })
        .is_match(s)
}

/// Absolute URL check (`http://c1.img` passes, `c1.img` does not).
pub fn is_url(s: &str) -> bool {
    url::Url::parse(s).is_ok()
}

/// Company handles: lowercase letters, digits, `-` and `_`.
pub fn is_handle(s: &str) -> bool {
    static HANDLE_RE: OnceLock<regex::Regex> = OnceLock::new();
    HANDLE_RE
        .get_or_init(|| regex::Regex::new(r"^[a-z0-9_-]+$").expect("invalid built-in handle regex"))
        .is_match(s)
}
