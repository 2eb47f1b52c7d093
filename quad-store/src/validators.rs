use std::sync::LazyLock;

use email_address::EmailAddress;
use regex::Regex;
use url::Url;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{3,20}$").expect("username regex"));

/// Returns `true` if the provided string is a syntactically valid email address.
pub fn is_valid_email(value: &str) -> bool {
    EmailAddress::is_valid(value)
}

/// Returns `true` if the provided string parses as a URL with a scheme.
pub fn is_valid_url(value: &str) -> bool {
    Url::parse(value).is_ok()
}

/// Returns `true` if the provided string is an acceptable username:
/// 3-20 characters, letters, digits, and underscores only.
pub fn is_valid_username(value: &str) -> bool {
    USERNAME_RE.is_match(value)
}
