//! Field predicates
//!
//! Each check is pure: it either hands back a value safe to put into an
//! attribute or text node, or `None`.

use regex::Regex;
use std::sync::LazyLock;

use crate::constants::links::SECURE_SCHEME;

/// 1-15 characters of ASCII letters, digits or underscore
static HANDLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{1,15}$").unwrap());

/// ASCII local part, dotted domain, alphabetic TLD of two or more letters
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap());

/// Social handle without its optional leading `@`
///
/// Surrounding whitespace is not forgiven; the value must match as given.
pub fn sanitize_handle(raw: &str) -> Option<String> {
    let handle = raw.strip_prefix('@').unwrap_or(raw);
    HANDLE_PATTERN.is_match(handle).then(|| handle.to_string())
}

/// Messaging URL, accepted only for HTTPS on `domain` or a subdomain of it
pub fn allowed_messaging_url(raw: &str, domain: &str) -> Option<String> {
    let url = raw.trim();
    let parsed = ParsedUrl::parse(url)?;
    if !parsed.scheme.eq_ignore_ascii_case(SECURE_SCHEME) {
        return None;
    }
    let domain = domain.trim_end_matches('.');
    if domain.is_empty() {
        return None;
    }
    let on_domain = parsed.host.eq_ignore_ascii_case(domain)
        || parsed
            .host
            .strip_suffix(&domain.to_ascii_lowercase())
            .is_some_and(|prefix| prefix.ends_with('.') && prefix.len() > 1);
    on_domain.then(|| url.to_string())
}

pub fn valid_email(raw: &str) -> Option<String> {
    let email = raw.trim();
    EMAIL_PATTERN.is_match(email).then(|| email.to_string())
}

/// Percent-encode everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`
pub fn encode_uri_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Scheme and host of an absolute hierarchical URL
#[derive(Debug, PartialEq, Eq)]
struct ParsedUrl {
    scheme: String,
    /// Lowercased, without port or trailing root dot
    host: String,
}

impl ParsedUrl {
    /// Conservative parse: anything ambiguous is treated as unparsable
    fn parse(url: &str) -> Option<Self> {
        if url
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == '\\')
        {
            return None;
        }
        let (scheme, rest) = url.split_once("://")?;
        let mut scheme_chars = scheme.chars();
        if !scheme_chars.next()?.is_ascii_alphabetic()
            || !scheme_chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        {
            return None;
        }

        let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
        // Userinfo lets a URL display one host and resolve another
        if authority.contains('@') {
            return None;
        }
        let host = match authority.rsplit_once(':') {
            Some((host, port)) => {
                if !port.chars().all(|c| c.is_ascii_digit()) {
                    return None;
                }
                host
            }
            None => authority,
        };
        let host = host.strip_suffix('.').unwrap_or(host).to_ascii_lowercase();
        let labels_ok = host.split('.').all(|label| {
            !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        });
        if host.is_empty() || !labels_ok {
            return None;
        }

        Some(Self {
            scheme: scheme.to_ascii_lowercase(),
            host,
        })
    }
}
