//! Session cookie string parsing (`key1=val1;key2=val2`).

use super::error::CookieParseError;
use serde::{Deserialize, Serialize};

/// One session cookie to install in the browser before navigating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
}

/// Parse a semicolon-separated `key=value` string into cookies bound to `domain`.
///
/// Blank segments (e.g. a trailing `;`) are ignored. Only the first `=` splits a
/// segment, so values containing `=` survive intact.
pub fn parse_cookie_string(input: &str, domain: &str) -> Result<Vec<Cookie>, CookieParseError> {
    let mut cookies = Vec::new();
    for segment in input.split(';') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let (name, value) =
            segment
                .split_once('=')
                .ok_or_else(|| CookieParseError::MissingEquals {
                    segment: segment.to_string(),
                })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(CookieParseError::EmptyName {
                segment: segment.to_string(),
            });
        }
        cookies.push(Cookie {
            name: name.to_string(),
            value: value.trim().to_string(),
            domain: domain.to_string(),
        });
    }
    Ok(cookies)
}
