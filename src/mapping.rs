//! Mapping tables and the normalization shared by every provider parser.
//!
//! A mapping table maps an icon name to its code point. Upstream sources encode
//! code points in several ways (`61444`, `"f004"`, `"\F0003"`, `"0xea60"`);
//! everything is normalized to a lowercase `0x`-prefixed hex string so the
//! persisted tables look the same for every provider.
//!
//! # Examples
//!
//! ```
//! use iconfetch::mapping::{code_point_to_char, format_code_point, normalize_code_point};
//!
//! assert_eq!(normalize_code_point("\\F004").as_deref(), Some("0xf004"));
//! assert_eq!(format_code_point(61444), "0xf004");
//! assert_eq!(code_point_to_char("0xf004").unwrap(), '\u{f004}');
//! ```

use crate::error::{Error, Result};
use regex::Regex;
use std::collections::BTreeMap;

/// Icon name (lowercase) to canonical code point string (`"0xf004"`).
pub type Mapping = BTreeMap<String, String>;

/// Lowercase an icon name and drop any whitespace.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Parse a textual code point in any of the upstream encodings.
///
/// Accepts `0x`/`U+` prefixes, CSS escapes (`\f004`, `\F0003`) and bare hex
/// digits. Returns `None` for anything that is not a valid unicode scalar.
///
/// Bare digits are always hex: `"61444"` is `0x61444`, not U+F004. Decimal code
/// points (Codicons, IcoMoon JSON) arrive as numbers and belong in
/// [`format_code_point`] instead.
pub fn parse_code_point(raw: &str) -> Option<u32> {
    let raw = raw.trim().trim_matches(|c| c == '"' || c == '\'');
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .or_else(|| raw.strip_prefix("U+"))
        .or_else(|| raw.strip_prefix("u+"))
        .or_else(|| raw.strip_prefix('\\'))
        .unwrap_or(raw);

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let value = u32::from_str_radix(digits, 16).ok()?;
    char::from_u32(value).filter(|_| value != 0).map(|_| value)
}

/// Render a numeric code point in the canonical form.
pub fn format_code_point(value: u32) -> String {
    format!("{value:#x}")
}

/// Parse then re-render a textual code point.
pub fn normalize_code_point(raw: &str) -> Option<String> {
    parse_code_point(raw).map(format_code_point)
}

/// Decode a mapping table value into the character it names.
pub fn code_point_to_char(code_point: &str) -> Result<char> {
    parse_code_point(code_point)
        .and_then(char::from_u32)
        .ok_or_else(|| Error::InvalidCodePoint(code_point.to_string()))
}

/// Extract `name -> code point` pairs from `selector:before { content: "\XXXX" }`
/// rules.
///
/// `pattern` must have two capture groups: the icon name and the escaped code
/// point. Rules whose code point does not parse are skipped.
pub fn extract_css_code_points(css: &str, pattern: &Regex) -> Mapping {
    pattern
        .captures_iter(css)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().trim_end_matches(':');
            let code_point = normalize_code_point(caps.get(2)?.as_str())?;
            Some((normalize_name(name), code_point))
        })
        .collect()
}

/// Build the selector + content pattern for CSS classes named `.<class_prefix>-NAME`.
///
/// Both `:before` and `::before` are accepted and the declaration may span lines.
pub(crate) fn css_rule_pattern(class_prefix: &str) -> Regex {
    let pattern = format!(
        r#"\.{}-([A-Za-z0-9_-]+):{{1,2}}before\s*\{{\s*content:\s*["'](\\[0-9A-Fa-f]+)["']\s*;?\s*\}}"#,
        regex::escape(class_prefix)
    );
    Regex::new(&pattern).expect("css rule pattern is valid")
}

/// Decode raw mapping bytes as UTF-8 text.
pub(crate) fn utf8<'a>(provider: &str, raw: &'a [u8]) -> Result<&'a str> {
    std::str::from_utf8(raw).map_err(|e| Error::malformed(provider, format!("not UTF-8: {e}")))
}

/// Reject empty tables; an empty parse means the expected structure was absent.
pub(crate) fn non_empty(provider: &str, mapping: Mapping) -> Result<Mapping> {
    if mapping.is_empty() {
        Err(Error::malformed(provider, "no icons found"))
    } else {
        Ok(mapping)
    }
}
