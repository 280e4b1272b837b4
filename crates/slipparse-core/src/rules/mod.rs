//! Field-extraction primitives and per-field rule modules.
//!
//! Every field on the receipt record is resolved through a priority-ordered
//! chain of increasingly generic patterns; [`first_non_empty`] (or plain
//! `Option::or_else` chains at call sites) is the composition idiom.

pub mod bizno;
pub mod card;
pub mod classify;
pub mod dates;
pub mod money;
pub mod patterns;

pub use bizno::{extract_bizno, normalize_bizno};
pub use card::{extract_masked_card, normalize_masked_card};
pub use classify::{classify, taxify};
pub use dates::{extract_sale_date, extract_sale_time, normalize_date};
pub use money::{scan_money, MoneyFields};

use regex::Regex;

/// First regex match against `text`; returns the requested capture group
/// trimmed, the full match when the pattern has no groups, or `None` when
/// nothing matches. Blank captures count as "not found".
pub fn extract(text: &str, pattern: &Regex, group: usize) -> Option<String> {
    let caps = pattern.captures(text)?;
    let m = if pattern.captures_len() > 1 {
        caps.get(group)?
    } else {
        caps.get(0)?
    };
    let value = m.as_str().trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Like [`extract`] but compiles `pattern` on the fly. A malformed pattern
/// is treated as "no match" rather than an error, so callers can keep
/// degraded-field semantics even for dynamically assembled patterns.
pub fn extract_str(text: &str, pattern: &str, group: usize) -> Option<String> {
    let re = Regex::new(pattern).ok()?;
    extract(text, &re, group)
}

/// First non-blank candidate from an ordered list of extractor results.
pub fn first_non_empty<I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    candidates
        .into_iter()
        .flatten()
        .find(|s| !s.trim().is_empty())
}

/// Parse a currency-like token ("1,500", "1500원") to won.
pub fn parse_amount(s: &str) -> Option<i64> {
    let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}
