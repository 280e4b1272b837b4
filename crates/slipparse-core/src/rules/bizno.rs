//! Business registration number (사업자등록번호) normalization.

use super::patterns::{BIZNO_LABELED, BIZNO_STANDALONE};

/// Canonicalize to dashed `NNN-NN-NNNNN` form.
///
/// Accepts a 10-digit run or an already-dashed/spaced value. Anything else
/// is returned unchanged — partial data is still useful downstream.
pub fn normalize_bizno(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() != 10 {
        return raw.trim().to_string();
    }

    format!("{}-{}-{}", &digits[0..3], &digits[3..5], &digits[5..10])
}

/// Find a business registration number in normalized text, labeled lines
/// first, then any standalone 3-2-5 digit group. Output is canonical.
pub fn extract_bizno(text: &str) -> Option<String> {
    if let Some(caps) = BIZNO_LABELED.captures(text) {
        return Some(normalize_bizno(&caps[1]));
    }

    BIZNO_STANDALONE
        .captures(text)
        .map(|caps| format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]))
}

/// Byte offset of the business number match, used by parsers that anchor a
/// scan window around it.
pub fn find_bizno_position(text: &str) -> Option<usize> {
    BIZNO_LABELED
        .find(text)
        .or_else(|| BIZNO_STANDALONE.find(text))
        .map(|m| m.start())
}
