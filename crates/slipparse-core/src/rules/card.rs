//! Masked card number cleanup.

use lazy_static::lazy_static;
use regex::Regex;

use super::patterns::{CARD_LABELED, MASKED_CARD};

lazy_static! {
    static ref MASK_RUN: Regex = Regex::new(r"\*{5,}").unwrap();
    static ref DASH_RUN: Regex = Regex::new(r"-{2,}").unwrap();
}

/// Clean a masked card number read by OCR.
///
/// Characters outside `[0-9*Xx-]` are OCR noise (underscores, stray
/// letters) and become mask characters; oversized mask runs are collapsed
/// and repeated dashes normalized.
pub fn normalize_masked_card(raw: &str) -> String {
    let replaced: String = raw
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_digit() || matches!(c, '*' | 'X' | 'x' | '-') {
                c
            } else {
                '*'
            }
        })
        .collect();

    let collapsed = MASK_RUN.replace_all(&replaced, "****");
    let dashed = DASH_RUN.replace_all(&collapsed, "-");

    dashed.trim_matches('-').to_string()
}

/// Find a masked card number in normalized text: the 카드번호 label first,
/// then any loose masked-number shape.
pub fn extract_masked_card(text: &str) -> Option<(String, String)> {
    let raw = CARD_LABELED
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .or_else(|| MASKED_CARD.find(text).map(|m| m.as_str().to_string()))?;

    let normalized = normalize_masked_card(&raw);
    if normalized.chars().filter(|c| c.is_ascii_digit()).count() < 4 {
        return None;
    }
    Some((raw, normalized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_replaces_noise() {
        assert_eq!(
            normalize_masked_card("1234-56__-____-7890"),
            "1234-56**-****-7890"
        );
    }

    #[test]
    fn test_normalize_collapses_mask_runs() {
        assert_eq!(
            normalize_masked_card("1234*********7890"),
            "1234****7890"
        );
    }

    #[test]
    fn test_normalize_dash_repetition() {
        assert_eq!(
            normalize_masked_card("1234--56**--****--7890"),
            "1234-56**-****-7890"
        );
    }

    #[test]
    fn test_extract_labeled() {
        let text = "카드종류: 신한카드\n카드번호: 1234-56**-****-7890\n승인번호 30012345";
        let (raw, normalized) = extract_masked_card(text).unwrap();
        assert_eq!(raw, "1234-56**-****-7890");
        assert_eq!(normalized, "1234-56**-****-7890");
    }

    #[test]
    fn test_extract_loose() {
        let text = "신용승인 1234 56XX XXXX 7890 일시불";
        let (_, normalized) = extract_masked_card(text).unwrap();
        assert!(normalized.starts_with("1234"));
    }

    #[test]
    fn test_extract_rejects_maskless_garbage() {
        assert!(extract_masked_card("카드번호: ****-****").is_none());
    }
}
