//! Text normalization applied before any template detection or parsing.
//!
//! OCR output arrives with full-width characters, collapsed table structure
//! and erratic whitespace. The parsers downstream are line-oriented, so the
//! normalizer recovers line breaks ahead of known field labels that OCR ran
//! together with the preceding value.

use lazy_static::lazy_static;
use regex::Regex;

/// Field labels that must start a line for the line-oriented parsers.
/// Longer labels are listed first so 총합계 is never split into 총 + 합계.
const BREAK_LABELS: &[&str] = &[
    "총합계",
    "합계",
    "받을금액",
    "결제금액",
    "승인금액",
    "승인번호",
    "부가세",
    "부가가치세",
    "공급가액",
    "과세물품",
    "면세물품",
    "할인",
    "에누리",
    "카드번호",
    "카드종류",
    "거래일시",
    "사업자번호",
    "사업자등록번호",
    "가맹점명",
    "가맹점번호",
    "거스름돈",
    "현금영수증",
];

lazy_static! {
    // A label preceded by anything that is not a line break or Hangul gets
    // a line break inserted. Restricting the preceding character to
    // non-Hangul keeps longer Hangul words (총합계, 면세물품) intact.
    static ref LABEL_BREAK: Regex = {
        let alternation = BREAK_LABELS.join("|");
        Regex::new(&format!(r"([^\n가-힣])[ \t]*({})", alternation)).unwrap()
    };
    static ref INLINE_SPACE: Regex = Regex::new(r"[ \t\u{3000}]+").unwrap();
}

/// Fold a full-width ASCII-range character to its half-width form.
fn fold_fullwidth(c: char) -> char {
    match c {
        '\u{ff01}'..='\u{ff5e}' => {
            char::from_u32(c as u32 - 0xfee0).unwrap_or(c)
        }
        '\u{3000}' => ' ',
        _ => c,
    }
}

/// Normalize raw OCR text. Never fails; empty input yields an empty string.
pub fn normalize(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let folded: String = raw.chars().map(fold_fullwidth).collect();

    let broken = LABEL_BREAK.replace_all(&folded, "$1\n$2");

    let mut lines: Vec<String> = Vec::new();
    for line in broken.lines() {
        let collapsed = INLINE_SPACE.replace_all(line, " ");
        let trimmed = collapsed.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }

    lines.join("\n")
}
