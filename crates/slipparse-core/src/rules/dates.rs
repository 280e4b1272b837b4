//! Date and time normalization for Korean receipts.

use chrono::{Datelike, Local};
use lazy_static::lazy_static;
use regex::Regex;

use super::patterns::{DATE_KOREAN, DATE_MONTH_DAY, DATE_YMD, TIME_HMS};

lazy_static! {
    static ref DATE_LABELED: Regex = Regex::new(
        r"(?:거래\s*일시|거래\s*일자|판매\s*일시?|영수\s*일자|주문\s*일시?|결제\s*일시?|발행\s*일자?)\s*[:：]?\s*(.+)"
    )
    .unwrap();
}

/// Canonicalize a date string to zero-padded `yyyy-mm-dd`.
///
/// Accepts `yyyy.mm.dd`, `yyyy/mm/dd`, `yyyy-mm-dd`, `yyyy년 mm월 dd일` and
/// year-less `mm월 dd일` (resolved against the current year). Input that
/// matches no shape is returned trimmed and otherwise unchanged — partial
/// data is still useful downstream. Idempotent on its own output.
pub fn normalize_date(raw: &str) -> String {
    normalize_date_with_year(raw, Local::now().year())
}

/// [`normalize_date`] with an explicit year for year-less inputs.
pub fn normalize_date_with_year(raw: &str, default_year: i32) -> String {
    let trimmed = raw.trim();

    if let Some(caps) = DATE_YMD.captures(trimmed) {
        return format_ymd(&caps[1], &caps[2], &caps[3]);
    }
    if let Some(caps) = DATE_KOREAN.captures(trimmed) {
        return format_ymd(&caps[1], &caps[2], &caps[3]);
    }
    if let Some(caps) = DATE_MONTH_DAY.captures(trimmed) {
        return format_ymd(&default_year.to_string(), &caps[1], &caps[2]);
    }

    trimmed.to_string()
}

fn format_ymd(year: &str, month: &str, day: &str) -> String {
    let y: i32 = year.parse().unwrap_or(0);
    let m: u32 = month.parse().unwrap_or(0);
    let d: u32 = day.parse().unwrap_or(0);
    format!("{:04}-{:02}-{:02}", y, m, d)
}

/// Find the sale date in normalized text: labeled lines first, then any
/// recognizable date anywhere. Returns the canonical `yyyy-mm-dd` form.
pub fn extract_sale_date(text: &str) -> Option<String> {
    if let Some(caps) = DATE_LABELED.captures(text) {
        let candidate = normalize_date(&caps[1]);
        if DATE_YMD.is_match(&candidate) {
            return Some(candidate);
        }
    }

    DATE_YMD
        .captures(text)
        .or_else(|| DATE_KOREAN.captures(text))
        .map(|caps| format_ymd(&caps[1], &caps[2], &caps[3]))
}

/// Find the sale time (`hh:mm` or `hh:mm:ss`) in normalized text.
pub fn extract_sale_time(text: &str) -> Option<String> {
    let caps = TIME_HMS.captures(text)?;
    let h: u32 = caps[1].parse().ok()?;
    let m: u32 = caps[2].parse().ok()?;
    if h > 23 || m > 59 {
        return None;
    }
    match caps.get(3) {
        Some(s) => Some(format!("{:02}:{:02}:{}", h, m, s.as_str())),
        None => Some(format!("{:02}:{:02}", h, m)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_date_shapes() {
        assert_eq!(normalize_date("2025.10.09"), "2025-10-09");
        assert_eq!(normalize_date("2025/10/9"), "2025-10-09");
        assert_eq!(normalize_date("2025-1-5"), "2025-01-05");
        assert_eq!(normalize_date("2025년 10월 9일"), "2025-10-09");
    }

    #[test]
    fn test_normalize_date_yearless() {
        assert_eq!(normalize_date_with_year("10월 9일", 2025), "2025-10-09");
    }

    #[test]
    fn test_normalize_date_idempotent() {
        let once = normalize_date("2025.10.09");
        assert_eq!(normalize_date(&once), once);
    }

    #[test]
    fn test_normalize_date_no_match_returns_input() {
        assert_eq!(normalize_date(" 날짜없음 "), "날짜없음");
    }

    #[test]
    fn test_extract_sale_date_labeled() {
        let text = "GS25 강남점\n거래일시: 2025.10.09 14:33:21\n합계 1,500";
        assert_eq!(extract_sale_date(text), Some("2025-10-09".to_string()));
    }

    #[test]
    fn test_extract_sale_date_unlabeled() {
        let text = "GS25 강남점\n2025-10-09\n합계 1,500";
        assert_eq!(extract_sale_date(text), Some("2025-10-09".to_string()));
    }

    #[test]
    fn test_extract_sale_time() {
        assert_eq!(
            extract_sale_time("거래일시 2025.10.09 14:33:21"),
            Some("14:33:21".to_string())
        );
        assert_eq!(extract_sale_time("오픈 9:05"), Some("09:05".to_string()));
        assert_eq!(extract_sale_time("29:99"), None);
    }
}
