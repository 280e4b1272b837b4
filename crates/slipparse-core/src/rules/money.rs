//! Money-candidate scanning and ranking.
//!
//! Every line near a money label contributes candidates; each numeric token
//! is scored by the label keywords around it and bucketed by category. The
//! highest-scored candidate per bucket wins, and a reconciliation check
//! (supply + vat ≈ total) can re-select or synthesize the total when the
//! naive pick fails.

use crate::models::receipt::within_tolerance;

use super::parse_amount;
use super::patterns::{AMOUNT_TOKEN, NUM_TOKEN};

/// Candidate category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoneyBucket {
    Total,
    /// 공급가액 / 과세금액: the VAT base, mapped to `totals.taxable_amount`.
    Supply,
    Vat,
    Discount,
    TaxFree,
}

/// A scored numeric token.
#[derive(Debug, Clone)]
pub struct MoneyCandidate {
    pub value: i64,
    pub bucket: MoneyBucket,
    pub score: i32,
    pub line: usize,
}

/// Winners per bucket after ranking and reconciliation.
#[derive(Debug, Clone, Default)]
pub struct MoneyFields {
    pub total: Option<i64>,
    pub supply: Option<i64>,
    pub vat: Option<i64>,
    pub discount: Option<i64>,
    pub tax_free: Option<i64>,
}

/// Label keywords with bucket and base score. Total-family labels score
/// highest, then supply/vat, then discount, with tax-free lowest. Compound
/// labels precede their substrings so overlap dedup keeps the longer hit.
const LABEL_SCORES: &[(&str, MoneyBucket, i32)] = &[
    ("총합계", MoneyBucket::Total, 120),
    ("받을금액", MoneyBucket::Total, 115),
    ("결제금액", MoneyBucket::Total, 110),
    ("승인금액", MoneyBucket::Total, 105),
    ("판매총액", MoneyBucket::Total, 100),
    ("합계", MoneyBucket::Total, 100),
    ("총액", MoneyBucket::Total, 95),
    ("TOTAL", MoneyBucket::Total, 95),
    ("공급가액", MoneyBucket::Supply, 80),
    ("과세금액", MoneyBucket::Supply, 72),
    ("과세물품", MoneyBucket::Supply, 70),
    ("부가가치세", MoneyBucket::Vat, 82),
    ("부가세", MoneyBucket::Vat, 80),
    ("VAT", MoneyBucket::Vat, 75),
    ("할인", MoneyBucket::Discount, 60),
    ("에누리", MoneyBucket::Discount, 56),
    ("쿠폰", MoneyBucket::Discount, 55),
    ("면세물품", MoneyBucket::TaxFree, 45),
    ("면세", MoneyBucket::TaxFree, 40),
];

/// A label occurrence within a line.
#[derive(Debug, Clone, Copy)]
struct LabelHit {
    pos: usize,
    len: usize,
    bucket: MoneyBucket,
    score: i32,
}

fn label_hits(line: &str) -> Vec<LabelHit> {
    let mut hits: Vec<LabelHit> = Vec::new();
    for (kw, bucket, score) in LABEL_SCORES {
        for (pos, _) in line.match_indices(kw) {
            let overlaps = hits
                .iter()
                .any(|h| pos < h.pos + h.len && h.pos < pos + kw.len());
            if !overlaps {
                hits.push(LabelHit {
                    pos,
                    len: kw.len(),
                    bucket: *bucket,
                    score: *score,
                });
            }
        }
    }
    hits
}

/// Collect all scored candidates from normalized text.
pub fn scan_candidates(text: &str) -> Vec<MoneyCandidate> {
    let lines: Vec<&str> = text.lines().collect();
    let mut candidates = Vec::new();

    for (line_no, line) in lines.iter().enumerate() {
        let labels = label_hits(line);
        if labels.is_empty() {
            continue;
        }

        for m in NUM_TOKEN.find_iter(line) {
            let Some(value) = parse_amount(m.as_str()) else {
                continue;
            };

            // Nearest label wins, with a handicap for labels that follow
            // the token instead of preceding it.
            let Some(nearest) = labels.iter().min_by_key(|h| {
                let dist = m.start().abs_diff(h.pos);
                if h.pos <= m.start() { dist } else { dist + 40 }
            }) else {
                continue;
            };

            let dist = m.start().abs_diff(nearest.pos);
            let mut score = nearest.score - (dist as i32 / 8).min(20);
            if AMOUNT_TOKEN.is_match(m.as_str()) {
                // Comma-grouped or >=4 digit tokens look like currency.
                score += 3;
            }
            // Tokens very late in the document (footer boilerplate, point
            // balances) get a small positional penalty.
            if !lines.is_empty() && line_no * 10 >= lines.len() * 9 {
                score -= 5;
            }

            candidates.push(MoneyCandidate {
                value,
                bucket: nearest.bucket,
                score,
                line: line_no,
            });
        }
    }

    candidates
}

fn best_for(candidates: &[MoneyCandidate], bucket: MoneyBucket) -> Option<i64> {
    candidates
        .iter()
        .filter(|c| c.bucket == bucket)
        .max_by_key(|c| c.score)
        .map(|c| c.value)
}

/// Rank candidates and apply the supply+vat total reconciliation.
pub fn scan_money(text: &str) -> MoneyFields {
    let candidates = scan_candidates(text);

    let mut fields = MoneyFields {
        total: best_for(&candidates, MoneyBucket::Total),
        supply: best_for(&candidates, MoneyBucket::Supply),
        vat: best_for(&candidates, MoneyBucket::Vat),
        discount: best_for(&candidates, MoneyBucket::Discount),
        tax_free: best_for(&candidates, MoneyBucket::TaxFree),
    };

    if let (Some(supply), Some(vat)) = (fields.supply, fields.vat) {
        let expected = supply + vat;
        let check = |total: i64| within_tolerance(total, expected, expected);

        match fields.total {
            Some(total) if check(total) => {}
            _ => {
                // The naive pick failed (or was absent). Re-select from a
                // labeled total candidate that passes the check, else fall
                // back to the arithmetic sum.
                let reselected = candidates
                    .iter()
                    .filter(|c| c.bucket == MoneyBucket::Total && check(c.value))
                    .max_by_key(|c| c.score)
                    .map(|c| c.value);
                fields.total = Some(reselected.unwrap_or(expected));
            }
        }
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_basic_labeled_totals() {
        let text = "삼각김밥 1500\n공급가액 1,364\n부가세 136\n합계 1,500";
        let fields = scan_money(text);
        assert_eq!(fields.total, Some(1500));
        assert_eq!(fields.supply, Some(1364));
        assert_eq!(fields.vat, Some(136));
    }

    #[test]
    fn test_total_from_supply_plus_vat_fallback() {
        // Garbled total label; total must come from supply + vat.
        let text = "상품 1100\n공급가액 1,000\n부가세 100";
        let fields = scan_money(text);
        assert_eq!(fields.total, Some(1100));
    }

    #[test]
    fn test_reselection_on_failed_check() {
        // The highest-scoring total pick is wrong (points line leaked into
        // the 받을금액 row); reconciliation re-selects the 합계 that fits.
        let text = "받을금액 9,999,999\n합계 1,100\n공급가액 1,000\n부가세 100";
        let fields = scan_money(text);
        assert_eq!(fields.total, Some(1100));
    }

    #[test]
    fn test_unlabeled_lines_ignored() {
        let text = "2025-10-09\n전화 1588-1234\n합계 1,500";
        let fields = scan_money(text);
        assert_eq!(fields.total, Some(1500));
        assert_eq!(fields.vat, None);
    }

    #[test]
    fn test_multiple_labels_one_line() {
        let text = "과세금액 1,000 부가세 100 합계 1,100";
        let fields = scan_money(text);
        assert_eq!(fields.supply, Some(1000));
        assert_eq!(fields.vat, Some(100));
        assert_eq!(fields.total, Some(1100));
    }

    #[test]
    fn test_compound_label_not_shadowed() {
        // 총합계 must rank as the compound label, not as an inner 합계.
        let text = "합계 1,500\n총합계 3,000";
        let fields = scan_money(text);
        assert_eq!(fields.total, Some(3000));
    }

    #[test]
    fn test_discount_and_tax_free() {
        let text = "할인 500\n면세물품 2,000\n합계 10,000";
        let fields = scan_money(text);
        assert_eq!(fields.discount, Some(500));
        assert_eq!(fields.tax_free, Some(2000));
    }
}
