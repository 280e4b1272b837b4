//! Heuristic template detection from normalized text.
//!
//! Detection is a priority-ordered chain of signatures: exact brand markers
//! and document-type headers come first, generic co-occurrence signatures
//! after, so new templates can be appended without touching existing ones.

use tracing::debug;

use super::TemplateKey;

/// A template signature: `any_of` must hit at least once, and every entry
/// of `all_of` must be present.
struct Signature {
    key: TemplateKey,
    any_of: &'static [&'static str],
    all_of: &'static [&'static str],
}

/// Priority-ordered signature table. More specific signatures first.
const SIGNATURES: &[Signature] = &[
    Signature {
        key: TemplateKey::TransactionStatement,
        any_of: &["거래명세서", "거래명세표"],
        all_of: &[],
    },
    Signature {
        key: TemplateKey::TransactionStatement,
        any_of: &[],
        all_of: &["공급자", "공급받는자"],
    },
    Signature {
        key: TemplateKey::DeliveryApp,
        any_of: &["배달의민족", "배민", "요기요", "쿠팡이츠"],
        all_of: &[],
    },
    Signature {
        key: TemplateKey::AuctionMarketplace,
        any_of: &["옥션", "지마켓", "G마켓"],
        all_of: &[],
    },
    Signature {
        key: TemplateKey::RetailSuperstore,
        any_of: &["코스트코", "트레이더스", "COSTCO"],
        all_of: &[],
    },
    Signature {
        key: TemplateKey::SearchPortalPay,
        any_of: &["네이버페이"],
        all_of: &[],
    },
    Signature {
        key: TemplateKey::SearchPortalPay,
        any_of: &[],
        all_of: &["네이버", "결제내역"],
    },
    Signature {
        key: TemplateKey::OpenMarketSlip,
        any_of: &["11번가", "쿠팡", "위메프", "티몬"],
        all_of: &[],
    },
    Signature {
        key: TemplateKey::CardSlipA,
        any_of: &["카드매출전표"],
        all_of: &[],
    },
    Signature {
        key: TemplateKey::CardSlipA,
        any_of: &[],
        all_of: &["매출전표", "구매정보"],
    },
    Signature {
        key: TemplateKey::CardSlipB,
        any_of: &["신용매출전표", "신용승인정보"],
        all_of: &[],
    },
    Signature {
        key: TemplateKey::CardSlipB,
        any_of: &[],
        all_of: &["카드종류", "승인금액"],
    },
    Signature {
        key: TemplateKey::BilingualSlip,
        any_of: &["Subtotal", "SUBTOTAL"],
        all_of: &[],
    },
    Signature {
        key: TemplateKey::BilingualSlip,
        any_of: &["TOTAL", "Total"],
        all_of: &["합계"],
    },
    Signature {
        key: TemplateKey::ConvenienceStore,
        any_of: &["GS25", "씨유", "세븐일레븐", "이마트24", "미니스톱"],
        all_of: &[],
    },
    Signature {
        key: TemplateKey::ConvenienceStore,
        any_of: &[],
        all_of: &["CU", "편의점"],
    },
    Signature {
        key: TemplateKey::MartItemized,
        any_of: &["이마트", "홈플러스", "롯데마트", "하나로마트"],
        all_of: &[],
    },
];

/// Result of heuristic detection.
#[derive(Debug, Clone, Copy)]
pub struct Detection {
    pub key: TemplateKey,
    /// Rough confidence in \[0, 1\]; low for the unknown fallback.
    pub confidence: f32,
}

/// Decide which per-template parser should run for this text.
///
/// Never fails: when no signature matches, the unknown key selects the
/// generic fallback parser with low confidence.
pub fn detect(normalized_text: &str) -> Detection {
    for sig in SIGNATURES {
        let all_hit = sig.all_of.iter().all(|kw| normalized_text.contains(kw));
        if !all_hit {
            continue;
        }
        let any_hits = sig
            .any_of
            .iter()
            .filter(|kw| normalized_text.contains(*kw))
            .count();
        if !sig.any_of.is_empty() && any_hits == 0 {
            continue;
        }

        let signals = any_hits + sig.all_of.len();
        let confidence = (0.6 + 0.1 * signals as f32).min(0.95);
        debug!(template = %sig.key, confidence, "template signature matched");
        return Detection {
            key: sig.key,
            confidence,
        };
    }

    Detection {
        key: TemplateKey::Unknown,
        confidence: 0.2,
    }
}
