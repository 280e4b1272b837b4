//! Per-template parsers and the dispatch entry point.

pub mod card_slip;
pub mod common;
pub mod convenience;
pub mod delivery;
pub mod generic;
pub mod items;
pub mod marketplace;
pub mod mart;
pub mod statement;

use std::time::Instant;

use tracing::debug;

use crate::error::{Result, SlipError};
use crate::models::config::SlipConfig;
use crate::models::document::OcrDocument;
use crate::models::receipt::ReceiptResult;
use crate::template::{detect, TemplateKey};
use crate::text::normalize;

/// One layout family's extraction strategy.
///
/// Implementations never fail: every field they cannot recover stays
/// `None`. The only failure lives at the dispatch layer (unknown type
/// key), not here.
pub trait ReceiptParser {
    fn template(&self) -> TemplateKey;
    fn parse(&self, doc: &OcrDocument) -> ReceiptResult;
}

/// Parser selection by template key.
pub fn parser_for(key: TemplateKey) -> Box<dyn ReceiptParser> {
    match key {
        TemplateKey::ConvenienceStore => Box::new(convenience::ConvenienceStoreParser),
        TemplateKey::MartItemized => Box::new(mart::MartItemizedParser),
        TemplateKey::CardSlipA => Box::new(card_slip::CardSlipParser::variant_a()),
        TemplateKey::CardSlipB => Box::new(card_slip::CardSlipParser::variant_b()),
        TemplateKey::DeliveryApp => Box::new(delivery::DeliveryAppParser),
        TemplateKey::TransactionStatement => Box::new(statement::TransactionStatementParser),
        TemplateKey::AuctionMarketplace
        | TemplateKey::RetailSuperstore
        | TemplateKey::SearchPortalPay
        | TemplateKey::OpenMarketSlip
        | TemplateKey::BilingualSlip => Box::new(marketplace::MarketplaceParser::new(key)),
        TemplateKey::Unknown => Box::new(generic::GenericParser),
    }
}

/// A parse outcome with its provenance.
#[derive(Debug, Clone)]
pub struct ParsedReceipt {
    pub receipt: ReceiptResult,

    /// Template whose parser produced the result.
    pub template: TemplateKey,

    /// Detection confidence; 1.0 when the caller named the template.
    pub confidence: f32,

    /// Whether the template came from detection rather than the caller.
    pub detected: bool,

    /// Soft-invariant violations found during reconciliation.
    pub warnings: Vec<String>,

    pub processing_time_ms: u64,
}

/// Parse a document with default configuration.
///
/// `type_key` is the caller-supplied template key (wire form, e.g.
/// `"convenience_store"`); pass `None` to auto-detect. An unrecognized key
/// is a hard error — a typo must not silently downgrade to the generic
/// parser.
pub fn parse_receipt(doc: &OcrDocument, type_key: Option<&str>) -> Result<ParsedReceipt> {
    parse_receipt_with_config(doc, type_key, &SlipConfig::default())
}

/// [`parse_receipt`] with explicit configuration.
pub fn parse_receipt_with_config(
    doc: &OcrDocument,
    type_key: Option<&str>,
    config: &SlipConfig,
) -> Result<ParsedReceipt> {
    let started = Instant::now();

    let mut work = doc.clone();
    work.text = normalize(&doc.text);
    if !config.extraction.use_layout {
        work.tables.clear();
        work.fields.clear();
        work.page = None;
    }

    let (key, confidence, detected) = match type_key {
        Some(raw) => {
            let key = TemplateKey::from_key(raw)
                .ok_or_else(|| SlipError::UnknownTemplate(raw.to_string()))?;
            (key, 1.0, false)
        }
        None => {
            let detection = detect(&work.text);
            (detection.key, detection.confidence, true)
        }
    };

    // No usable text is a data-quality gap, not a caller mistake: the
    // result degrades to an empty record with a warning.
    if work.text.trim().is_empty() && !work.has_layout() {
        debug!(template = %key, "document has no usable text");
        return Ok(ParsedReceipt {
            receipt: ReceiptResult::new(),
            template: key,
            confidence: if detected { 0.0 } else { confidence },
            detected,
            warnings: vec!["document has no usable text".to_string()],
            processing_time_ms: started.elapsed().as_millis() as u64,
        });
    }

    let parser = parser_for(key);
    let mut receipt = parser.parse(&work);

    if !config.extraction.classify_items {
        for item in &mut receipt.items {
            item.category = None;
            item.tax_type = None;
        }
    }

    let warnings = if config.extraction.reconcile {
        receipt.reconcile()
    } else {
        Vec::new()
    };

    debug!(
        template = %key,
        confidence,
        detected,
        warnings = warnings.len(),
        fields = ?receipt.snapshot(),
        "parsed receipt"
    );

    Ok(ParsedReceipt {
        receipt,
        template: key,
        confidence,
        detected,
        warnings,
        processing_time_ms: started.elapsed().as_millis() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::receipt::{ItemCategory, PayType, TaxType};
    use pretty_assertions::assert_eq;

    const GS25_SLIP: &str = "GS25 강남점\n사업자번호: 211-87-12345\nTEL: 02-555-1234\n거래일시: 2025-10-09 14:33:21\n상품명 단가 수량 금액\n삼각김밥 1,500 1 1,500\n*생수 800 1 800\n합계 2,300\n받은금액 2,300\n신한카드\n카드번호: 1234-56**-****-7890\n승인번호: 30012345";

    #[test]
    fn test_convenience_slip_end_to_end() {
        let doc = OcrDocument::from_text(GS25_SLIP);
        let parsed = parse_receipt(&doc, None).unwrap();

        assert_eq!(parsed.template, TemplateKey::ConvenienceStore);
        assert!(parsed.detected);
        assert!(parsed.confidence > 0.5);

        let r = &parsed.receipt;
        assert_eq!(r.merchant.name.as_deref(), Some("GS25 강남점"));
        assert_eq!(
            r.merchant.business_registration_number.as_deref(),
            Some("211-87-12345")
        );
        assert_eq!(r.meta.sale_date.as_deref(), Some("2025-10-09"));
        assert_eq!(r.meta.sale_time.as_deref(), Some("14:33:21"));
        assert_eq!(r.items.len(), 2);
        assert_eq!(r.items[0].name, "삼각김밥");
        assert_eq!(r.items[0].amount, Some(1500));
        assert_eq!(r.items[1].tax_flag.as_deref(), Some("*"));
        assert_eq!(r.items[1].tax_type, Some(TaxType::Unknown));
        assert_eq!(r.totals.total, Some(2300));
        assert_eq!(r.payment.pay_type, Some(PayType::Card));
        assert_eq!(
            r.payment.masked_card_number.as_deref(),
            Some("1234-56**-****-7890")
        );
        assert_eq!(r.approval.approval_number.as_deref(), Some("30012345"));
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_convenience_slip_qty_first_columns() {
        // Some vendors print qty before the unit price on item lines.
        let text = "GS25 강남점\n2025-10-09\n삼각김밥 1 1500 1500\n합계 1500";
        let doc = OcrDocument::from_text(text);
        let parsed = parse_receipt(&doc, None).unwrap();

        let r = &parsed.receipt;
        assert_eq!(r.merchant.name.as_deref(), Some("GS25 강남점"));
        assert_eq!(r.meta.sale_date.as_deref(), Some("2025-10-09"));
        assert_eq!(r.items.len(), 1);
        assert_eq!(r.items[0].name, "삼각김밥");
        assert_eq!(r.items[0].qty, Some(1));
        assert_eq!(r.items[0].unit_price, Some(1500));
        assert_eq!(r.items[0].amount, Some(1500));
        assert_eq!(r.totals.total, Some(1500));
    }

    #[test]
    fn test_total_recovered_from_supply_and_vat() {
        // The total label is garbled beyond recognition; supply + vat
        // reconstructs it.
        let text = "이마트 성수점\n1) 상품 1,100\n공급가액 1,000\n부가세 100";
        let doc = OcrDocument::from_text(text);
        let parsed = parse_receipt(&doc, None).unwrap();

        assert_eq!(parsed.template, TemplateKey::MartItemized);
        assert_eq!(parsed.receipt.totals.total, Some(1100));
        assert_eq!(parsed.receipt.totals.taxable_amount, Some(1000));
        assert_eq!(parsed.receipt.totals.vat, Some(100));
    }

    #[test]
    fn test_exception_name_classified_other() {
        // 칼국수 is food to a reader but carries the 칼 prefix the supply
        // keyword list matches; the exception list pins it to Other.
        let text = "한빛분식\n상품명\n칼국수 8,000 1 8,000\n김밥 3,000 1 3,000\n합계 11,000";
        let doc = OcrDocument::from_text(text);
        let parsed = parse_receipt(&doc, Some("unknown")).unwrap();

        let items = &parsed.receipt.items;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].category, Some(ItemCategory::Other));
        assert_eq!(items[0].category.map(|c| c.code()), Some(3));
        assert_eq!(items[1].category, Some(ItemCategory::Food));
    }

    #[test]
    fn test_unknown_type_key_is_hard_error() {
        let doc = OcrDocument::from_text(GS25_SLIP);
        let err = parse_receipt(&doc, Some("Convenience_Store")).unwrap_err();
        assert!(matches!(err, SlipError::UnknownTemplate(key) if key == "Convenience_Store"));
    }

    #[test]
    fn test_blank_document_degrades() {
        let doc = OcrDocument::from_text("   \n  ");
        let parsed = parse_receipt(&doc, None).unwrap();
        assert_eq!(parsed.template, TemplateKey::Unknown);
        assert_eq!(parsed.confidence, 0.0);
        assert!(parsed.receipt.items.is_empty());
        assert_eq!(parsed.warnings.len(), 1);
        assert!(parsed.warnings[0].contains("no usable text"));
    }

    #[test]
    fn test_blank_document_with_explicit_key() {
        let doc = OcrDocument::from_text("");
        let parsed = parse_receipt(&doc, Some("unknown")).unwrap();
        assert_eq!(parsed.template, TemplateKey::Unknown);
        assert!(!parsed.detected);
        assert_eq!(parsed.warnings.len(), 1);

        // A bad key is still a caller mistake, blank text or not.
        let err = parse_receipt(&doc, Some("bogus")).unwrap_err();
        assert!(matches!(err, SlipError::UnknownTemplate(_)));
    }

    #[test]
    fn test_explicit_key_skips_detection() {
        let doc = OcrDocument::from_text(GS25_SLIP);
        let parsed = parse_receipt(&doc, Some("mart_itemized")).unwrap();
        assert_eq!(parsed.template, TemplateKey::MartItemized);
        assert!(!parsed.detected);
        assert_eq!(parsed.confidence, 1.0);
    }

    #[test]
    fn test_classify_toggle_off() {
        let mut config = SlipConfig::default();
        config.extraction.classify_items = false;

        let doc = OcrDocument::from_text(GS25_SLIP);
        let parsed = parse_receipt_with_config(&doc, None, &config).unwrap();
        assert!(parsed.receipt.items.iter().all(|i| i.category.is_none()));
    }

    #[test]
    fn test_reconcile_warning_surfaces() {
        let text = "GS25 강남점\n상품명\n삼각김밥 1,500 2 4,000\n합계 4,000";
        let doc = OcrDocument::from_text(text);
        let parsed = parse_receipt(&doc, None).unwrap();
        assert_eq!(parsed.warnings.len(), 1);
        assert!(parsed.warnings[0].contains("삼각김밥"));
    }
}
