//! Marketplace card sales slips (매출전표).
//!
//! Variant A carries a 구매정보 item block alongside the approval section;
//! variant B is the bare 신용승인 layout with approval data only. Both are
//! payment-heavy: the card and approval fields matter more than items.

use crate::models::document::OcrDocument;
use crate::models::receipt::ReceiptResult;
use crate::template::TemplateKey;

use super::common;
use super::items::{parse_inline, parse_split_block};
use super::ReceiptParser;

pub struct CardSlipParser {
    variant: TemplateKey,
}

impl CardSlipParser {
    pub fn variant_a() -> Self {
        Self {
            variant: TemplateKey::CardSlipA,
        }
    }

    pub fn variant_b() -> Self {
        Self {
            variant: TemplateKey::CardSlipB,
        }
    }
}

impl ReceiptParser for CardSlipParser {
    fn template(&self) -> TemplateKey {
        self.variant
    }

    fn parse(&self, doc: &OcrDocument) -> ReceiptResult {
        let text = doc.text.as_str();

        let items = if self.variant == TemplateKey::CardSlipA {
            let lines: Vec<&str> = text.lines().collect();
            let region = common::item_region(&lines);
            let parsed = parse_inline(region);
            if parsed.is_empty() {
                parse_split_block(region)
            } else {
                parsed
            }
        } else {
            Vec::new()
        };

        let payment = common::extract_payment(text);
        let mut totals = common::extract_totals(text);
        // On a card slip the approved amount is the card amount.
        if totals.card_amount.is_none() {
            totals.card_amount = payment.approval_amount;
        }
        if totals.total.is_none() {
            totals.total = payment.approval_amount;
        }

        ReceiptResult {
            merchant: common::extract_merchant(text),
            meta: common::extract_meta(text),
            items,
            totals,
            payment,
            customer: common::extract_customer(text),
            approval: common::extract_approval(text),
            ..ReceiptResult::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use crate::models::receipt::PayType;

    #[test]
    fn test_variant_a_with_items() {
        let text = "카드매출전표\n가맹점명: 한빛상사\n사업자번호: 123-45-67890\n구매정보\n노트 2,000 2 4,000\n볼펜 1,000 1 1,000\n합계 5,000\n신한카드\n카드번호: 1234-56**-****-7890\n승인번호: 30012345\n승인금액 5,000";
        let doc = OcrDocument::from_text(text);
        let r = CardSlipParser::variant_a().parse(&doc);

        assert_eq!(r.merchant.name.as_deref(), Some("한빛상사"));
        assert_eq!(r.items.len(), 2);
        assert_eq!(r.items[0].name, "노트");
        assert_eq!(r.payment.pay_type, Some(PayType::Card));
        assert_eq!(r.payment.approval_amount, Some(5000));
        assert_eq!(r.totals.card_amount, Some(5000));
        assert_eq!(r.approval.approval_number.as_deref(), Some("30012345"));
    }

    #[test]
    fn test_variant_b_approval_only() {
        let text = "신용승인정보\n카드종류 KB국민카드\n카드번호 9410-12**-****-3456\n승인번호 87654321\n승인금액 32,000\n일시불\n가맹점번호 123456789\n매입사 KB국민";
        let doc = OcrDocument::from_text(text);
        let r = CardSlipParser::variant_b().parse(&doc);

        assert!(r.items.is_empty());
        assert_eq!(r.payment.card_brand.as_deref(), Some("KB국민카드"));
        assert_eq!(r.payment.masked_card_number.as_deref(), Some("9410-12**-****-3456"));
        assert_eq!(r.payment.installment_plan.as_deref(), Some("일시불"));
        assert_eq!(r.totals.total, Some(32000));
        assert_eq!(r.approval.merchant_number.as_deref(), Some("123456789"));
        assert_eq!(r.approval.acquirer.as_deref(), Some("KB국민"));
    }
}
