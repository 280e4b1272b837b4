//! Online-marketplace and membership-store slips.
//!
//! One parser covers the auction, superstore, search-portal-pay,
//! open-market and bilingual families; they share the common field chains
//! and differ only in which item strategy fires and a few extra labels.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::models::document::OcrDocument;
use crate::models::receipt::{Item, ReceiptResult};
use crate::rules::{extract, first_non_empty, parse_amount};
use crate::template::TemplateKey;

use super::common;
use super::items::{parse_inline, parse_numbered_block, parse_split_block, parse_two_line, post_filter};
use super::ReceiptParser;

lazy_static! {
    static ref ORDER_NO: Regex =
        Regex::new(r"(?:주문|결제|거래)\s*번\s*호\s*[:：]?\s*([\dA-Za-z\-]{4,24})").unwrap();
    static ref PRODUCT_LABELED: Regex = Regex::new(r"상\s*품\s*명\s*[:：]\s*(.+)").unwrap();
    static ref SELLER_LABELED: Regex = Regex::new(r"판\s*매\s*자\s*[:：]?\s*(\S+)").unwrap();
    static ref PAID_LABELED: Regex =
        Regex::new(r"(?:결제\s*금액|주문\s*금액)\s*[:：]?\s*(\d[\d,]*)").unwrap();
}

pub struct MarketplaceParser {
    key: TemplateKey,
}

impl MarketplaceParser {
    pub fn new(key: TemplateKey) -> Self {
        Self { key }
    }
}

impl ReceiptParser for MarketplaceParser {
    fn template(&self) -> TemplateKey {
        self.key
    }

    fn parse(&self, doc: &OcrDocument) -> ReceiptResult {
        let text = doc.text.as_str();
        let lines: Vec<&str> = text.lines().collect();
        let region = common::item_region(&lines);

        // Strategy order differs per family: superstores print numbered or
        // two-line blocks, marketplaces split names from numeric columns.
        let strategies: &[fn(&[&str]) -> Vec<Item>] = match self.key {
            TemplateKey::RetailSuperstore => &[parse_two_line, parse_numbered_block, parse_inline],
            TemplateKey::BilingualSlip => &[parse_inline, parse_two_line],
            _ => &[parse_inline, parse_split_block],
        };
        let mut items = strategies
            .iter()
            .map(|strategy| strategy(region))
            .find(|items| !items.is_empty())
            .unwrap_or_default();

        // Portal-pay histories often list a single labeled product instead
        // of an item table.
        if items.is_empty() {
            if let Some(name) = extract(text, &PRODUCT_LABELED, 1) {
                items = post_filter(vec![Item {
                    name,
                    amount: extract(text, &PAID_LABELED, 1).and_then(|s| parse_amount(&s)),
                    ..Item::default()
                }]);
            }
        }

        let mut meta = common::extract_meta(text);
        meta.receipt_or_order_number = first_non_empty([
            meta.receipt_or_order_number.take(),
            extract(text, &ORDER_NO, 1),
        ]);

        let mut result = ReceiptResult {
            merchant: common::extract_merchant(text),
            meta,
            items,
            totals: common::extract_totals(text),
            payment: common::extract_payment(text),
            customer: common::extract_customer(text),
            approval: common::extract_approval(text),
            ..ReceiptResult::default()
        };

        if let Some(seller) = extract(text, &SELLER_LABELED, 1) {
            result.extra.insert("seller".to_string(), Value::from(seller));
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_portal_pay_single_product() {
        let text = "네이버페이 결제내역\n결제번호: 2025100912345\n상품명: 무선 마우스\n판매자: 한빛전자\n결제금액 23,900";
        let doc = OcrDocument::from_text(text);
        let r = MarketplaceParser::new(TemplateKey::SearchPortalPay).parse(&doc);

        assert_eq!(
            r.meta.receipt_or_order_number.as_deref(),
            Some("2025100912345")
        );
        assert_eq!(r.items.len(), 1);
        assert_eq!(r.items[0].name, "무선 마우스");
        assert_eq!(r.items[0].amount, Some(23900));
        assert_eq!(r.extra.get("seller"), Some(&Value::from("한빛전자")));
        assert_eq!(r.totals.total, Some(23900));
    }

    #[test]
    fn test_superstore_two_line_items() {
        let text = "코스트코 양재점\n사업자번호: 120-81-45514\n상품명\n유기농 바나나\n96312045\n4,990 1 4,990\n합계 4,990\nTOTAL 4,990";
        let doc = OcrDocument::from_text(text);
        let r = MarketplaceParser::new(TemplateKey::RetailSuperstore).parse(&doc);

        assert_eq!(r.items.len(), 1);
        assert_eq!(r.items[0].name, "유기농 바나나");
        assert_eq!(r.items[0].amount, Some(4990));
        assert_eq!(r.totals.total, Some(4990));
    }

    #[test]
    fn test_bilingual_inline_items() {
        let text = "서울식당 SEOUL RESTAURANT\n사업자번호: 211-11-22222\n상품명\n비빔밥 12,000 1 12,000\nSubtotal 12,000\nVAT 1,200\nTotal 13,200\n합계 13,200";
        let doc = OcrDocument::from_text(text);
        let r = MarketplaceParser::new(TemplateKey::BilingualSlip).parse(&doc);

        assert_eq!(r.items.len(), 1);
        assert_eq!(r.items[0].name, "비빔밥");
        assert_eq!(r.totals.vat, Some(1200));
        assert_eq!(r.totals.total, Some(13200));
    }
}
