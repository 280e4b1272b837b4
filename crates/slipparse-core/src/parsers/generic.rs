//! Generic fallback for slips no signature recognizes.
//!
//! Runs the common field chains and conservative item strategies only.
//! Never fails: an unrecognized slip still yields whatever fields the
//! shared rules can recover.

use crate::models::document::OcrDocument;
use crate::models::receipt::ReceiptResult;
use crate::template::TemplateKey;

use super::common;
use super::items::{parse_inline, parse_numbered_block, parse_two_line};
use super::ReceiptParser;

pub struct GenericParser;

impl ReceiptParser for GenericParser {
    fn template(&self) -> TemplateKey {
        TemplateKey::Unknown
    }

    fn parse(&self, doc: &OcrDocument) -> ReceiptResult {
        let text = doc.text.as_str();
        let lines: Vec<&str> = text.lines().collect();
        let region = common::item_region(&lines);

        let mut items = parse_inline(region);
        if items.is_empty() {
            items = parse_numbered_block(region);
        }
        if items.is_empty() {
            items = parse_two_line(region);
        }

        ReceiptResult {
            merchant: common::extract_merchant(text),
            meta: common::extract_meta(text),
            items,
            totals: common::extract_totals(text),
            payment: common::extract_payment(text),
            customer: common::extract_customer(text),
            approval: common::extract_approval(text),
            ..ReceiptResult::default()
        }
    }
}
