//! Mart itemized receipts (이마트, 홈플러스, ...).
//!
//! Long numbered item blocks, per-line discounts, loyalty points and a
//! 과세/면세 totals breakdown.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::document::OcrDocument;
use crate::models::receipt::ReceiptResult;
use crate::rules::{extract, parse_amount};
use crate::template::TemplateKey;

use super::common;
use super::items::{parse_numbered_block, parse_two_line};
use super::ReceiptParser;

lazy_static! {
    static ref LINE_DISCOUNT: Regex =
        Regex::new(r"(?:행사|카드)?\s*할인\s*[:：]?\s*-?\s*(\d[\d,]*)").unwrap();
}

pub struct MartItemizedParser;

impl ReceiptParser for MartItemizedParser {
    fn template(&self) -> TemplateKey {
        TemplateKey::MartItemized
    }

    fn parse(&self, doc: &OcrDocument) -> ReceiptResult {
        let text = doc.text.as_str();
        let lines: Vec<&str> = text.lines().collect();
        let region = common::item_region(&lines);

        let mut items = parse_numbered_block(region);
        if items.is_empty() {
            items = parse_two_line(region);
        }

        let mut totals = common::extract_totals(text);
        if totals.discount.is_none() {
            totals.discount = extract(text, &LINE_DISCOUNT, 1).and_then(|s| parse_amount(&s));
        }

        ReceiptResult {
            merchant: common::extract_merchant(text),
            meta: common::extract_meta(text),
            items,
            totals,
            payment: common::extract_payment(text),
            customer: common::extract_customer(text),
            approval: common::extract_approval(text),
            ..ReceiptResult::default()
        }
    }
}
