//! Delivery-app order confirmations (배달의민족, 요기요, 쿠팡이츠).
//!
//! Menu lines carry a quantity and amount; option lines are prefixed and
//! attach to the menu item above them. The delivery tip has no slot in the
//! common totals and goes to `extra`.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::models::document::OcrDocument;
use crate::models::receipt::{Item, ReceiptResult};
use crate::rules::{extract, parse_amount};
use crate::template::TemplateKey;

use super::common;
use super::items::{parse_split_block, post_filter};
use super::ReceiptParser;

lazy_static! {
    static ref ORDER_NO: Regex =
        Regex::new(r"주\s*문\s*번\s*호\s*[:：]?\s*([\dA-Za-z\-]{4,24})").unwrap();
    static ref DELIVERY_TIP: Regex =
        Regex::new(r"배\s*달\s*팁\s*[:：]?\s*(\d[\d,]*)").unwrap();
    // `menu qty amount`; delivery apps rarely print a unit price column.
    static ref MENU_LINE: Regex =
        Regex::new(r"^(\S[^\d\n]*?)\s+(\d{1,2})\s+(\d[\d,]*)$").unwrap();
}

pub struct DeliveryAppParser;

/// Menu lines plus prefixed option lines, in printed order.
fn parse_menu_lines(lines: &[&str]) -> Vec<Item> {
    let mut items: Vec<Item> = Vec::new();

    for line in lines {
        let line = line.trim();
        if let Some(caps) = MENU_LINE.captures(line) {
            items.push(Item {
                name: caps[1].trim().to_string(),
                qty: parse_amount(&caps[2]),
                amount: parse_amount(&caps[3]),
                ..Item::default()
            });
            continue;
        }

        let option = line
            .strip_prefix('└')
            .or_else(|| line.strip_prefix('+'))
            .or_else(|| line.strip_prefix('ㄴ'));
        if let (Some(option), Some(last)) = (option, items.last_mut()) {
            let option = option.trim();
            match &mut last.option {
                Some(existing) => {
                    existing.push_str(", ");
                    existing.push_str(option);
                }
                slot => *slot = Some(option.to_string()),
            }
        }
    }

    post_filter(items)
}

impl ReceiptParser for DeliveryAppParser {
    fn template(&self) -> TemplateKey {
        TemplateKey::DeliveryApp
    }

    fn parse(&self, doc: &OcrDocument) -> ReceiptResult {
        let text = doc.text.as_str();
        let lines: Vec<&str> = text.lines().collect();
        let region = common::item_region(&lines);

        let mut items = parse_menu_lines(region);
        if items.is_empty() {
            items = parse_split_block(region);
        }

        let mut meta = common::extract_meta(text);
        if meta.receipt_or_order_number.is_none() {
            meta.receipt_or_order_number = extract(text, &ORDER_NO, 1);
        }

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

        if let Some(tip) = extract(text, &DELIVERY_TIP, 1).and_then(|s| parse_amount(&s)) {
            result
                .extra
                .insert("delivery_tip".to_string(), Value::from(tip));
        }

        result
    }
}
