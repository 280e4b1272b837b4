//! Two-party B2B transaction statements (거래명세서).
//!
//! Supplier and buyer blocks print side by side. When the OCR provider
//! supplies form fields with geometry, column membership comes from the
//! horizontal center of each value box; otherwise the text is split into
//! windows anchored at the 공급자/공급받는자 markers.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::models::document::{FormField, OcrDocument, OcrTable};
use crate::models::receipt::{Item, ReceiptResult};
use crate::rules::bizno::{extract_bizno, normalize_bizno};
use crate::rules::patterns::{ADDRESS_LABELED, AMOUNT_TOKEN, MERCHANT_NAME_LABELED, REPRESENTATIVE};
use crate::rules::{extract, parse_amount};
use crate::template::TemplateKey;

use super::common;
use super::items::{parse_numbered_block, parse_split_block, parse_two_line, post_filter};
use super::ReceiptParser;

lazy_static! {
    static ref SUPPLIER_MARK: Regex = Regex::new(r"공\s*급\s*자").unwrap();
    static ref RECEIVER_MARK: Regex = Regex::new(r"공\s*급\s*받\s*는\s*자").unwrap();
    static ref BUSINESS_TYPE: Regex = Regex::new(r"업\s*태\s*[:：]?\s*(\S+)").unwrap();
    static ref BUSINESS_ITEM: Regex = Regex::new(r"종\s*목\s*[:：]?\s*(\S+)").unwrap();
    static ref TOTALS_ROW: Regex = Regex::new(r"합\s*계").unwrap();
    static ref PREVIOUS_BALANCE: Regex =
        Regex::new(r"(?:전\s*잔\s*액|전\s*미\s*수\s*액?)\s*[:：]?\s*(\d[\d,]*)").unwrap();
    static ref CURRENT_BALANCE: Regex =
        Regex::new(r"(?:합\s*계\s*잔\s*액|총\s*잔\s*액|미\s*수\s*금)\s*[:：]?\s*(\d[\d,]*)").unwrap();
}

/// One side of the statement.
#[derive(Debug, Clone, Default, Serialize)]
struct Party {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    business_registration_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    representative: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    business_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    business_item: Option<String>,
}

impl Party {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.business_registration_number.is_none()
            && self.representative.is_none()
    }

    fn from_text(window: &str) -> Self {
        Self {
            name: extract(window, &MERCHANT_NAME_LABELED, 1),
            business_registration_number: extract_bizno(window),
            representative: extract(window, &REPRESENTATIVE, 1),
            address: extract(window, &ADDRESS_LABELED, 1),
            business_type: extract(window, &BUSINESS_TYPE, 1),
            business_item: extract(window, &BUSINESS_ITEM, 1),
        }
    }

    fn set_field(&mut self, label: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        if label.contains("상호") {
            self.name = Some(value.to_string());
        } else if label.contains("사업자") || label.contains("등록번호") {
            self.business_registration_number = Some(normalize_bizno(value));
        } else if label.contains("대표") {
            self.representative = Some(value.to_string());
        } else if label.contains("주소") || label.contains("소재지") {
            self.address = Some(value.to_string());
        } else if label.contains("업태") {
            self.business_type = Some(value.to_string());
        } else if label.contains("종목") {
            self.business_item = Some(value.to_string());
        }
    }
}

/// Totals row shapes, by numeric arity:
/// 3 = supply/tax/total, 4 = supply/tax/service/total,
/// 5+ = the last four columns carry the money.
#[derive(Debug, Clone, Copy, Default)]
struct StatementTotals {
    supply: Option<i64>,
    tax: Option<i64>,
    service: Option<i64>,
    total: Option<i64>,
}

fn parse_totals_row(text: &str) -> StatementTotals {
    for line in text.lines() {
        if !TOTALS_ROW.is_match(line) {
            continue;
        }
        let nums: Vec<i64> = AMOUNT_TOKEN
            .find_iter(line)
            .filter_map(|m| parse_amount(m.as_str()))
            .collect();

        let cols: &[i64] = match nums.len() {
            0..=2 => continue,
            3 => &nums,
            4 => &nums,
            _ => &nums[nums.len() - 4..],
        };

        // Printed columns can be off by a won from rounding.
        let fits = |supply: i64, tax: i64, service: i64, total: i64| {
            (supply + tax + service - total).abs() <= 1
        };

        if cols.len() == 4 {
            if fits(cols[0], cols[1], cols[2], cols[3]) {
                return StatementTotals {
                    supply: Some(cols[0]),
                    tax: Some(cols[1]),
                    service: Some(cols[2]),
                    total: Some(cols[3]),
                };
            }
            // First column is a quantity or count; reread as three money
            // columns.
            if fits(cols[1], cols[2], 0, cols[3]) {
                return StatementTotals {
                    supply: Some(cols[1]),
                    tax: Some(cols[2]),
                    service: None,
                    total: Some(cols[3]),
                };
            }
        }
        if cols.len() >= 3 {
            let last3 = &cols[cols.len() - 3..];
            if fits(last3[0], last3[1], 0, last3[2]) {
                return StatementTotals {
                    supply: Some(last3[0]),
                    tax: Some(last3[1]),
                    service: None,
                    total: Some(last3[2]),
                };
            }
            // Columns present but inconsistent; keep the grand total only.
            return StatementTotals {
                total: Some(last3[2]),
                ..StatementTotals::default()
            };
        }
    }
    StatementTotals::default()
}

/// Items read from OCR-recognized tables. The first header row names the
/// columns; a name column is required, the money columns are optional.
fn items_from_tables(tables: &[OcrTable]) -> Vec<Item> {
    let mut items = Vec::new();
    for table in tables {
        let Some(head) = table.header.first() else {
            continue;
        };
        let col = |keys: &[&str]| {
            head.iter()
                .position(|cell| keys.iter().any(|k| cell.contains(k)))
        };
        let Some(name_col) = col(&["품목", "품명", "상품"]) else {
            continue;
        };
        let qty_col = col(&["수량"]);
        let unit_col = col(&["단가"]);
        let amount_col = col(&["공급가액"]).or_else(|| col(&["금액"]));

        for row in &table.body {
            let Some(name) = row
                .get(name_col)
                .map(|c| c.trim())
                .filter(|c| !c.is_empty())
            else {
                continue;
            };
            let money =
                |idx: Option<usize>| idx.and_then(|i| row.get(i)).and_then(|c| parse_amount(c));
            items.push(Item {
                name: name.to_string(),
                qty: money(qty_col),
                unit_price: money(unit_col),
                amount: money(amount_col),
                ..Item::default()
            });
        }
    }
    post_filter(items)
}

/// Split form fields into supplier (left) and buyer (right) columns by the
/// horizontal center of each value box.
fn parties_from_layout(fields: &[FormField], page_width: f32) -> (Party, Party) {
    let mut supplier = Party::default();
    let mut receiver = Party::default();
    let mid = page_width / 2.0;

    for field in fields {
        let Some(bbox) = field.bbox else { continue };
        let party = if bbox.center_x() < mid {
            &mut supplier
        } else {
            &mut receiver
        };
        party.set_field(&field.label, &field.value);
    }

    (supplier, receiver)
}

/// A scan window from `start` to the nearest following marker, capped at
/// roughly 300 bytes when no marker follows.
fn marker_window<'a>(text: &'a str, start: usize, marker_positions: &[Option<usize>]) -> &'a str {
    let end = marker_positions
        .iter()
        .flatten()
        .copied()
        .filter(|&p| p > start)
        .min()
        .unwrap_or_else(|| {
            let mut cap = (start + 300).min(text.len());
            while !text.is_char_boundary(cap) {
                cap -= 1;
            }
            cap
        });
    &text[start..end]
}

/// Fallback: windows anchored at the party markers, each running to the
/// next marker or to the item table.
fn parties_from_text(text: &str) -> (Party, Party) {
    let receiver_pos = RECEIVER_MARK.find(text).map(|m| m.start());
    let supplier_pos = SUPPLIER_MARK
        .find_iter(text)
        .map(|m| m.start())
        .find(|&pos| Some(pos) != receiver_pos);
    let markers = [receiver_pos, supplier_pos];

    let supplier = supplier_pos
        .map(|pos| Party::from_text(marker_window(text, pos, &markers)))
        .unwrap_or_default();
    let receiver = receiver_pos
        .map(|pos| Party::from_text(marker_window(text, pos, &markers)))
        .unwrap_or_default();

    (supplier, receiver)
}

pub struct TransactionStatementParser;

impl ReceiptParser for TransactionStatementParser {
    fn template(&self) -> TemplateKey {
        TemplateKey::TransactionStatement
    }

    fn parse(&self, doc: &OcrDocument) -> ReceiptResult {
        let text = doc.text.as_str();

        // Layout data with one side empty means the column split went
        // wrong (OCR reading order interleaves the columns); any empty
        // side is refilled from the marker-anchored text windows.
        let (supplier, receiver) = match (doc.has_layout(), doc.page) {
            (true, Some(page)) => {
                let (s, r) = parties_from_layout(&doc.fields, page.width);
                if s.is_empty() || r.is_empty() {
                    let (ts, tr) = parties_from_text(text);
                    (
                        if s.is_empty() { ts } else { s },
                        if r.is_empty() { tr } else { r },
                    )
                } else {
                    (s, r)
                }
            }
            _ => parties_from_text(text),
        };

        // Structured table rows beat the text strategies when present.
        let mut items = items_from_tables(&doc.tables);
        if items.is_empty() {
            let lines: Vec<&str> = text.lines().collect();
            let region = common::item_region(&lines);
            items = parse_numbered_block(region);
            if items.is_empty() {
                items = parse_two_line(region);
            }
            if items.is_empty() {
                items = parse_split_block(region);
            }
        }

        let st = parse_totals_row(text);
        let mut totals = common::extract_totals(text);
        totals.taxable_amount = st.supply.or(totals.taxable_amount);
        totals.vat = st.tax.or(totals.vat);
        totals.total = st.total.or(totals.total);

        // The supplier is the issuing merchant.
        let mut result = ReceiptResult {
            merchant: crate::models::receipt::Merchant {
                name: supplier.name.clone(),
                business_registration_number: supplier.business_registration_number.clone(),
                phone: None,
                address: supplier.address.clone(),
            },
            meta: common::extract_meta(text),
            items,
            totals,
            ..ReceiptResult::default()
        };

        if let Ok(value) = serde_json::to_value(&supplier) {
            result.extra.insert("supplier".to_string(), value);
        }
        if let Ok(value) = serde_json::to_value(&receiver) {
            result.extra.insert("receiver".to_string(), value);
        }
        if let Some(service) = st.service {
            result
                .extra
                .insert("service_charge".to_string(), Value::from(service));
        }
        if let Some(balance) = extract(text, &PREVIOUS_BALANCE, 1).and_then(|s| parse_amount(&s)) {
            result
                .extra
                .insert("previous_balance".to_string(), Value::from(balance));
        }
        if let Some(balance) = extract(text, &CURRENT_BALANCE, 1).and_then(|s| parse_amount(&s)) {
            result
                .extra
                .insert("current_balance".to_string(), Value::from(balance));
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::{BoundingBox, PageSize};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_totals_row_three_columns() {
        let st = parse_totals_row("합계 100,000 10,000 110,000");
        assert_eq!(st.supply, Some(100_000));
        assert_eq!(st.tax, Some(10_000));
        assert_eq!(st.total, Some(110_000));
        assert_eq!(st.service, None);
    }

    #[test]
    fn test_totals_row_four_columns_with_service() {
        let st = parse_totals_row("합계 100,000 10,000 5,000 115,000");
        assert_eq!(st.supply, Some(100_000));
        assert_eq!(st.service, Some(5000));
        assert_eq!(st.total, Some(115_000));
    }

    #[test]
    fn test_totals_row_leading_count_downgrades() {
        // First column is an item count, not money.
        let st = parse_totals_row("합계 1,200 100,000 10,000 110,000");
        assert_eq!(st.supply, Some(100_000));
        assert_eq!(st.tax, Some(10_000));
        assert_eq!(st.service, None);
        assert_eq!(st.total, Some(110_000));
    }

    #[test]
    fn test_totals_row_off_by_one_won() {
        let st = parse_totals_row("합계 33,333 3,333 36,667");
        assert_eq!(st.total, Some(36_667));
        assert_eq!(st.supply, Some(33_333));
    }

    #[test]
    fn test_parties_from_text_windows() {
        let text = "거래명세서\n공급자\n상호: (주)한빛상사\n사업자번호: 123-45-67890\n대표자: 김한빛\n공급받는자\n상호: (주)모던식자재\n사업자번호: 222-33-44444";
        let (supplier, receiver) = parties_from_text(text);
        assert_eq!(supplier.name.as_deref(), Some("(주)한빛상사"));
        assert_eq!(
            supplier.business_registration_number.as_deref(),
            Some("123-45-67890")
        );
        assert_eq!(supplier.representative.as_deref(), Some("김한빛"));
        assert_eq!(receiver.name.as_deref(), Some("(주)모던식자재"));
        assert_eq!(
            receiver.business_registration_number.as_deref(),
            Some("222-33-44444")
        );
    }

    #[test]
    fn test_parties_from_layout_column_split() {
        let bbox = |x: f32| {
            Some(BoundingBox {
                x,
                y: 40.0,
                width: 60.0,
                height: 12.0,
            })
        };
        let doc = OcrDocument {
            text: "거래명세서".to_string(),
            fields: vec![
                FormField {
                    label: "상호".to_string(),
                    value: "(주)한빛상사".to_string(),
                    bbox: bbox(30.0),
                },
                FormField {
                    label: "등록번호".to_string(),
                    value: "1234567890".to_string(),
                    bbox: bbox(30.0),
                },
                FormField {
                    label: "상호".to_string(),
                    value: "(주)모던식자재".to_string(),
                    bbox: bbox(260.0),
                },
            ],
            page: Some(PageSize {
                width: 400.0,
                height: 800.0,
            }),
            ..OcrDocument::default()
        };

        let (supplier, receiver) = parties_from_layout(&doc.fields, 400.0);
        assert_eq!(supplier.name.as_deref(), Some("(주)한빛상사"));
        assert_eq!(
            supplier.business_registration_number.as_deref(),
            Some("123-45-67890")
        );
        assert_eq!(receiver.name.as_deref(), Some("(주)모던식자재"));
    }

    #[test]
    fn test_layout_one_side_empty_falls_back_to_text() {
        // Every form field landed left of midpage, so the layout split
        // leaves the receiver empty; its fields come from the text windows.
        let text = "거래명세서\n공급자\n상호: (주)한빛상사\n사업자번호: 123-45-67890\n공급받는자\n상호: (주)모던식자재\n사업자번호: 222-33-44444\n합계 100,000 10,000 110,000";
        let bbox = Some(BoundingBox {
            x: 20.0,
            y: 40.0,
            width: 60.0,
            height: 12.0,
        });
        let doc = OcrDocument {
            text: text.to_string(),
            fields: vec![
                FormField {
                    label: "상호".to_string(),
                    value: "(주)한빛상사".to_string(),
                    bbox,
                },
                FormField {
                    label: "등록번호".to_string(),
                    value: "1234567890".to_string(),
                    bbox,
                },
            ],
            page: Some(PageSize {
                width: 400.0,
                height: 800.0,
            }),
            ..OcrDocument::default()
        };

        let r = TransactionStatementParser.parse(&doc);
        assert_eq!(r.merchant.name.as_deref(), Some("(주)한빛상사"));
        assert_eq!(
            r.merchant.business_registration_number.as_deref(),
            Some("123-45-67890")
        );
        let receiver = r.extra.get("receiver").unwrap();
        assert_eq!(receiver["name"], "(주)모던식자재");
        assert_eq!(receiver["business_registration_number"], "222-33-44444");
    }

    #[test]
    fn test_items_from_table_rows() {
        let doc = OcrDocument {
            text: "거래명세서\n공급자\n상호: (주)한빛상사\n공급받는자\n상호: (주)모던식자재\n합계 100,000 10,000 110,000".to_string(),
            tables: vec![OcrTable {
                header: vec![vec![
                    "품목".to_string(),
                    "수량".to_string(),
                    "단가".to_string(),
                    "공급가액".to_string(),
                ]],
                body: vec![
                    vec![
                        "식용유 18L".to_string(),
                        "2".to_string(),
                        "30,000".to_string(),
                        "60,000".to_string(),
                    ],
                    vec![
                        "밀가루 20kg".to_string(),
                        "2".to_string(),
                        "20,000".to_string(),
                        "40,000".to_string(),
                    ],
                ],
            }],
            ..OcrDocument::default()
        };

        let r = TransactionStatementParser.parse(&doc);
        assert_eq!(r.items.len(), 2);
        assert_eq!(r.items[0].name, "식용유 18L");
        assert_eq!(r.items[0].qty, Some(2));
        assert_eq!(r.items[0].unit_price, Some(30_000));
        assert_eq!(r.items[0].amount, Some(60_000));
        assert_eq!(r.items[1].name, "밀가루 20kg");
    }

    #[test]
    fn test_full_statement_parse() {
        let text = "거래명세서\n발행일자: 2025-10-01\n공급자\n상호: (주)한빛상사\n사업자번호: 123-45-67890\n공급받는자\n상호: (주)모던식자재\n사업자번호: 222-33-44444\n품목\n1) 식용유 18L\n30,000 2 60,000\n2) 밀가루 20kg\n20,000 2 40,000\n합계 100,000 10,000 110,000\n전잔액 50,000\n합계잔액 160,000";
        let doc = OcrDocument::from_text(text);
        let r = TransactionStatementParser.parse(&doc);

        assert_eq!(r.merchant.name.as_deref(), Some("(주)한빛상사"));
        assert_eq!(r.items.len(), 2);
        assert_eq!(r.totals.taxable_amount, Some(100_000));
        assert_eq!(r.totals.vat, Some(10_000));
        assert_eq!(r.totals.total, Some(110_000));
        assert_eq!(r.extra.get("previous_balance"), Some(&Value::from(50_000)));
        assert_eq!(r.extra.get("current_balance"), Some(&Value::from(160_000)));
        let receiver = r.extra.get("receiver").unwrap();
        assert_eq!(receiver["name"], "(주)모던식자재");
    }
}
