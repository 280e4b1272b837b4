//! Normalized transaction record produced by the parsers.
//!
//! A fresh [`ReceiptResult`] is allocated per parse invocation, populated
//! best-effort, and never mutated after it is returned. "Could not find X"
//! is always `X = None`, never an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Fixed floor (in won) for the 2% reconciliation tolerance.
pub const RECONCILE_FLOOR: i64 = 10;

/// `|a - b| <= max(floor, 2% of reference)`.
pub fn within_tolerance(a: i64, b: i64, reference: i64) -> bool {
    let tol = RECONCILE_FLOOR.max(reference.abs() / 50);
    (a - b).abs() <= tol
}

/// The complete parsed receipt/slip record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReceiptResult {
    /// Merchant (store) identification.
    pub merchant: Merchant,

    /// Transaction metadata.
    pub meta: Meta,

    /// Line items, in printed order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Item>,

    /// Monetary totals.
    pub totals: Totals,

    /// Payment details.
    pub payment: Payment,

    /// Customer / membership details.
    pub customer: Customer,

    /// Card approval details.
    pub approval: Approval,

    /// Template-specific fields with no slot in the common schema
    /// (e.g. a B2B statement's previous balance).
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, Value>,
}

/// Merchant identification fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Merchant {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Business registration number, always in canonical `NNN-NN-NNNNN`
    /// form when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_registration_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Transaction metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Meta {
    /// Sale date in canonical `yyyy-mm-dd` form, if recovered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_time: Option<String>,

    /// Receipt or order number, whichever the slip carries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_or_order_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub register_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cashier: Option<String>,
}

/// A single line item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Item {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_no: Option<u32>,

    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,

    /// Raw tax flag string as printed (e.g. `*` or `면세`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_flag: Option<String>,

    /// Option/variant text (delivery-app menus mostly).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub qty: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,

    /// Coarse item category from the classifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ItemCategory>,

    /// Tax type derived from `tax_flag`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_type: Option<TaxType>,
}

/// Coarse item category codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    /// Food / beverage.
    Food,
    /// Consumable supply.
    Supply,
    /// Everything else.
    Other,
}

impl ItemCategory {
    /// Numeric code used by downstream accounting.
    pub fn code(&self) -> u8 {
        match self {
            ItemCategory::Food => 1,
            ItemCategory::Supply => 2,
            ItemCategory::Other => 3,
        }
    }
}

/// VAT categorization codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxType {
    /// Subject to VAT (과세).
    Taxable,
    /// VAT exempt (면세).
    TaxFree,
    /// Flag missing or unrecognized.
    Unknown,
}

impl TaxType {
    /// Numeric code used by downstream accounting.
    pub fn code(&self) -> u8 {
        match self {
            TaxType::Taxable => 1,
            TaxType::TaxFree => 2,
            TaxType::Unknown => 3,
        }
    }
}

/// Monetary totals, all in won.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Totals {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_free_amount: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_amount: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cash_amount: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxable_amount: Option<i64>,
}

/// How the transaction was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayType {
    Cash,
    Card,
    /// 간편결제 (Naver Pay, Kakao Pay, ...).
    SimplePay,
}

/// Payment details.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Payment {
    /// Inferred from card-brand presence; a known heuristic weakness for
    /// card slips that print no recognizable brand label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pay_type: Option<PayType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_brand: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub masked_card_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_amount: Option<i64>,

    /// `일시불` or `N개월`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installment_plan: Option<String>,

    /// Card number exactly as printed, before mask cleanup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_number_raw: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_time: Option<String>,

    /// Merchant label as printed on the card slip (may differ from the
    /// store name on the receipt body).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_label: Option<String>,
}

/// Customer / membership details.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Customer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_or_group: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_earned: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_balance: Option<i64>,
}

/// Card approval details.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Approval {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub acquirer: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub van_operator: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_date_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminal_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cash_receipt_number: Option<String>,
}

impl ReceiptResult {
    /// Create an empty result, all sub-structures default-initialized.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the soft invariants and return human-readable violations.
    ///
    /// Violations never block construction; they are surfaced as warnings
    /// for downstream review.
    pub fn reconcile(&self) -> Vec<String> {
        let mut issues = Vec::new();

        for item in &self.items {
            if let (Some(unit), Some(qty), Some(amount)) = (item.unit_price, item.qty, item.amount)
            {
                let expected = unit * qty;
                if !within_tolerance(amount, expected, expected) {
                    issues.push(format!(
                        "item '{}': amount {} differs from unit_price*qty {}",
                        item.name, amount, expected
                    ));
                }
            }
        }

        if let (Some(taxable), Some(vat), Some(total)) =
            (self.totals.taxable_amount, self.totals.vat, self.totals.total)
        {
            if !within_tolerance(taxable + vat, total, total) {
                issues.push(format!(
                    "totals: taxable {} + vat {} differs from total {}",
                    taxable, vat, total
                ));
            }
        }

        issues
    }

    /// Typed debug view of the populated fields, for logging intermediate
    /// parse state. The field set is closed and known at design time, so no
    /// reflection is involved.
    pub fn snapshot(&self) -> BTreeMap<&'static str, String> {
        let mut snap = BTreeMap::new();

        fn put(snap: &mut BTreeMap<&'static str, String>, key: &'static str, v: &Option<String>) {
            if let Some(v) = v {
                snap.insert(key, v.clone());
            }
        }
        fn put_amount(
            snap: &mut BTreeMap<&'static str, String>,
            key: &'static str,
            v: Option<i64>,
        ) {
            if let Some(v) = v {
                snap.insert(key, v.to_string());
            }
        }

        put(&mut snap, "merchant.name", &self.merchant.name);
        put(
            &mut snap,
            "merchant.bizno",
            &self.merchant.business_registration_number,
        );
        put(&mut snap, "merchant.phone", &self.merchant.phone);
        put(&mut snap, "merchant.address", &self.merchant.address);
        put(&mut snap, "meta.sale_date", &self.meta.sale_date);
        put(&mut snap, "meta.sale_time", &self.meta.sale_time);
        put(
            &mut snap,
            "meta.receipt_no",
            &self.meta.receipt_or_order_number,
        );
        put_amount(&mut snap, "totals.subtotal", self.totals.subtotal);
        put_amount(&mut snap, "totals.total", self.totals.total);
        put_amount(&mut snap, "totals.discount", self.totals.discount);
        put_amount(&mut snap, "totals.vat", self.totals.vat);
        put_amount(&mut snap, "totals.taxable", self.totals.taxable_amount);
        put_amount(&mut snap, "totals.tax_free", self.totals.tax_free_amount);
        put(&mut snap, "payment.card_brand", &self.payment.card_brand);
        put(
            &mut snap,
            "payment.masked_card",
            &self.payment.masked_card_number,
        );
        put_amount(
            &mut snap,
            "payment.approval_amount",
            self.payment.approval_amount,
        );
        put(
            &mut snap,
            "approval.approval_number",
            &self.approval.approval_number,
        );
        if !self.items.is_empty() {
            snap.insert("items.count", self.items.len().to_string());
        }
        if !self.extra.is_empty() {
            snap.insert("extra.keys", self.extra.len().to_string());
        }

        snap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_tolerance_floor() {
        // Floor of 10 won dominates for small references.
        assert!(within_tolerance(100, 105, 100));
        assert!(!within_tolerance(100, 120, 100));
    }

    #[test]
    fn test_within_tolerance_percent() {
        // 2% of 100_000 = 2_000.
        assert!(within_tolerance(100_000, 101_500, 100_000));
        assert!(!within_tolerance(100_000, 103_000, 100_000));
    }

    #[test]
    fn test_reconcile_item_mismatch() {
        let mut r = ReceiptResult::new();
        r.items.push(Item {
            name: "삼각김밥".to_string(),
            unit_price: Some(1500),
            qty: Some(2),
            amount: Some(4000),
            ..Item::default()
        });
        let issues = r.reconcile();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("삼각김밥"));
    }

    #[test]
    fn test_reconcile_totals_ok() {
        let mut r = ReceiptResult::new();
        r.totals.taxable_amount = Some(1000);
        r.totals.vat = Some(100);
        r.totals.total = Some(1100);
        assert!(r.reconcile().is_empty());
    }

    #[test]
    fn test_snapshot_only_populated() {
        let mut r = ReceiptResult::new();
        r.merchant.name = Some("GS25 강남점".to_string());
        r.totals.total = Some(1500);

        let snap = r.snapshot();
        assert_eq!(snap.get("merchant.name").unwrap(), "GS25 강남점");
        assert_eq!(snap.get("totals.total").unwrap(), "1500");
        assert!(!snap.contains_key("totals.vat"));
    }

    #[test]
    fn test_category_codes() {
        assert_eq!(ItemCategory::Food.code(), 1);
        assert_eq!(ItemCategory::Supply.code(), 2);
        assert_eq!(ItemCategory::Other.code(), 3);
        assert_eq!(TaxType::Taxable.code(), 1);
        assert_eq!(TaxType::TaxFree.code(), 2);
        assert_eq!(TaxType::Unknown.code(), 3);
    }
}
