//! Core library for Korean receipt and card-slip text parsing.
//!
//! This crate provides:
//! - OCR text normalization (fullwidth folding, glued-label line breaking)
//! - Field extraction rules (business numbers, dates, cards, money ranking)
//! - Item-table parsing and item/tax classification
//! - Template detection and per-template parsers behind one dispatch entry

pub mod error;
pub mod models;
pub mod parsers;
pub mod rules;
pub mod template;
pub mod text;

pub use error::{Result, SlipError};
pub use models::config::SlipConfig;
pub use models::document::{BoundingBox, FormField, OcrDocument, OcrTable, PageSize};
pub use models::receipt::{
    Approval, Customer, Item, ItemCategory, Merchant, Meta, PayType, Payment, ReceiptResult,
    TaxType, Totals,
};
pub use parsers::{parse_receipt, parse_receipt_with_config, ParsedReceipt, ReceiptParser};
pub use template::{detect, Detection, TemplateKey};
pub use text::normalize;
