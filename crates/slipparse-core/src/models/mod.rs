//! Data models: OCR input contract, parsed receipt record, configuration.

pub mod config;
pub mod document;
pub mod receipt;

pub use config::SlipConfig;
pub use document::{BoundingBox, FormField, OcrDocument, OcrTable, PageSize};
pub use receipt::{
    Approval, Customer, Item, ItemCategory, Merchant, Meta, PayType, Payment, ReceiptResult,
    TaxType, Totals,
};
