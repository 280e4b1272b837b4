//! Input contract consumed from the OCR collaborator.
//!
//! The engine must function on `text` alone; tables, form fields and page
//! geometry are optimizations supplied by OCR providers that do layout
//! analysis. The two-party statement parser uses form-field bounding boxes
//! to split supplier/buyer columns when they are available.

use serde::{Deserialize, Serialize};

/// A document as delivered by the OCR provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrDocument {
    /// Full extracted text, in OCR reading order.
    pub text: String,

    /// Tables recognized by layout analysis, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tables: Vec<OcrTable>,

    /// Key/value form fields recognized by layout analysis, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FormField>,

    /// Page dimensions, required for bbox-relative column assignment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageSize>,
}

impl OcrDocument {
    /// Build a text-only document.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Whether layout data (tables or form fields) is present.
    pub fn has_layout(&self) -> bool {
        !self.tables.is_empty() || !self.fields.is_empty()
    }
}

/// A recognized table: header rows and body rows of cell text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrTable {
    /// Header rows (cell text per column).
    #[serde(default)]
    pub header: Vec<Vec<String>>,

    /// Body rows (cell text per column).
    #[serde(default)]
    pub body: Vec<Vec<String>>,
}

/// A recognized label/value pair with optional geometry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormField {
    /// Label text as printed on the slip (e.g. "상호", "사업자번호").
    pub label: String,

    /// Value text tied to the label by position.
    pub value: String,

    /// Bounding box of the value, in page coordinates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    /// Horizontal center, used for left/right column assignment.
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Vertical center.
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

/// Page dimensions in the same coordinate space as the bounding boxes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}
