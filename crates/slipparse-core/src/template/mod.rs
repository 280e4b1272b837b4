//! Template/type-key vocabulary consumed by the dispatcher.

pub mod detect;

pub use detect::{detect, Detection};

use serde::{Deserialize, Serialize};

/// Recognizable receipt/slip layout families.
///
/// The wire form of each key is its snake_case name (`convenience_store`,
/// `card_slip_a`, ...), matched case-sensitively at the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKey {
    /// Convenience-store slip (GS25, CU, 세븐일레븐, ...).
    ConvenienceStore,
    /// Mart itemized receipt (이마트, 홈플러스, ...).
    MartItemized,
    /// Marketplace card sales slip, variant A (매출전표 with 구매정보 block).
    CardSlipA,
    /// Marketplace card sales slip, variant B (신용승인 layout).
    CardSlipB,
    /// Delivery-app order confirmation (배달의민족, 요기요, ...).
    DeliveryApp,
    /// Two-party B2B transaction statement (거래명세서).
    TransactionStatement,
    /// Auction/marketplace slip (옥션, 지마켓).
    AuctionMarketplace,
    /// Membership warehouse / superstore (코스트코, 트레이더스).
    RetailSuperstore,
    /// Search-portal payment history (네이버페이).
    SearchPortalPay,
    /// Open-marketplace slip (11번가, 쿠팡, ...).
    OpenMarketSlip,
    /// Korean/English bilingual slip.
    BilingualSlip,
    /// No signature matched; the generic fallback parser runs.
    Unknown,
}

impl TemplateKey {
    /// All keys, in no particular order.
    pub const ALL: &'static [TemplateKey] = &[
        TemplateKey::ConvenienceStore,
        TemplateKey::MartItemized,
        TemplateKey::CardSlipA,
        TemplateKey::CardSlipB,
        TemplateKey::DeliveryApp,
        TemplateKey::TransactionStatement,
        TemplateKey::AuctionMarketplace,
        TemplateKey::RetailSuperstore,
        TemplateKey::SearchPortalPay,
        TemplateKey::OpenMarketSlip,
        TemplateKey::BilingualSlip,
        TemplateKey::Unknown,
    ];

    /// Wire token for this key.
    pub fn as_key(&self) -> &'static str {
        match self {
            TemplateKey::ConvenienceStore => "convenience_store",
            TemplateKey::MartItemized => "mart_itemized",
            TemplateKey::CardSlipA => "card_slip_a",
            TemplateKey::CardSlipB => "card_slip_b",
            TemplateKey::DeliveryApp => "delivery_app",
            TemplateKey::TransactionStatement => "transaction_statement",
            TemplateKey::AuctionMarketplace => "auction_marketplace",
            TemplateKey::RetailSuperstore => "retail_superstore",
            TemplateKey::SearchPortalPay => "search_portal_pay",
            TemplateKey::OpenMarketSlip => "open_market_slip",
            TemplateKey::BilingualSlip => "bilingual_slip",
            TemplateKey::Unknown => "unknown",
        }
    }

    /// Parse a wire token. Case-sensitive; unknown tokens are `None` so the
    /// dispatcher can fail fast with a descriptive error.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_key() == key)
    }
}

impl std::fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_key())
    }
}
