//! Templates command - list the template keys the dispatcher accepts.

use clap::Args;
use console::style;

use slipparse_core::TemplateKey;

/// Arguments for the templates command.
#[derive(Args)]
pub struct TemplatesArgs {
    /// Print keys only, one per line
    #[arg(long)]
    plain: bool,
}

fn describe(key: TemplateKey) -> &'static str {
    match key {
        TemplateKey::ConvenienceStore => "Convenience-store slip (GS25, CU, ...)",
        TemplateKey::MartItemized => "Mart itemized receipt (이마트, 홈플러스, ...)",
        TemplateKey::CardSlipA => "Card sales slip with purchase-info block",
        TemplateKey::CardSlipB => "Card sales slip, approval-only layout",
        TemplateKey::DeliveryApp => "Delivery-app order confirmation",
        TemplateKey::TransactionStatement => "Two-party B2B transaction statement",
        TemplateKey::AuctionMarketplace => "Auction/marketplace slip (옥션, 지마켓)",
        TemplateKey::RetailSuperstore => "Membership warehouse / superstore",
        TemplateKey::SearchPortalPay => "Search-portal payment history",
        TemplateKey::OpenMarketSlip => "Open-marketplace slip (11번가, 쿠팡, ...)",
        TemplateKey::BilingualSlip => "Korean/English bilingual slip",
        TemplateKey::Unknown => "Generic fallback parser",
    }
}

pub fn run(args: TemplatesArgs) -> anyhow::Result<()> {
    for key in TemplateKey::ALL {
        if args.plain {
            println!("{}", key);
        } else {
            println!("{:<24} {}", style(key.as_key()).cyan(), describe(*key));
        }
    }
    Ok(())
}
