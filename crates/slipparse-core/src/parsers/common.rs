//! Field extraction shared by every per-template parser.
//!
//! Each helper resolves its fields through a priority-ordered chain of
//! patterns and leaves anything it cannot find as `None`.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::receipt::{Approval, Customer, Merchant, Meta, PayType, Payment, Totals};
use crate::rules::bizno::{extract_bizno, find_bizno_position};
use crate::rules::card::extract_masked_card;
use crate::rules::dates::{extract_sale_date, extract_sale_time};
use crate::rules::money::scan_money;
use crate::rules::patterns::{
    ACQUIRER, ADDRESS_LABELED, APPROVAL_NO, CASHIER, CASH_RECEIPT_NO, INSTALLMENT,
    MERCHANT_NAME_LABELED, MERCHANT_NO, NOISE_LINE, PHONE, POS_NO, RECEIPT_NO, REGISTER_NO,
    TERMINAL_ID, VAN_OPERATOR,
};
use crate::rules::{extract, extract_str, parse_amount};

/// Card issuer brands recognized on Korean slips.
pub const CARD_BRANDS: &[&str] = &[
    "신한", "삼성", "현대", "KB국민", "국민", "롯데", "하나", "우리", "NH농협", "농협", "비씨",
    "BC", "씨티", "카카오뱅크", "케이뱅크", "토스뱅크",
];

/// Simple-pay providers.
pub const SIMPLE_PAY_BRANDS: &[&str] =
    &["네이버페이", "카카오페이", "페이코", "토스페이", "삼성페이", "애플페이"];

lazy_static! {
    static ref APPROVAL_AMOUNT: Regex =
        Regex::new(r"승\s*인\s*금\s*액\s*[:：]?\s*(\d[\d,]*)").unwrap();
    static ref AUTH_DATETIME: Regex = Regex::new(
        r"거\s*래\s*일\s*시\s*[:：]?\s*(\d{2,4}[./\-]\d{1,2}[./\-]\d{1,2}\s*\d{1,2}:\d{2}(?::\d{2})?)"
    )
    .unwrap();
    static ref POINTS_EARNED: Regex =
        Regex::new(r"적립(?:\s*포인트)?\s*[:：]?\s*(\d[\d,]*)").unwrap();
    static ref POINTS_BALANCE: Regex =
        Regex::new(r"(?:가용|누적|잔여)\s*포인트\s*[:：]?\s*(\d[\d,]*)").unwrap();
    static ref CUSTOMER_LABELED: Regex =
        Regex::new(r"(?:고객명|회원명|구매자)\s*[:：]?\s*(\S+)").unwrap();
    static ref ADDRESS_HINT: Regex =
        Regex::new(r"[가-힣]+(?:시|도)\s+\S+(?:구|군|시)|[가-힣]+(?:로|길)\s*\d").unwrap();
    static ref LABELED_LINE: Regex =
        Regex::new(r"사업자|전화|TEL|대표|주소|POS|포스|영수증|승인|카드").unwrap();
    static ref CASH_PAID: Regex =
        Regex::new(r"(?:받은\s*금액|현금)\s*[:：]?\s*(\d[\d,]*)").unwrap();
    static ref CHANGE_AMOUNT: Regex =
        Regex::new(r"(?:거스름돈|거스름|잔돈)\s*[:：]?\s*(\d[\d,]*)").unwrap();
    static ref CARD_PAID: Regex =
        Regex::new(r"(?:신용카드|카드결제)\s*[:：]?\s*(\d[\d,]*)").unwrap();
    static ref SUBTOTAL: Regex = Regex::new(r"소\s*계\s*[:：]?\s*(\d[\d,]*)").unwrap();
    static ref ITEM_HEADER: Regex =
        Regex::new(r"상\s*품\s*명|메\s*뉴|단가\s+수량|품\s*목|구매정보").unwrap();
    static ref TOTAL_BOUNDARY: Regex = Regex::new(
        r"합\s*계|총\s*액|결제금액|받을금액|승인금액|과세\s*물품|면세\s*물품|부가세|공급가액|소계"
    )
    .unwrap();
}

/// Merchant name, registration number, phone and address.
pub fn extract_merchant(text: &str) -> Merchant {
    let bizno = extract_bizno(text);

    let name = extract(text, &MERCHANT_NAME_LABELED, 1)
        .or_else(|| merchant_name_near_bizno(text))
        .or_else(|| first_plausible_name(text));

    let address = extract(text, &ADDRESS_LABELED, 1).or_else(|| {
        text.lines()
            .find(|l| ADDRESS_HINT.is_match(l) && !LABELED_LINE.is_match(l))
            .map(|l| l.trim().to_string())
    });

    Merchant {
        name,
        business_registration_number: bizno,
        phone: extract(text, &PHONE, 0),
        address,
    }
}

/// The store name usually sits on the line right above the business
/// number; scan a few lines upward for something name-shaped.
fn merchant_name_near_bizno(text: &str) -> Option<String> {
    let pos = find_bizno_position(text)?;
    let before = &text[..pos];
    before
        .lines()
        .rev()
        .take(4)
        .map(str::trim)
        .find(|l| is_name_shaped(l))
        .map(str::to_string)
}

fn first_plausible_name(text: &str) -> Option<String> {
    text.lines()
        .take(3)
        .map(str::trim)
        .find(|l| is_name_shaped(l))
        .map(str::to_string)
}

fn is_name_shaped(line: &str) -> bool {
    !line.is_empty()
        && line.chars().count() <= 25
        && line.chars().any(|c| !c.is_ascii_digit() && !c.is_ascii_punctuation())
        && !LABELED_LINE.is_match(line)
        && !NOISE_LINE.is_match(line)
}

/// Sale date/time, receipt number, POS/register ids, cashier.
pub fn extract_meta(text: &str) -> Meta {
    Meta {
        sale_date: extract_sale_date(text),
        sale_time: extract_sale_time(text),
        receipt_or_order_number: extract(text, &RECEIPT_NO, 1),
        pos_id: extract(text, &POS_NO, 1),
        register_id: extract(text, &REGISTER_NO, 1),
        cashier: extract(text, &CASHIER, 1),
    }
}

/// Card brand, if any brand token appears next to a 카드 suffix. OCR may
/// pad the pair with whitespace, so the pattern is assembled per brand.
pub fn extract_card_brand(text: &str) -> Option<String> {
    CARD_BRANDS
        .iter()
        .find(|brand| extract_str(text, &format!(r"{}\s*카드", brand), 0).is_some())
        .map(|brand| format!("{}카드", brand))
}

/// Payment block: pay type, brand, masked number, approval amount,
/// installment plan.
///
/// Pay type is inferred from the presence of card evidence; slips that pay
/// by card but print no recognizable brand can misclassify as cash. Known
/// heuristic weakness, kept as observed.
pub fn extract_payment(text: &str) -> Payment {
    let card_brand = extract_card_brand(text);
    let masked = extract_masked_card(text);
    let simple_pay = SIMPLE_PAY_BRANDS
        .iter()
        .find(|brand| text.contains(**brand))
        .map(|brand| brand.to_string());

    let pay_type = if simple_pay.is_some() {
        Some(PayType::SimplePay)
    } else if card_brand.is_some() || masked.is_some() || APPROVAL_NO.is_match(text) {
        Some(PayType::Card)
    } else if text.contains("현금") {
        Some(PayType::Cash)
    } else {
        None
    };

    let (card_number_raw, masked_card_number) = match masked {
        Some((raw, normalized)) => (Some(raw), Some(normalized)),
        None => (None, None),
    };

    Payment {
        pay_type,
        card_brand: card_brand.or(simple_pay),
        masked_card_number,
        approval_amount: extract(text, &APPROVAL_AMOUNT, 1).and_then(|s| parse_amount(&s)),
        installment_plan: extract(text, &INSTALLMENT, 1),
        card_number_raw,
        approval_time: extract(text, &AUTH_DATETIME, 1).and_then(|s| extract_sale_time(&s)),
        merchant_label: extract(text, &MERCHANT_NAME_LABELED, 1),
    }
}

/// Approval block: approval/merchant numbers, acquirer, terminal, VAN.
pub fn extract_approval(text: &str) -> Approval {
    Approval {
        approval_number: extract(text, &APPROVAL_NO, 1),
        merchant_number: extract(text, &MERCHANT_NO, 1),
        acquirer: extract(text, &ACQUIRER, 1),
        pos_number: extract(text, &POS_NO, 1),
        van_operator: extract(text, &VAN_OPERATOR, 1),
        auth_date_time: extract(text, &AUTH_DATETIME, 1),
        terminal_id: extract(text, &TERMINAL_ID, 1),
        cash_receipt_number: extract(text, &CASH_RECEIPT_NO, 1),
    }
}

/// Totals assembled from the money-candidate scan plus the cash/card/change
/// labels the scan does not bucket.
pub fn extract_totals(text: &str) -> Totals {
    let money = scan_money(text);
    Totals {
        subtotal: extract(text, &SUBTOTAL, 1).and_then(|s| parse_amount(&s)),
        total: money.total,
        discount: money.discount,
        vat: money.vat,
        tax_free_amount: money.tax_free,
        card_amount: extract(text, &CARD_PAID, 1).and_then(|s| parse_amount(&s)),
        cash_amount: extract(text, &CASH_PAID, 1).and_then(|s| parse_amount(&s)),
        change: extract(text, &CHANGE_AMOUNT, 1).and_then(|s| parse_amount(&s)),
        taxable_amount: money.supply,
    }
}

/// Slice out the lines that can hold the item table: after the column
/// header (or the merchant preamble when there is none), before the first
/// totals label.
pub fn item_region<'a>(lines: &'a [&'a str]) -> &'a [&'a str] {
    let mut start = 0;
    for (i, line) in lines.iter().enumerate().take(lines.len() / 2 + 1) {
        if ITEM_HEADER.is_match(line) {
            start = i + 1;
            break;
        }
        // No header seen yet; keep skipping the merchant preamble.
        if i < 8 && (LABELED_LINE.is_match(line) || crate::rules::patterns::DATE_YMD.is_match(line))
        {
            start = i + 1;
        }
    }

    let end = lines
        .iter()
        .enumerate()
        .skip(start)
        .find(|(_, line)| TOTAL_BOUNDARY.is_match(line))
        .map(|(i, _)| i)
        .unwrap_or(lines.len());

    &lines[start..end]
}

/// Customer block: name/group and loyalty points.
pub fn extract_customer(text: &str) -> Customer {
    Customer {
        name_or_group: extract(text, &CUSTOMER_LABELED, 1),
        points_earned: extract(text, &POINTS_EARNED, 1).and_then(|s| parse_amount(&s)),
        points_balance: extract(text, &POINTS_BALANCE, 1).and_then(|s| parse_amount(&s)),
    }
}
