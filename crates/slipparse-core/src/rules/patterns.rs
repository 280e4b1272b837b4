//! Common regex patterns for Korean receipt/slip extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Business registration number (사업자등록번호), NNN-NN-NNNNN
    pub static ref BIZNO_LABELED: Regex = Regex::new(
        r"사\s*업\s*자\s*(?:등\s*록\s*)?번\s*호\s*[:：]?\s*(\d{3}[-\s]?\d{2}[-\s]?\d{5})"
    ).unwrap();

    pub static ref BIZNO_STANDALONE: Regex = Regex::new(
        r"\b(\d{3})[- ]?(\d{2})[- ]?(\d{5})\b"
    ).unwrap();

    // Date patterns
    pub static ref DATE_YMD: Regex = Regex::new(
        r"\b(\d{4})[./\-](\d{1,2})[./\-](\d{1,2})\b"
    ).unwrap();

    pub static ref DATE_KOREAN: Regex = Regex::new(
        r"(\d{4})\s*년\s*(\d{1,2})\s*월\s*(\d{1,2})\s*일"
    ).unwrap();

    // Year-less Korean date, e.g. "10월 9일"
    pub static ref DATE_MONTH_DAY: Regex = Regex::new(
        r"(\d{1,2})\s*월\s*(\d{1,2})\s*일"
    ).unwrap();

    pub static ref TIME_HMS: Regex = Regex::new(
        r"\b(\d{1,2}):(\d{2})(?::(\d{2}))?\b"
    ).unwrap();

    // Card numbers. OCR mangles mask characters, so the loose pattern also
    // accepts underscores and stray letters in the masked middle groups.
    pub static ref CARD_LABELED: Regex = Regex::new(
        r"카\s*드\s*번\s*호\s*[:：]?\s*([\d*Xx_\-\sA-Za-z]{8,25})"
    ).unwrap();

    pub static ref MASKED_CARD: Regex = Regex::new(
        r"\b\d{4}[-\s]?[\d*Xx_]{2,6}[-\s]?[\d*Xx_]{2,6}[-\s]?[\d*Xx]{1,4}\b"
    ).unwrap();

    // Approval section labels
    pub static ref APPROVAL_NO: Regex = Regex::new(
        r"승\s*인\s*번\s*호\s*[:：]?\s*(\d{4,12})"
    ).unwrap();

    pub static ref MERCHANT_NO: Regex = Regex::new(
        r"가\s*맹\s*점\s*번\s*호\s*[:：]?\s*(\d{6,15})"
    ).unwrap();

    pub static ref TERMINAL_ID: Regex = Regex::new(
        r"(?:단\s*말\s*기\s*(?:번\s*호)?|TID)\s*[:：]?\s*([\dA-Za-z\-]{6,16})"
    ).unwrap();

    pub static ref ACQUIRER: Regex = Regex::new(
        r"매\s*입\s*사?\s*[:：]?\s*(\S+)"
    ).unwrap();

    pub static ref VAN_OPERATOR: Regex = Regex::new(
        r"(?:VAN|밴\s*사)\s*[:：]?\s*(\S+)"
    ).unwrap();

    pub static ref CASH_RECEIPT_NO: Regex = Regex::new(
        r"현\s*금\s*영\s*수\s*증\s*(?:번\s*호|승\s*인)?\s*[:：]?\s*([\d*\-]{6,15})"
    ).unwrap();

    pub static ref INSTALLMENT: Regex = Regex::new(
        r"(일시불|\d{1,2}\s*개월)"
    ).unwrap();

    // Transaction metadata labels
    pub static ref RECEIPT_NO: Regex = Regex::new(
        r"(?:영수증|주문|거래)\s*번\s*호\s*[:：]?\s*([\dA-Za-z\-]{4,24})"
    ).unwrap();

    pub static ref POS_NO: Regex = Regex::new(
        r"(?:POS|포스)\s*(?:번\s*호|NO|No)?\s*[:：.]?\s*([\d\-]{1,8})"
    ).unwrap();

    pub static ref REGISTER_NO: Regex = Regex::new(
        r"(?:레지|계산대|금전등록기)\s*[:：]?\s*([\d\-]{1,8})"
    ).unwrap();

    pub static ref CASHIER: Regex = Regex::new(
        r"(?:계산원|담당자?|판매원|캐셔)\s*[:：]?\s*(\S+)"
    ).unwrap();

    pub static ref REPRESENTATIVE: Regex = Regex::new(
        r"대\s*표\s*자?\s*(?:명)?\s*[:：]?\s*([가-힣A-Za-z·]{2,12})"
    ).unwrap();

    pub static ref PHONE: Regex = Regex::new(
        r"\b(?:0\d{1,2}[-.)\s]?\d{3,4}[-.\s]?\d{4}|1\d{3}[-.\s]?\d{4})\b"
    ).unwrap();

    pub static ref MERCHANT_NAME_LABELED: Regex = Regex::new(
        r"(?:가\s*맹\s*점\s*명|상\s*호\s*명?|매\s*장\s*명)\s*[:：]?\s*(.+)"
    ).unwrap();

    pub static ref ADDRESS_LABELED: Regex = Regex::new(
        r"(?:주\s*소|소\s*재\s*지)\s*[:：]?\s*(.+)"
    ).unwrap();

    // A currency-like numeric token: comma-grouped or at least 4 digits.
    pub static ref AMOUNT_TOKEN: Regex = Regex::new(
        r"\d{1,3}(?:,\d{3})+|\d{4,}"
    ).unwrap();

    pub static ref NUM_TOKEN: Regex = Regex::new(
        r"\d[\d,]*"
    ).unwrap();

    // Item table shapes
    pub static ref ITEM_START: Regex = Regex::new(
        r"^(\d{1,3})[.)]\s+(\S.*)$"
    ).unwrap();

    pub static ref ITEM_INLINE: Regex = Regex::new(
        r"^([*\s]?\S[^\d\n]*?)\s+(\d[\d,]*)\s+(\d{1,3})\s+(\d[\d,]*)$"
    ).unwrap();

    pub static ref ITEM_TRIPLE: Regex = Regex::new(
        r"^(\d[\d,]*)\s+(\d{1,3})\s+(\d[\d,]*)$"
    ).unwrap();

    pub static ref BARCODE_LINE: Regex = Regex::new(
        r"^\d{8,14}$"
    ).unwrap();

    pub static ref DIGITS_ONLY_LINE: Regex = Regex::new(
        r"^[\d,.\s*\-]+$"
    ).unwrap();

    // Lines that are never item names: regulatory boilerplate, refund and
    // exchange notices, table headers, totals/payment sections.
    pub static ref NOISE_LINE: Regex = Regex::new(
        r"교환|환불|반품|영수증|부가세|과세|면세|합계|할인|포인트|적립|결제|승인|신용|카드|현금|거스름|상품명|단가|수량|금액|사업자|대표자|전화|주소|감사합니다|봉사료"
    ).unwrap();
}
