//! Item and tax-flag classification.
//!
//! Both keyword sets are static, ordered, substring-matched process-wide
//! configuration; classification is deterministic but sensitive to keyword
//! overlap, which is what the exception list guards against.

use crate::models::receipt::{ItemCategory, TaxType};

/// Names that superficially contain a supply keyword but are actually food
/// (칼국수 is a noodle dish, not a knife). A hit short-circuits to OTHER.
///
/// Returning OTHER rather than FOOD here mirrors the behavior observed in
/// production; whether these should classify as FOOD is pending product
/// confirmation.
const EXCEPTION_NAMES: &[&str] = &["칼국수", "칼제비"];

/// Food keyword set, first hit wins.
const FOOD_KEYWORDS: &[&str] = &[
    "김밥",
    "라면",
    "국수",
    "만두",
    "도시락",
    "샌드위치",
    "햄버거",
    "치킨",
    "피자",
    "우유",
    "요구르트",
    "치즈",
    "음료",
    "주스",
    "커피",
    "콜라",
    "사이다",
    "생수",
    "맥주",
    "소주",
    "막걸리",
    "빵",
    "과자",
    "초콜릿",
    "아이스크림",
    "떡",
    "김치",
    "두부",
    "계란",
    "달걀",
    "사과",
    "바나나",
    "소시지",
    "햄",
    "찌개",
    "안주",
];

/// Supply keyword set, checked after food.
const SUPPLY_KEYWORDS: &[&str] = &[
    "칼",
    "가위",
    "세제",
    "물티슈",
    "티슈",
    "휴지",
    "종이컵",
    "컵",
    "봉투",
    "건전지",
    "배터리",
    "볼펜",
    "노트",
    "테이프",
    "장갑",
    "수세미",
    "비누",
    "샴푸",
    "치약",
    "칫솔",
    "빨대",
    "호일",
    "쓰레기",
];

/// Tax flag label printed for VAT-liable items/totals.
const TAXABLE_LABEL: &str = "과세";
/// Tax flag label printed for VAT-exempt items/totals.
const TAX_FREE_LABEL: &str = "면세";

/// Map an item name to a coarse category.
///
/// Evaluation order is fixed: exception list, food keywords, supply
/// keywords, default OTHER.
pub fn classify(item_name: &str) -> ItemCategory {
    let name = item_name.trim();
    if name.is_empty() {
        return ItemCategory::Other;
    }

    if EXCEPTION_NAMES.iter().any(|e| name.contains(e)) {
        return ItemCategory::Other;
    }

    if FOOD_KEYWORDS.iter().any(|k| name.contains(k)) {
        return ItemCategory::Food;
    }

    if SUPPLY_KEYWORDS.iter().any(|k| name.contains(k)) {
        return ItemCategory::Supply;
    }

    ItemCategory::Other
}

/// Map a raw tax-flag string to a tax-type code. Exact match only.
pub fn taxify(tax_flag: Option<&str>) -> TaxType {
    match tax_flag.map(str::trim) {
        None | Some("") => TaxType::Unknown,
        Some(TAXABLE_LABEL) => TaxType::Taxable,
        Some(TAX_FREE_LABEL) => TaxType::TaxFree,
        Some(_) => TaxType::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_empty() {
        assert_eq!(classify(""), ItemCategory::Other);
        assert_eq!(classify("   "), ItemCategory::Other);
    }

    #[test]
    fn test_classify_food() {
        assert_eq!(classify("삼각김밥"), ItemCategory::Food);
        assert_eq!(classify("서울우유 1L"), ItemCategory::Food);
    }

    #[test]
    fn test_classify_supply() {
        assert_eq!(classify("과도칼 소형"), ItemCategory::Supply);
        assert_eq!(classify("물티슈 100매"), ItemCategory::Supply);
    }

    #[test]
    fn test_exception_wins_over_keywords() {
        // 칼국수 contains the supply keyword 칼 but also the food keyword
        // 국수; the exception list short-circuits both to OTHER.
        assert_eq!(classify("칼국수"), ItemCategory::Other);
        assert_eq!(classify("얼큰 칼국수 大"), ItemCategory::Other);
    }

    #[test]
    fn test_food_precedence_over_supply() {
        // Contains both 컵 (supply) and 라면 (food); food is checked first.
        assert_eq!(classify("컵라면"), ItemCategory::Food);
    }

    #[test]
    fn test_classify_default_other() {
        assert_eq!(classify("모나미 153"), ItemCategory::Other);
    }

    #[test]
    fn test_taxify() {
        assert_eq!(taxify(None), TaxType::Unknown);
        assert_eq!(taxify(Some("")), TaxType::Unknown);
        assert_eq!(taxify(Some("과세")), TaxType::Taxable);
        assert_eq!(taxify(Some("면세")), TaxType::TaxFree);
        assert_eq!(taxify(Some("*")), TaxType::Unknown);
    }
}
