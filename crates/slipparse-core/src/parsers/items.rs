//! Item-table parsing strategies.
//!
//! Four layout families cover the observed receipts; every strategy feeds
//! the same post-filter that drops noise lines and completes missing
//! amounts.

use crate::models::receipt::Item;
use crate::rules::classify::{classify, taxify};
use crate::rules::parse_amount;
use crate::rules::patterns::{
    BARCODE_LINE, DIGITS_ONLY_LINE, ITEM_INLINE, ITEM_START, ITEM_TRIPLE, NOISE_LINE, NUM_TOKEN,
};

/// A numeric token with enough shape information to tell quantities from
/// prices by magnitude.
#[derive(Debug, Clone, Copy)]
struct NumToken {
    value: i64,
    digits: usize,
    grouped: bool,
}

fn num_tokens(line: &str) -> Vec<NumToken> {
    NUM_TOKEN
        .find_iter(line)
        .filter_map(|m| {
            let raw = m.as_str();
            let value = parse_amount(raw)?;
            Some(NumToken {
                value,
                digits: raw.chars().filter(|c| c.is_ascii_digit()).count(),
                grouped: raw.contains(','),
            })
        })
        .collect()
}

fn is_price_like(t: &NumToken) -> bool {
    t.grouped || t.digits >= 4
}

fn is_qty_like(t: &NumToken) -> bool {
    !t.grouped && t.digits <= 2 && t.value > 0
}

/// Strip a leading tax-free marker and trailing numeric tokens from an
/// item-name capture. Returns the clean name, the marker if present, and
/// the stripped tokens.
fn split_name_line(raw: &str) -> (String, Option<String>, Vec<NumToken>) {
    let mut name = raw.trim();
    let mut tax_flag = None;
    if let Some(stripped) = name.strip_prefix('*') {
        tax_flag = Some("*".to_string());
        name = stripped.trim_start();
    }

    let mut tokens = Vec::new();
    let mut end = name.len();
    // Peel numeric tokens off the right edge; what remains is the name.
    while let Some(m) = NUM_TOKEN.find_iter(&name[..end]).last() {
        if name[m.end()..end].trim().is_empty() && m.start() > 0 {
            if let Some(value) = parse_amount(m.as_str()) {
                tokens.insert(
                    0,
                    NumToken {
                        value,
                        digits: m.as_str().chars().filter(|c| c.is_ascii_digit()).count(),
                        grouped: m.as_str().contains(','),
                    },
                );
            }
            end = m.start();
        } else {
            break;
        }
    }

    (name[..end].trim().to_string(), tax_flag, tokens)
}

/// Assign collected numeric tokens to qty / unit price / amount by
/// magnitude: 1-2 digit tokens are quantities, >=4 digit (or comma-grouped)
/// tokens are prices, and of two prices the larger is the line amount.
fn assign_tokens(item: &mut Item, tokens: &[NumToken]) {
    if item.qty.is_none() {
        item.qty = tokens.iter().find(|t| is_qty_like(t)).map(|t| t.value);
    }

    let mut prices: Vec<i64> = tokens.iter().filter(|t| is_price_like(t)).map(|t| t.value).collect();
    prices.sort_unstable();
    match prices.len() {
        0 => {}
        1 => {
            if item.amount.is_none() {
                item.amount = Some(prices[0]);
            }
        }
        _ => {
            if item.unit_price.is_none() {
                item.unit_price = Some(prices[0]);
            }
            if item.amount.is_none() {
                item.amount = Some(*prices.last().unwrap());
            }
        }
    }
}

/// Strategy 1: numbered single-block items.
///
/// `NN) name ...` starts an item; following lines up to the next start
/// signature belong to it (barcode lines are captured and skipped).
pub fn parse_numbered_block(lines: &[&str]) -> Vec<Item> {
    let mut items = Vec::new();
    let mut current: Option<(Item, Vec<NumToken>)> = None;

    let flush = |slot: &mut Option<(Item, Vec<NumToken>)>, items: &mut Vec<Item>| {
        if let Some((mut item, tokens)) = slot.take() {
            assign_tokens(&mut item, &tokens);
            items.push(item);
        }
    };

    for line in lines {
        if let Some(caps) = ITEM_START.captures(line) {
            flush(&mut current, &mut items);

            let (name, tax_flag, tokens) = split_name_line(&caps[2]);
            let item = Item {
                line_no: caps[1].parse().ok(),
                name,
                tax_flag,
                ..Item::default()
            };
            current = Some((item, tokens));
            continue;
        }

        let Some((item, nums)) = current.as_mut() else {
            continue;
        };

        if BARCODE_LINE.is_match(line.trim()) {
            item.barcode = Some(line.trim().to_string());
            continue;
        }
        nums.extend(num_tokens(line));
    }
    flush(&mut current, &mut items);

    post_filter(items)
}

/// Strategy 2: name line, optional barcode line, then exactly one
/// `unitPrice qty amount` line.
pub fn parse_two_line(lines: &[&str]) -> Vec<Item> {
    let mut items = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();
        let name_like = !line.is_empty()
            && !DIGITS_ONLY_LINE.is_match(line)
            && !ITEM_TRIPLE.is_match(line);

        if name_like {
            let mut j = i + 1;
            let mut barcode = None;
            if j < lines.len() && BARCODE_LINE.is_match(lines[j].trim()) {
                barcode = Some(lines[j].trim().to_string());
                j += 1;
            }
            if j < lines.len() {
                if let Some(caps) = ITEM_TRIPLE.captures(lines[j].trim()) {
                    let (name, tax_flag, _) = split_name_line(line);
                    items.push(Item {
                        name,
                        tax_flag,
                        barcode,
                        unit_price: parse_amount(&caps[1]),
                        qty: parse_amount(&caps[2]),
                        amount: parse_amount(&caps[3]),
                        ..Item::default()
                    });
                    i = j + 1;
                    continue;
                }
            }
        }
        i += 1;
    }

    post_filter(items)
}

/// Strategy 3: name and numeric columns on a single line.
///
/// The common `name unitPrice qty amount` order is read positionally;
/// vendors that print qty first (`name qty unitPrice amount`) fall through
/// to magnitude-based assignment over the trailing tokens.
pub fn parse_inline(lines: &[&str]) -> Vec<Item> {
    let mut items = Vec::new();

    for line in lines {
        let line = line.trim();
        if let Some(caps) = ITEM_INLINE.captures(line) {
            let (name, tax_flag, _) = split_name_line(&caps[1]);
            items.push(Item {
                name,
                tax_flag,
                unit_price: parse_amount(&caps[2]),
                qty: parse_amount(&caps[3]),
                amount: parse_amount(&caps[4]),
                ..Item::default()
            });
            continue;
        }

        let (name, tax_flag, tokens) = split_name_line(line);
        if name.is_empty() || tokens.len() < 2 || !tokens.iter().any(is_price_like) {
            continue;
        }
        let mut item = Item {
            name,
            tax_flag,
            ..Item::default()
        };
        assign_tokens(&mut item, &tokens);
        items.push(item);
    }

    post_filter(items)
}

/// Strategy 4: names and numeric blocks extracted as two independent
/// ordered lists and zipped positionally.
///
/// A numeric block of size 1/2/3 means {amount}, {unitPrice, amount} with
/// qty defaulting to 1, or {unitPrice, qty, amount}.
pub fn parse_split_block(lines: &[&str]) -> Vec<Item> {
    let mut names: Vec<(String, Option<String>)> = Vec::new();
    let mut blocks: Vec<Vec<i64>> = Vec::new();
    let mut current_block: Vec<i64> = Vec::new();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if DIGITS_ONLY_LINE.is_match(line) {
            if BARCODE_LINE.is_match(line) {
                continue;
            }
            if let Some(value) = NUM_TOKEN.find(line).and_then(|m| parse_amount(m.as_str())) {
                current_block.push(value);
            }
            continue;
        }

        // A name line closes the pending numeric block.
        if !current_block.is_empty() {
            blocks.push(std::mem::take(&mut current_block));
        }
        if !NOISE_LINE.is_match(line) {
            let (name, tax_flag, _) = split_name_line(line);
            if !name.is_empty() {
                names.push((name, tax_flag));
            }
        }
    }
    if !current_block.is_empty() {
        blocks.push(current_block);
    }

    let items = names
        .into_iter()
        .zip(blocks)
        .map(|((name, tax_flag), block)| {
            let mut item = Item {
                name,
                tax_flag,
                ..Item::default()
            };
            match block.as_slice() {
                [amount] => item.amount = Some(*amount),
                [unit, amount] => {
                    item.unit_price = Some(*unit);
                    item.qty = Some(1);
                    item.amount = Some(*amount);
                }
                [unit, qty, amount, ..] => {
                    item.unit_price = Some(*unit);
                    item.qty = Some(*qty);
                    item.amount = Some(*amount);
                }
                [] => {}
            }
            item
        })
        .collect();

    post_filter(items)
}

/// Shared post-filter applied by every strategy: drop noise-denylist and
/// all-digit names, complete `amount = unitPrice * qty`, and attach
/// classifier codes.
pub fn post_filter(items: Vec<Item>) -> Vec<Item> {
    items
        .into_iter()
        .filter(|item| {
            let name = item.name.trim();
            !name.is_empty()
                && !NOISE_LINE.is_match(name)
                && !DIGITS_ONLY_LINE.is_match(name)
        })
        .map(|mut item| {
            if item.amount.is_none() {
                if let (Some(unit), Some(qty)) = (item.unit_price, item.qty) {
                    item.amount = Some(unit * qty);
                }
            }
            // One known price with qty 1 serves as both unit and amount.
            if item.unit_price.is_none() && item.qty == Some(1) {
                item.unit_price = item.amount;
            }
            item.category = Some(classify(&item.name));
            item.tax_type = Some(taxify(item.tax_flag.as_deref()));
            item
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::receipt::ItemCategory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_numbered_block() {
        let lines = [
            "1) 서울우유 1L",
            "8801234567890",
            "2,500 1 2,500",
            "2) 물티슈 100매",
            "1,200 2 2,400",
        ];
        let items = parse_numbered_block(&lines);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "서울우유 1L");
        assert_eq!(items[0].barcode.as_deref(), Some("8801234567890"));
        assert_eq!(items[0].qty, Some(1));
        assert_eq!(items[0].unit_price, Some(2500));
        assert_eq!(items[0].amount, Some(2500));
        assert_eq!(items[1].qty, Some(2));
        assert_eq!(items[1].amount, Some(2400));
    }

    #[test]
    fn test_numbered_block_single_price() {
        let lines = ["1) 쓰레기봉투 20L", "1,000"];
        let items = parse_numbered_block(&lines);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].amount, Some(1000));
        assert_eq!(items[0].category, Some(ItemCategory::Supply));
    }

    #[test]
    fn test_two_line() {
        let lines = ["바나나우유", "8809876543210", "1300 2 2600"];
        let items = parse_two_line(&lines);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "바나나우유");
        assert_eq!(items[0].unit_price, Some(1300));
        assert_eq!(items[0].qty, Some(2));
        assert_eq!(items[0].amount, Some(2600));
    }

    #[test]
    fn test_inline() {
        let lines = ["삼각김밥 1500 1 1500", "*생수 800 1 800"];
        let items = parse_inline(&lines);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "삼각김밥");
        assert_eq!(items[1].name, "생수");
        assert_eq!(items[1].tax_flag.as_deref(), Some("*"));
    }

    #[test]
    fn test_inline_qty_first_order() {
        let lines = ["삼각김밥 1 1500 1500"];
        let items = parse_inline(&lines);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "삼각김밥");
        assert_eq!(items[0].qty, Some(1));
        assert_eq!(items[0].unit_price, Some(1500));
        assert_eq!(items[0].amount, Some(1500));
    }

    #[test]
    fn test_split_block_arities() {
        let lines = [
            "김치찌개",
            "8,000",
            "공기밥",
            "1,000",
            "2",
            "2,000",
            "콜라",
            "2,000",
            "2,000",
        ];
        let items = parse_split_block(&lines);
        assert_eq!(items.len(), 3);
        // size 1: amount only
        assert_eq!(items[0].amount, Some(8000));
        assert_eq!(items[0].unit_price, None);
        // size 3: unit, qty, amount
        assert_eq!(items[1].unit_price, Some(1000));
        assert_eq!(items[1].qty, Some(2));
        assert_eq!(items[1].amount, Some(2000));
        // size 2: unit, amount, qty defaults to 1
        assert_eq!(items[2].qty, Some(1));
        assert_eq!(items[2].amount, Some(2000));
    }

    #[test]
    fn test_post_filter_noise_and_amount() {
        let items = vec![
            Item {
                name: "교환/환불 안내".to_string(),
                ..Item::default()
            },
            Item {
                name: "8801234567890".to_string(),
                ..Item::default()
            },
            Item {
                name: "컵라면".to_string(),
                unit_price: Some(1200),
                qty: Some(3),
                ..Item::default()
            },
        ];
        let filtered = post_filter(items);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].amount, Some(3600));
        assert_eq!(filtered[0].category, Some(ItemCategory::Food));
    }
}
