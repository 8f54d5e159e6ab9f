/// Checks an order number against the Luhn checksum.
///
/// Whitespace between digits is ignored. Anything else that is not an ASCII digit makes the number invalid, as does a
/// number with fewer than two digits.
pub fn is_valid_luhn(number: &str) -> bool {
    let digits = number.chars().filter(|c| !c.is_whitespace()).map(|c| c.to_digit(10)).collect::<Option<Vec<u32>>>();
    let Some(digits) = digits else {
        return false;
    };
    if digits.len() < 2 {
        return false;
    }
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

/// Parses a caller-supplied order number into the integer id used by the ledger.
///
/// Returns `None` if the number fails the Luhn check, does not fit in an `i64`, or is zero.
pub fn parse_order_number(number: &str) -> Option<i64> {
    if !is_valid_luhn(number) {
        return None;
    }
    let compact = number.chars().filter(|c| !c.is_whitespace()).collect::<String>();
    compact.parse::<i64>().ok().filter(|id| *id > 0)
}
