mod luhn;

pub use luhn::{is_valid_luhn, parse_order_number};
