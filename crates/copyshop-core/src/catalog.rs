//! # Catalog Helpers
//!
//! Product code generation for products created without a code.

use crate::{PRODUCT_CODE_DIGITS, PRODUCT_CODE_PREFIX};

/// Returns the code after the highest `P<digits>` code in `existing`.
///
/// The prefix matches in any case, as codes are unique case-insensitively
/// (`p005` blocks `P005`). Codes that don't follow the pattern (`FC-A4`,
/// `P12X`) are ignored.
///
/// ## Example
/// ```rust
/// use copyshop_core::catalog::next_product_code;
///
/// assert_eq!(next_product_code(Vec::<String>::new()), "P001");
/// assert_eq!(next_product_code(["P001", "P007", "SCAN"]), "P008");
/// assert_eq!(next_product_code(["P999"]), "P1000");
/// ```
pub fn next_product_code<I, S>(existing: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let highest = existing
        .into_iter()
        .filter_map(|code| parse_code_number(code.as_ref()))
        .max()
        .unwrap_or(0);

    format!(
        "{}{:0width$}",
        PRODUCT_CODE_PREFIX,
        highest.saturating_add(1),
        width = PRODUCT_CODE_DIGITS
    )
}

fn parse_code_number(code: &str) -> Option<u64> {
    let code = code.trim();
    let prefix = code.get(..PRODUCT_CODE_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(PRODUCT_CODE_PREFIX) {
        return None;
    }
    let digits = &code[PRODUCT_CODE_PREFIX.len()..];
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_code() {
        assert_eq!(next_product_code(Vec::<&str>::new()), "P001");
    }

    #[test]
    fn test_next_after_highest_not_last() {
        assert_eq!(next_product_code(["P010", "P002", "P003"]), "P011");
    }

    #[test]
    fn test_ignores_other_codes() {
        assert_eq!(next_product_code(["FC-A4", "P12X", "P", "P004"]), "P005");
    }

    #[test]
    fn test_lowercase_prefix_counts() {
        assert_eq!(next_product_code(["p005", "P004"]), "P006");
        assert_eq!(next_product_code(["p001"]), "P002");
    }

    #[test]
    fn test_grows_past_three_digits() {
        assert_eq!(next_product_code(["P999"]), "P1000");
    }
}
