//! Cell-level numeric/pattern recognition shared by the classifiers and the
//! validator: decimal, integer, currency, percentage, dimensioned unit, date.

const CURRENCY_SYMBOLS: [char; 5] = ['$', '€', '£', '¥', '₹'];

fn strip_thousand_separators(s: &str) -> String {
    s.chars().filter(|c| *c != ',').collect()
}

/// True if the cell looks like a plain decimal or integer (after stripping
/// thousand separators), e.g. "1,250" or "3.5" or "-4".
pub fn is_numeric(cell: &str) -> bool {
    let trimmed = strip_thousand_separators(cell.trim());
    !trimmed.is_empty() && trimmed.parse::<f64>().is_ok()
}

/// True if the cell has an optional leading currency symbol followed by a
/// numeric body, e.g. "$1,250.00".
pub fn is_currency_like(cell: &str) -> bool {
    let trimmed = cell.trim();
    let body = trimmed
        .strip_prefix(CURRENCY_SYMBOLS.as_slice())
        .unwrap_or(trimmed);
    is_numeric(body)
}

pub fn is_percentage_like(cell: &str) -> bool {
    let trimmed = cell.trim();
    trimmed
        .strip_suffix('%')
        .map(|body| is_numeric(body))
        .unwrap_or(false)
}

/// True if the cell is a known unit token (m², m³, kg, ...) possibly
/// preceded by a number, e.g. "10 m3" or just "m3".
pub fn is_dimensioned_unit(cell: &str, unit_tokens: &[String]) -> bool {
    let lower = cell.trim().to_lowercase();
    unit_tokens
        .iter()
        .any(|t| lower == t.to_lowercase() || lower.ends_with(&format!(" {}", t.to_lowercase())))
}

/// Coarse date-like check: looks like `YYYY-MM-DD`, `DD/MM/YYYY`, or similar
/// digit-separator-digit-separator-digit triplets.
pub fn is_date_like(cell: &str) -> bool {
    let trimmed = cell.trim();
    let separators = ['-', '/', '.'];
    let parts: Vec<&str> = trimmed
        .split(|c: char| separators.contains(&c))
        .collect();
    parts.len() == 3
        && parts.iter().all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
        && parts.iter().any(|p| p.len() == 4)
}

/// One of the numeric-ish cell categories the sheet classifier's numeric
/// ratio counts.
pub fn is_any_numeric_pattern(cell: &str, unit_tokens: &[String]) -> bool {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return false;
    }
    is_numeric(trimmed)
        || is_currency_like(trimmed)
        || is_percentage_like(trimmed)
        || is_dimensioned_unit(trimmed, unit_tokens)
        || is_date_like(trimmed)
}

/// Parses a quantity cell: a number after stripping thousand separators.
/// Returns `None` if not parseable. Negative values parse successfully —
/// callers that care about sign (row classification, validation) check
/// `< 0.0` themselves rather than relying on this to filter them out.
pub fn parse_quantity(cell: &str) -> Option<f64> {
    let trimmed = strip_thousand_separators(cell.trim());
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a currency cell: optional leading symbol, optional thousand
/// separators, up to 2 fractional digits.
pub fn parse_currency(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    let body = trimmed
        .strip_prefix(CURRENCY_SYMBOLS.as_slice())
        .unwrap_or(trimmed)
        .trim();
    if body.is_empty() {
        return None;
    }
    if let Some(frac) = body.split('.').nth(1) {
        if frac.len() > 2 {
            return None;
        }
    }
    strip_thousand_separators(body).parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_thousand_separated_quantity() {
        assert_eq!(parse_quantity("1,250"), Some(1250.0));
    }

    #[test]
    fn rejects_negative_quantity_as_unparseable_is_false_but_value_is_negative() {
        // parse_quantity itself just parses; the business-rule check for
        // negativity lives in the validator, not here.
        assert_eq!(parse_quantity("-5"), Some(-5.0));
    }

    #[test]
    fn parses_currency_with_symbol_and_separators() {
        assert_eq!(parse_currency("$1,250.50"), Some(1250.50));
        assert_eq!(parse_currency("€99.9"), Some(99.9));
    }

    #[test]
    fn rejects_currency_with_too_many_fractional_digits() {
        assert_eq!(parse_currency("12.345"), None);
    }

    #[test]
    fn recognizes_date_like_cells() {
        assert!(is_date_like("2024-01-15"));
        assert!(is_date_like("15/01/2024"));
        assert!(!is_date_like("not a date"));
    }
}
