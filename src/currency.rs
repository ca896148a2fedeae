use crate::error::CurrencyError;

const EURO_SIGN: char = '€';
const MILLION: f64 = 1_000_000.0;
const THOUSAND: f64 = 1_000.0;

/// Parses amounts such as `€105.5M`, `€850K`, `€1,5M` or `1500000`.
///
/// A comma is the decimal point in the source data, never a thousands
/// separator. Absent input stays absent so the caller can impute it.
pub fn normalize_currency(raw: Option<&str>) -> Result<Option<f64>, CurrencyError> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let cleaned = raw.replace(EURO_SIGN, "").replace(',', ".");
    let cleaned = cleaned.trim();

    let (digits, multiplier) = if let Some(rest) = cleaned.strip_suffix('M') {
        (rest, MILLION)
    } else if let Some(rest) = cleaned.strip_suffix('K') {
        (rest, THOUSAND)
    } else {
        (cleaned, 1.0)
    };

    let amount = parse_decimal_numeral(raw, digits.trim())? * multiplier;
    if !amount.is_finite() {
        return Err(CurrencyError::new(raw, "amount out of range"));
    }
    Ok(Some(amount))
}

fn parse_decimal_numeral(raw: &str, digits: &str) -> Result<f64, CurrencyError> {
    if digits.is_empty() {
        return Err(CurrencyError::new(raw, "no digits"));
    }

    let mut saw_digit = false;
    let mut saw_point = false;
    for ch in digits.chars() {
        match ch {
            '0'..='9' => saw_digit = true,
            '.' if !saw_point => saw_point = true,
            '.' => return Err(CurrencyError::new(raw, "more than one decimal point")),
            _ => return Err(CurrencyError::new(raw, "unexpected character")),
        }
    }
    if !saw_digit {
        return Err(CurrencyError::new(raw, "no digits"));
    }

    digits
        .parse::<f64>()
        .map_err(|_| CurrencyError::new(raw, "not a decimal number"))
}
