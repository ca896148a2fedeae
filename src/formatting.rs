/// Abbreviated euro amount: `€105.5M`, `€850.0K`, `€999`.
///
/// Ties round half to even, as Rust's float formatting does for exactly
/// representable midpoints (`1_250_000.0` renders as `€1.2M`).
pub fn format_euro(value: Option<f64>) -> Option<String> {
    value.map(format_euro_amount)
}

pub fn format_euro_amount(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("€{:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("€{:.1}K", value / 1_000.0)
    } else {
        format!("€{value:.0}")
    }
}

/// Full euro amount with comma thousands separators and two decimals.
pub fn format_euro_grouped(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}€{grouped}.{cents}")
}

/// Whole ages print without a fractional part.
pub fn format_optional_age(age: Option<f64>) -> String {
    age.map_or_else(|| "-".to_string(), |value| value.to_string())
}

pub fn format_correlation(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => {
            let normalized = if v.abs() < 0.0005 { 0.0 } else { v };
            format!("{normalized:+.3}")
        }
        _ => "-".to_string(),
    }
}

pub fn format_share(share: f64) -> String {
    format!("{:.1}%", share * 100.0)
}
