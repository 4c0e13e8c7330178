/// Leniently parse a form entry as a number. Empty or garbage input is 0.
///
/// Accepts thousands separators, a leading `$`, a trailing `%` and
/// accounting-style parentheses for negatives.
pub fn parse_number(raw: &str) -> f64 {
    parse_number_opt(raw).unwrap_or(0.0)
}

/// Like [`parse_number`], but `None` when the entry is blank or not a number.
pub fn parse_number_opt(raw: &str) -> Option<f64> {
    let s = raw.replace([',', '$', '%', '"'], "");
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let value = match s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        Some(inner) => -inner.trim().parse::<f64>().ok()?,
        None => s.parse::<f64>().ok()?,
    };
    value.is_finite().then_some(value)
}

/// Round to cents. Never returns negative zero.
pub fn round_cents(val: f64) -> f64 {
    let rounded = (val * 100.0).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Plain two-decimal string used for stored derived fields: 1234.56
pub fn amount(val: f64) -> String {
    format!("{:.2}", round_cents(val))
}

/// Two-decimal percentage without a sign: 2.88
pub fn percent(val: f64) -> String {
    amount(val)
}

/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    let val = round_cents(val);
    let negative = val < 0.0;
    let abs = val.abs();
    let cents = format!("{:.2}", abs);
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(1234.56), "$1,234.56");
        assert_eq!(money(-500.00), "-$500.00");
        assert_eq!(money(0.0), "$0.00");
        assert_eq!(money(1000000.99), "$1,000,000.99");
        assert_eq!(money(42.10), "$42.10");
        assert_eq!(money(-0.001), "$0.00");
    }

    #[test]
    fn test_parse_number_lenient() {
        assert_eq!(parse_number("1000000"), 1_000_000.0);
        assert_eq!(parse_number(" $1,250,000.50 "), 1_250_000.5);
        assert_eq!(parse_number("2.5%"), 2.5);
        assert_eq!(parse_number("(150)"), -150.0);
        assert_eq!(parse_number("-75"), -75.0);
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("abc"), 0.0);
        assert_eq!(parse_number("NaN"), 0.0);
        assert_eq!(parse_number("inf"), 0.0);
    }

    #[test]
    fn test_parse_number_opt_blank_is_none() {
        assert_eq!(parse_number_opt(""), None);
        assert_eq!(parse_number_opt("   "), None);
        assert_eq!(parse_number_opt("n/a"), None);
        assert_eq!(parse_number_opt("0"), Some(0.0));
        assert_eq!(parse_number_opt("90"), Some(90.0));
        assert_eq!(parse_number_opt("(90)"), Some(-90.0));
        assert_eq!(parse_number_opt("$1,200"), Some(1200.0));
        assert_eq!(parse_number_opt("inf"), None);
    }

    #[test]
    fn test_amount_rounds_to_cents() {
        assert_eq!(amount(1800.0000000000002), "1800.00");
        assert_eq!(amount(0.005), "0.01");
        assert_eq!(amount(-0.0001), "0.00");
        assert_eq!(amount(17672.0), "17672.00");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }
}
