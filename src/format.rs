//! Parsing and display helpers for money amounts.

use crate::progression::Money;

/// Parse a user-entered amount. Accepts thousands separators and a leading `$`.
pub fn parse_money(s: &str) -> Option<Money> {
    let cleaned = s.trim().trim_start_matches('$').replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn round_cents(v: Money) -> Money {
    (v * 100.0).round() / 100.0
}

pub fn format_money(v: Money) -> String {
    if !v.is_finite() {
        return "—".into();
    }
    if v < 0.0 {
        format!("-${:.2}", -v)
    } else {
        format!("${:.2}", v)
    }
}

/// Like [`format_money`] but always carries a sign, for profit columns.
pub fn format_signed_money(v: Money) -> String {
    if v >= 0.0 {
        format!("+{}", format_money(v))
    } else {
        format_money(v)
    }
}

pub fn format_percent(ratio: f64) -> String {
    if ratio.is_finite() { format!("{:.1}%", 100.0 * ratio) } else { "—".into() }
}
