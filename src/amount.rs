use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::OnceLock;

use crate::model::InvoiceDraft;

/// Shown in place of the amount when nothing has been typed yet.
pub const EMPTY_AMOUNT: &str = "0.00";

/// Separators used when printing numbers. Defaults to en-US.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct NumberLocale {
    pub grouping: String,
    pub decimal: String,
}

impl Default for NumberLocale {
    fn default() -> Self {
        NumberLocale { grouping: ",".to_string(), decimal: ".".to_string() }
    }
}

/// Formats a free-text amount with two fraction digits and grouped thousands.
///
/// Empty input stays empty and anything that does not read as a number is
/// returned untouched, so the user always sees what they typed.
pub fn format_amount(raw: &str, locale: &NumberLocale) -> String {
    if raw.is_empty() {
        return String::new();
    }
    match parse_number(raw) {
        Some(n) if n.is_infinite() => if n < 0.0 { "-∞".to_string() } else { "∞".to_string() },
        Some(n) => two_places(n, locale),
        None => raw.to_string(),
    }
}

/// "Amount Due" line: formatted amount followed by the currency code.
pub fn amount_due(draft: &InvoiceDraft, locale: &NumberLocale) -> String {
    let formatted = format_amount(&draft.amount, locale);
    if formatted.is_empty() {
        return EMPTY_AMOUNT.to_string();
    }
    format!("{} {}", formatted, draft.currency).trim().to_string()
}

fn decimal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("valid decimal pattern")
    })
}

// Number() rules: trimmed, blank is zero, radix prefixes and signed Infinity allowed.
fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return Some(0.0);
    }
    match s {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            // from_str_radix would take a sign here, Number() does not
            if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
                return None;
            }
            return Some(digits.chars().fold(0.0, |acc, c| {
                acc * f64::from(radix) + f64::from(c.to_digit(radix).unwrap_or(0))
            }));
        }
    }
    if !decimal_re().is_match(s) {
        return None;
    }
    // Out-of-range exponents overflow to ±∞ like Number() does.
    s.parse::<f64>().ok()
}

fn two_places(n: f64, locale: &NumberLocale) -> String {
    // Shortest round-trip text first, so 1.005 rounds the way it reads.
    let fixed = match Decimal::from_str(&n.to_string()) {
        Ok(d) => format!("{:.2}", d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)),
        Err(_) => format!("{:.2}", n),
    };

    let (negative, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (n.is_sign_negative(), fixed.as_str()),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, "00"));

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&group_digits(int_part, &locale.grouping));
    out.push_str(&locale.decimal);
    out.push_str(frac_part);
    out
}

fn group_digits(digits: &str, sep: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * sep.len());
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(sep);
        }
        out.push(c);
    }
    out
}
