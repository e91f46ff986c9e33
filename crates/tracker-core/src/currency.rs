//! Localized currency formatting and lenient amount parsing.

/// Formats currency amounts for presentation.
pub trait CurrencyFormatter: Send + Sync {
    fn format_amount(&self, amount: f64) -> String;

    /// Parses user-entered text, returning `0.0` when nothing numeric is found.
    fn parse_amount(&self, text: &str) -> f64 {
        parse(text)
    }
}

/// Formatting and parsing rules for one display locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleCurrency {
    pub symbol: String,
    pub decimal_separator: char,
    pub grouping_separator: char,
    pub precision: u8,
}

impl Default for LocaleCurrency {
    fn default() -> Self {
        Self {
            symbol: "R$".into(),
            decimal_separator: ',',
            grouping_separator: '.',
            precision: 2,
        }
    }
}

impl LocaleCurrency {
    /// Resolves display rules for a language tag and ISO currency code.
    pub fn for_locale(language_tag: &str, currency: &str) -> Self {
        let symbol = symbol_for(currency);
        match language_tag.trim().to_ascii_lowercase().as_str() {
            "en-us" | "en_us" | "en" => Self {
                symbol,
                decimal_separator: '.',
                grouping_separator: ',',
                precision: 2,
            },
            _ => Self {
                symbol,
                ..Self::default()
            },
        }
    }

    pub fn format(&self, amount: f64) -> String {
        let body = format_number(self, amount.abs());
        if amount < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
            format!("-{} {}", self.symbol, body)
        } else {
            format!("{} {}", self.symbol, body)
        }
    }

    /// Reads an amount using this locale's separators. See [`parse_strict_with`].
    pub fn parse_strict(&self, text: &str) -> Option<f64> {
        parse_strict_with(text, self.decimal_separator, self.grouping_separator)
    }
}

impl CurrencyFormatter for LocaleCurrency {
    fn format_amount(&self, amount: f64) -> String {
        self.format(amount)
    }

    fn parse_amount(&self, text: &str) -> f64 {
        self.parse_strict(text).unwrap_or(0.0)
    }
}

pub fn symbol_for(code: &str) -> String {
    match code.trim().to_ascii_uppercase().as_str() {
        "BRL" => "R$".into(),
        "USD" => "$".into(),
        "EUR" => "€".into(),
        "GBP" => "£".into(),
        other => other.into(),
    }
}

fn format_number(locale: &LocaleCurrency, value: f64) -> String {
    let body = format!("{:.*}", locale.precision as usize, value);
    let (int_part, frac_part) = match body.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (body.as_str(), None),
    };
    let grouped = group_digits(int_part, locale.grouping_separator);
    match frac_part {
        Some(frac) => format!("{}{}{}", grouped, locale.decimal_separator, frac),
        None => grouped,
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}

/// Lenient parse: unparsable input yields `0.0`.
pub fn parse(text: &str) -> f64 {
    parse_strict(text).unwrap_or(0.0)
}

/// Parses an amount written in the default `1.234,56` style.
pub fn parse_strict(text: &str) -> Option<f64> {
    parse_strict_with(text, ',', '.')
}

/// Parses an amount given the locale's `decimal` and `grouping` separators.
///
/// When both separators appear, `grouping` is dropped and `decimal` marks the
/// fraction. A lone `decimal` is the decimal point. When only `grouping`
/// appears and it is `.`, every occurrence but the last groups digits and the
/// last one is the decimal point, so `1234.56` is accepted under `1.234,56`
/// rules. Any other lone grouping separator is dropped.
/// Currency symbols and whitespace are ignored. Returns `None` when no number
/// can be read.
pub fn parse_strict_with(text: &str, decimal: char, grouping: char) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-' || *c == decimal || *c == grouping)
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = if cleaned.contains(decimal) && cleaned.contains(grouping) {
        cleaned.replace(grouping, "").replacen(decimal, ".", 1)
    } else if cleaned.contains(decimal) {
        cleaned.replacen(decimal, ".", 1)
    } else if grouping != '.' {
        cleaned.replace(grouping, "")
    } else {
        let parts: Vec<&str> = cleaned.split(grouping).collect();
        match parts.split_last() {
            Some((decimals, integer)) if !integer.is_empty() => {
                format!("{}.{}", integer.concat(), decimals)
            }
            _ => cleaned.clone(),
        }
    };

    leading_number(&normalized).and_then(|number| number.parse::<f64>().ok())
}

/// Longest prefix shaped like `-?digits[.digits]`, mirroring prefix-tolerant float parsing.
fn leading_number(text: &str) -> Option<&str> {
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (idx, ch) in text.char_indices() {
        match ch {
            '-' if idx == 0 => {}
            '.' if !seen_dot => seen_dot = true,
            c if c.is_ascii_digit() => seen_digit = true,
            _ => break,
        }
        end = idx + ch.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    Some(text[..end].trim_end_matches('.'))
}
