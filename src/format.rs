//! Locale-aware rendering of dashboard figures.
//!
//! Everything here is presentation only; the stats module never depends on
//! these strings for further arithmetic.

use std::str::FromStr;

const FRENCH_MONTHS: [&str; 12] = [
    "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.", "nov.",
    "déc.",
];

const ENGLISH_MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Locale {
    En,
    Fr,
}

impl Locale {
    pub fn decimal_separator(self) -> char {
        match self {
            Locale::En => '.',
            Locale::Fr => ',',
        }
    }

    pub fn group_separator(self) -> char {
        match self {
            Locale::En => ',',
            // narrow no-break space, as emitted by fr-FR number formatting
            Locale::Fr => '\u{202f}',
        }
    }

    /// Abbreviated month name with its first letter capitalized. `month` is
    /// 1-based like [`chrono::Datelike::month`].
    pub fn month_abbreviation(self, month: u32) -> String {
        let names = match self {
            Locale::En => &ENGLISH_MONTHS,
            Locale::Fr => &FRENCH_MONTHS,
        };
        let index = (month.clamp(1, 12) - 1) as usize;

        capitalize(names[index])
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Locale, String> {
        let lang = s.split(|c: char| c == '-' || c == '_').next().unwrap_or_default();
        match lang.to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "fr" => Ok(Locale::Fr),
            _ => Err(format!("unsupported locale '{}', expected 'fr' or 'en'", s)),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Renders `value` rounded to `decimals` places with locale separators.
/// Halves round away from zero.
pub fn format_decimal(value: f64, decimals: u32, locale: Locale) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let factor = 10u128.pow(decimals);
    let scaled = (value.abs() * factor as f64).round() as u128;
    let integer = group_digits(&(scaled / factor).to_string(), locale.group_separator());
    let sign = if value < 0.0 && scaled != 0 { "-" } else { "" };

    if decimals == 0 {
        format!("{}{}", sign, integer)
    } else {
        format!(
            "{}{}{}{:0width$}",
            sign,
            integer,
            locale.decimal_separator(),
            scaled % factor,
            width = decimals as usize
        )
    }
}

/// Grouped integer rendering, e.g. `12 345` in French.
pub fn format_number(value: f64, locale: Locale) -> String {
    format_decimal(value, 0, locale)
}

/// Abbreviates with `M` from one million and `k` from one thousand, keeping
/// one decimal; smaller values are rendered in full.
pub fn format_large_number(value: f64, locale: Locale) -> String {
    if value >= 1_000_000.0 {
        format!("{} M", format_decimal(value / 1_000_000.0, 1, locale))
    } else if value >= 1_000.0 {
        format!("{} k", format_decimal(value / 1_000.0, 1, locale))
    } else {
        format_number(value, locale)
    }
}

/// Euro amount, whole units unless `cents` is set.
pub fn format_currency(value: f64, locale: Locale, cents: bool) -> String {
    let decimals = if cents { 2 } else { 0 };
    let amount = format_decimal(value.abs(), decimals, locale);
    let sign = if value < 0.0 && amount.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };

    match locale {
        Locale::En => format!("{}€{}", sign, amount),
        Locale::Fr => format!("{}{}\u{a0}€", sign, amount),
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 * separator.len_utf8());
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(digit);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_number_boundaries_in_french() {
        assert_eq!(format_large_number(999.0, Locale::Fr), "999");
        assert_eq!(format_large_number(1_000.0, Locale::Fr), "1,0 k");
        assert_eq!(format_large_number(1_000_000.0, Locale::Fr), "1,0 M");
        assert_eq!(format_large_number(30_000_000.0, Locale::Fr), "30,0 M");
    }

    #[test]
    fn large_number_boundaries_in_english() {
        assert_eq!(format_large_number(999.0, Locale::En), "999");
        assert_eq!(format_large_number(1_250.0, Locale::En), "1.3 k");
        assert_eq!(format_large_number(2_540_000.0, Locale::En), "2.5 M");
    }

    #[test]
    fn integers_are_grouped() {
        assert_eq!(format_number(1_234_567.0, Locale::En), "1,234,567");
        assert_eq!(format_number(1_234_567.0, Locale::Fr), "1\u{202f}234\u{202f}567");
        assert_eq!(format_number(-1_234.0, Locale::En), "-1,234");
        assert_eq!(format_number(0.4, Locale::En), "0");
    }

    #[test]
    fn currency_places_symbol_per_locale() {
        assert_eq!(format_currency(4_500.0, Locale::Fr, false), "4\u{202f}500\u{a0}€");
        assert_eq!(format_currency(4_500.0, Locale::En, false), "€4,500");
        assert_eq!(format_currency(15.5, Locale::En, true), "€15.50");
        assert_eq!(format_currency(-15.5, Locale::Fr, true), "-15,50\u{a0}€");
    }

    #[test]
    fn month_abbreviations_are_capitalized() {
        assert_eq!(Locale::Fr.month_abbreviation(1), "Janv.");
        assert_eq!(Locale::Fr.month_abbreviation(2), "Févr.");
        assert_eq!(Locale::Fr.month_abbreviation(8), "Août");
        assert_eq!(Locale::En.month_abbreviation(12), "Dec");
    }

    #[test]
    fn locale_parsing_accepts_region_tags() {
        assert_eq!("fr-FR".parse::<Locale>().unwrap(), Locale::Fr);
        assert_eq!("en_US".parse::<Locale>().unwrap(), Locale::En);
        assert!("de".parse::<Locale>().is_err());
    }
}
