//! Price extraction in Icelandic krónur

use std::sync::LazyLock;

use regex::Regex;

/// Accepted range for prices coming from model output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceWindow {
    pub min: u32,
    pub max: u32,
}

impl PriceWindow {
    pub fn contains(&self, price: u32) -> bool {
        (self.min..=self.max).contains(&price)
    }
}

impl Default for PriceWindow {
    fn default() -> Self {
        Self {
            min: 500,
            max: 15_000,
        }
    }
}

const AMOUNT: &str = r"(\d{1,3}(?:[.,]\d{3})+|\d+(?:[.,]\d{1,2})?)";

/// Currency patterns in priority order
static PRICE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // 2.990 kr. / 1990kr / 1.290 krónur
        format!(r"(?i)\b{AMOUNT}\s*(?:krónur|króna|kr|isk)\b"),
        // kr. 2.990 / ISK 1990
        format!(r"(?i)\b(?:kr|isk)\.?\s*{AMOUNT}\b"),
        // 2.990,-
        r"\b(\d{1,3}(?:\.\d{3})+|\d{3,})\s*,-".to_string(),
        // Verð: 2.990
        format!(r"(?i)\bverð\s*:?\s*{AMOUNT}\b"),
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

static BARE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,3}(?:[.,]\d{3})+|\d+").expect("valid regex"));

/// Extract the first currency-marked price from text
pub fn extract_price(text: &str) -> Option<u32> {
    PRICE_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures_iter(text)
            .find_map(|caps| caps.get(1).and_then(|m| parse_amount(m.as_str())))
    })
}

/// Extract a price from model output and reject anything outside `window`.
///
/// Model output is noisier than page markup, so when no currency marker is
/// present the largest bare number is taken as the candidate.
pub fn extract_price_in_window(text: &str, window: PriceWindow) -> Option<u32> {
    let candidate = extract_price(text).or_else(|| {
        BARE_NUMBER
            .find_iter(text)
            .filter_map(|m| parse_amount(m.as_str()))
            .max()
    })?;
    window.contains(candidate).then_some(candidate)
}

/// Resolve Icelandic separators: three digits after the last "." or ","
/// mean thousands, one or two digits mean a decimal part that is folded
/// back into whole units (the separator is dropped, as on the source pages).
pub(crate) fn parse_amount(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    let digits: String = match raw.rfind(['.', ',']) {
        None => raw.to_string(),
        Some(pos) => {
            let tail_len = raw[pos + 1..].len();
            if tail_len == 0 || tail_len > 3 {
                return None;
            }
            raw.chars().filter(|c| c.is_ascii_digit()).collect()
        }
    };
    digits.parse().ok().filter(|&price: &u32| price > 0)
}

/// Prices on some pages lose their trailing zero ("299" for 2.990)
pub fn scale_short_price(price: u32) -> u32 {
    if (100..1000).contains(&price) {
        price * 10
    } else {
        price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands_separator() {
        assert_eq!(extract_price("Aðeins 2.990 kr."), Some(2990));
        assert_eq!(extract_price("1,290 kr"), Some(1290));
        assert_eq!(extract_price("12.490 krónur"), Some(12490));
    }

    #[test]
    fn test_currency_before_amount() {
        assert_eq!(extract_price("Verð kr. 3.490"), Some(3490));
        assert_eq!(extract_price("ISK 1990"), Some(1990));
    }

    #[test]
    fn test_plain_digits_and_dash_notation() {
        assert_eq!(extract_price("1990kr"), Some(1990));
        assert_eq!(extract_price("Tilboð 2.490,-"), Some(2490));
        assert_eq!(extract_price("Verð: 1.790"), Some(1790));
    }

    #[test]
    fn test_decimal_folded_into_whole_units() {
        assert_eq!(parse_amount("22,90"), Some(2290));
        assert_eq!(parse_amount("2.990"), Some(2990));
        assert_eq!(parse_amount("1990"), Some(1990));
        assert_eq!(parse_amount("1.2345"), None);
    }

    #[test]
    fn test_no_price() {
        assert_eq!(extract_price("Pizza með pepperoni"), None);
        assert_eq!(extract_price("12 tommu pizza"), None);
    }

    #[test]
    fn test_window_rejects_noise() {
        let window = PriceWindow::default();
        assert_eq!(extract_price_in_window("kr 2990", window), Some(2990));
        assert_eq!(extract_price_in_window("kr 12", window), None);
        assert_eq!(extract_price_in_window("kr 250000", window), None);
        assert_eq!(extract_price_in_window("Price 3490", window), Some(3490));
    }

    #[test]
    fn test_scale_short_price() {
        assert_eq!(scale_short_price(299), 2990);
        assert_eq!(scale_short_price(2990), 2990);
        assert_eq!(scale_short_price(50), 50);
    }
}
