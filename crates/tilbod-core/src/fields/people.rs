//! Head counts such as "4 manna" or "fyrir 2"

use std::sync::LazyLock;

use regex::Regex;

/// Largest head count taken at face value; anything above is a price or code
const MAX_PEOPLE: u32 = 50;

static PEOPLE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\b(\d{1,2})\s*(?:manna|manns|people|persons?|pers\.)",
        r"(?i)\bfyrir\s*(\d{1,2})\b",
        r"(?i)\b(\d{1,2})-(?:person|people|manna)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// How many people the offer is meant for; the first pattern that yields a
/// plausible count wins
pub fn extract_suits_people(text: &str) -> Option<u32> {
    PEOPLE_PATTERNS.iter().find_map(|pattern| {
        pattern.captures_iter(text).find_map(|caps| {
            let m = caps.get(1)?;
            if followed_by_amount(&text[m.end()..]) {
                return None;
            }
            m.as_str()
                .parse::<u32>()
                .ok()
                .filter(|n| (1..=MAX_PEOPLE).contains(n))
        })
    })
}

/// "fyrir 2.990 kr" and "fyrir 1990" are prices, not head counts
fn followed_by_amount(rest: &str) -> bool {
    let rest_trimmed = rest.trim_start().to_lowercase();
    if rest_trimmed.starts_with("kr") || rest_trimmed.starts_with("isk") {
        return true;
    }
    let mut chars = rest.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some('.' | ','), Some(c)) if c.is_ascii_digit()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_people_count() {
        assert_eq!(extract_suits_people("Tilboð fyrir 4 manna fjölskyldu"), Some(4));
        assert_eq!(extract_suits_people("Hentar 2 people"), Some(2));
        assert_eq!(extract_suits_people("Veisla fyrir 6"), Some(6));
        assert_eq!(extract_suits_people("2-person meal"), Some(2));
    }

    #[test]
    fn test_prices_are_not_people() {
        assert_eq!(extract_suits_people("Allt þetta fyrir 2.990 kr"), None);
        assert_eq!(extract_suits_people("fyrir 1990 kr"), None);
        assert_eq!(extract_suits_people("fyrir 99 kr"), None);
    }

    #[test]
    fn test_no_count() {
        assert_eq!(extract_suits_people("Stór pizza og gos"), None);
    }
}
