//! Opening-hour range extraction

use std::sync::LazyLock;

use regex::Regex;

/// Explicit HH:MM-HH:MM ranges; the separator inside a time must be ":" or "."
/// so bare numbers ("frá 11 til 15") never qualify
static EXPLICIT_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:\b(?:frá|milli|kl)\.?\s*)?\b(\d{1,2})[:.](\d{2})\b\s*(?:-|–|—|til|og|to)\s*(?:kl\.?\s*)?\b(\d{1,2})[:.](\d{2})\b",
    )
    .expect("valid regex")
});

/// Named meal times and the range each stands for
static MEAL_TIMES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)hádegi", "11:00-15:00"),
        (r"(?i)\bmorgun(?:verð|mat)", "07:00-11:00"),
        (r"(?i)kvöld", "17:00-22:00"),
        (r"(?i)\bnótt", "22:00-06:00"),
    ]
    .into_iter()
    .map(|(pattern, range)| (Regex::new(pattern).expect("valid regex"), range))
    .collect()
});

/// Extract time ranges as zero-padded "HH:MM-HH:MM" strings.
///
/// Meal-time words only contribute when the text carries no explicit range.
pub fn extract_hours(text: &str) -> Vec<String> {
    let mut ranges: Vec<String> = Vec::new();

    for caps in EXPLICIT_RANGE.captures_iter(text) {
        let parts: Option<Vec<u32>> = (1..=4)
            .map(|i| caps.get(i).and_then(|m| m.as_str().parse().ok()))
            .collect();
        let Some(parts) = parts else { continue };
        let [start_h, start_m, end_h, end_m] = parts[..] else {
            continue;
        };
        if start_h > 24 || end_h > 24 || start_m > 59 || end_m > 59 {
            continue;
        }
        let range = format!("{:02}:{:02}-{:02}:{:02}", start_h, start_m, end_h, end_m);
        if !ranges.contains(&range) {
            ranges.push(range);
        }
    }

    if ranges.is_empty() {
        for (pattern, range) in MEAL_TIMES.iter() {
            if pattern.is_match(text) && !ranges.iter().any(|r| r == range) {
                ranges.push(range.to_string());
            }
        }
    }

    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kl_prefix() {
        assert_eq!(extract_hours("kl. 11:00-15:00"), vec!["11:00-15:00"]);
        assert_eq!(extract_hours("kl 07:00-11:00 alla daga"), vec!["07:00-11:00"]);
    }

    #[test]
    fn test_fra_til_and_milli_og() {
        assert_eq!(extract_hours("frá 11:00 til 15:00"), vec!["11:00-15:00"]);
        assert_eq!(extract_hours("milli 17.30 og 21.00"), vec!["17:30-21:00"]);
        assert_eq!(extract_hours("frá 12.00 til 16.00"), vec!["12:00-16:00"]);
    }

    #[test]
    fn test_zero_pads_hours() {
        assert_eq!(extract_hours("9:30-11:00"), vec!["09:30-11:00"]);
    }

    #[test]
    fn test_bare_numbers_are_not_hours() {
        assert!(extract_hours("frá 11 til 15").is_empty());
        assert!(extract_hours("Tilboð frá 11 til 15 (bara númer, ekki tími)").is_empty());
        assert!(extract_hours("Verð 1.290 - 2.490 kr").is_empty());
    }

    #[test]
    fn test_meal_words_only_without_explicit_range() {
        assert_eq!(extract_hours("Hádegistilboð"), vec!["11:00-15:00"]);
        assert_eq!(extract_hours("Kvöldtilboð"), vec!["17:00-22:00"]);
        assert_eq!(extract_hours("Morgunverðartilboð"), vec!["07:00-11:00"]);
        assert!(extract_hours("Opnum aftur á morgun").is_empty());
        assert_eq!(
            extract_hours("Hádegistilboð frá 11:30 til 14:00"),
            vec!["11:30-14:00"]
        );
    }

    #[test]
    fn test_rejects_impossible_times() {
        assert!(extract_hours("25:00-26:00").is_empty());
    }
}
