//! Weekday extraction covering Icelandic declensions

use std::sync::LazyLock;

use regex::Regex;

use crate::models::Weekday;

/// Endings appended to each day stem: nominative, accusative, dative and
/// genitive, singular and plural, with and without the definite article
const DAY_ENDINGS: &[&str] = &[
    "dagur", "dag", "degi", "dags", "daginn", "deginum", "dagsins", "dagar", "daga", "dögum",
    "dagana", "dögunum", "daganna",
];

/// Per-day alternatives, scanned in order; the first hit claims the day
static DAY_PATTERNS: LazyLock<Vec<(Weekday, Vec<Regex>)>> = LazyLock::new(|| {
    Weekday::ALL
        .iter()
        .map(|&day| {
            let mut patterns: Vec<Regex> = DAY_ENDINGS
                .iter()
                .map(|ending| {
                    Regex::new(&format!(r"(?i)\b{}{}\b", day.stem(), ending)).expect("valid regex")
                })
                .collect();
            patterns.push(
                Regex::new(&format!(r"(?i)\b{}s?\b", day.english())).expect("valid regex"),
            );
            (day, patterns)
        })
        .collect()
});

static WORKDAY_GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:virka\s+daga|virkir\s+dagar|virkum\s+dögum|virkra\s+daga|vikudaga|weekdays)\b")
        .expect("valid regex")
});

static WEEKEND_GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:helgar|helgina|helgum|helginni|weekends?)\b").expect("valid regex")
});

/// Extract the days an offer is available, in week order for named days
/// followed by any days contributed by group terms
pub fn extract_weekdays(text: &str) -> Vec<Weekday> {
    let mut days: Vec<Weekday> = Vec::new();

    for (day, patterns) in DAY_PATTERNS.iter() {
        if patterns.iter().any(|p| p.is_match(text)) && !days.contains(day) {
            days.push(*day);
        }
    }

    let mut push_group = |group: &[Weekday]| {
        for day in group {
            if !days.contains(day) {
                days.push(*day);
            }
        }
    };

    if WORKDAY_GROUP.is_match(text) {
        push_group(&Weekday::WORKDAYS);
    }
    if WEEKEND_GROUP.is_match(text) {
        push_group(&Weekday::WEEKEND);
    }

    days
}
