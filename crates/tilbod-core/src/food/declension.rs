//! Declension normalization: inflected Icelandic food words to nominative singular
//!
//! The table is matched on word endings so compounds inherit the rule of
//! their head noun ("búlluborgarar" -> "búlluborgari").

use std::sync::LazyLock;

/// (inflected ending, nominative ending)
const DECLENSIONS: &[(&str, &str)] = &[
    // gos
    ("gosinu", "gos"),
    ("gosanna", "gos"),
    ("gosið", "gos"),
    ("gosum", "gos"),
    ("gosi", "gos"),
    ("goss", "gos"),
    // franskar
    ("frönskum", "franskar"),
    ("franskum", "franskar"),
    ("frönsku", "franskar"),
    ("franska", "franskar"),
    // borgari
    ("borgararnir", "borgari"),
    ("borgaranum", "borgari"),
    ("borgarann", "borgari"),
    ("borgarans", "borgari"),
    ("borgarar", "borgari"),
    ("borgurum", "borgari"),
    ("borgara", "borgari"),
    // kjúklingur
    ("kjúklingunum", "kjúklingur"),
    ("kjúklingnum", "kjúklingur"),
    ("kjúklinginn", "kjúklingur"),
    ("kjúklingum", "kjúklingur"),
    ("kjúklingar", "kjúklingur"),
    ("kjúklings", "kjúklingur"),
    ("kjúklinga", "kjúklingur"),
    // pizza
    ("pizzunnar", "pizza"),
    ("pizzunni", "pizza"),
    ("pizzanna", "pizza"),
    ("pizzuna", "pizza"),
    ("pizzur", "pizza"),
    ("pizzum", "pizza"),
    ("pizzu", "pizza"),
    // vængir
    ("vængjunum", "vængir"),
    ("vængina", "vængir"),
    ("vængjum", "vængir"),
    ("vængi", "vængir"),
    ("væng", "vængir"),
    // sósa
    ("sósanna", "sósa"),
    ("sósunni", "sósa"),
    ("sósuna", "sósa"),
    ("sósur", "sósa"),
    ("sósum", "sósa"),
    ("sósu", "sósa"),
    // brauð
    ("brauðinu", "brauð"),
    ("brauðið", "brauð"),
    ("brauðs", "brauð"),
    // bátur
    ("bátnum", "bátur"),
    ("bátinn", "bátur"),
    ("bátar", "bátur"),
    ("bátum", "bátur"),
    ("báta", "bátur"),
    ("báti", "bátur"),
    ("bát", "bátur"),
    // drykkur
    ("drykkjum", "drykkur"),
    ("drykkir", "drykkur"),
    ("drykki", "drykkur"),
    ("drykk", "drykkur"),
    // kaka
    ("kökuna", "kaka"),
    ("kökur", "kaka"),
    ("kökum", "kaka"),
    ("köku", "kaka"),
    // misc
    ("djúsi", "djús"),
    ("salatið", "salat"),
    ("salati", "salat"),
];

/// Longest endings first so "borgarar" wins over "borgara"
static BY_LENGTH: LazyLock<Vec<(&'static str, &'static str)>> = LazyLock::new(|| {
    let mut table = DECLENSIONS.to_vec();
    table.sort_by_key(|(ending, _)| std::cmp::Reverse(ending.chars().count()));
    table
});

/// Normalize one word
pub fn normalize_word(word: &str) -> String {
    let lower = word.trim().to_lowercase();
    for (ending, nominative) in BY_LENGTH.iter() {
        if let Some(stem) = lower.strip_suffix(ending) {
            return format!("{}{}", stem, nominative);
        }
    }
    lower
}

/// Normalize an item name; only the head (last) word of a phrase declines
pub fn normalize_name(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    match words.split_last() {
        None => String::new(),
        Some((head, rest)) => {
            let mut out: Vec<String> = rest.iter().map(|w| w.to_lowercase()).collect();
            out.push(normalize_word(head));
            out.join(" ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_forms() {
        assert_eq!(normalize_word("gosi"), "gos");
        assert_eq!(normalize_word("frönskum"), "franskar");
        assert_eq!(normalize_word("Pizzur"), "pizza");
        assert_eq!(normalize_word("kjúklingnum"), "kjúklingur");
        assert_eq!(normalize_word("sósu"), "sósa");
    }

    #[test]
    fn test_compounds_follow_head_noun() {
        assert_eq!(normalize_word("Búlluborgarar"), "búlluborgari");
        assert_eq!(normalize_word("barnaborgara"), "barnaborgari");
        assert_eq!(normalize_word("skinkubát"), "skinkubátur");
        assert_eq!(normalize_word("gosdrykk"), "gosdrykkur");
    }

    #[test]
    fn test_nominative_is_stable() {
        for word in ["gos", "franskar", "borgari", "pizza", "bátur", "sósa", "kjúklingur"] {
            assert_eq!(normalize_word(word), word);
            assert_eq!(normalize_word(&normalize_word(word)), word);
        }
    }

    #[test]
    fn test_phrase_normalizes_last_word() {
        assert_eq!(normalize_name("Stór Pizzur"), "stór pizza");
        assert_eq!(normalize_name("  "), "");
    }
}
