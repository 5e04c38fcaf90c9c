//! Category -> term lexicon for the regex food extractor
//!
//! Order matters: entries are scanned top to bottom and each word of a phrase
//! can be claimed by one entry only, so narrower entries (kids' burgers,
//! pizza subs) sit above the broader ones that would also match them.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{FoodCategory, Size};

pub struct LexiconEntry {
    pub kind: &'static str,
    pub category: FoodCategory,
    /// Regex alternatives, each matching one whole word or fixed phrase
    pub pattern: &'static str,
    /// Keywords kept as modifiers when present in the same phrase
    pub modifiers: &'static [&'static str],
}

pub const ENTRIES: &[LexiconEntry] = &[
    LexiconEntry {
        kind: "kids_burger",
        category: FoodCategory::Main,
        pattern: r"\w*barnaborgar\w*|kids?\s+burgers?",
        modifiers: &["ostur", "beikon"],
    },
    LexiconEntry {
        kind: "sub",
        category: FoodCategory::Main,
        pattern: r"\w*bát\w*|subs?|\w*samlok\w*|sandwich\w*",
        modifiers: &["skinku", "pizzabát", "kalkún", "túnfisk", "grænmetis", "kjúklinga", "footlong"],
    },
    LexiconEntry {
        kind: "burger",
        category: FoodCategory::Main,
        pattern: r"\w*(?:borgar|borgur)\w*|\w*burgers?",
        modifiers: &["ostborgari", "beikon", "tvöfald", "vegan", "kjúklinga"],
    },
    LexiconEntry {
        kind: "pizza",
        category: FoodCategory::Main,
        pattern: r"\w*(?:pizz|pits|píts)\w*",
        modifiers: &["pönnupizza", "margarita", "margherita", "pepperoni", "hawaii", "skinku", "vegan"],
    },
    LexiconEntry {
        kind: "chicken",
        category: FoodCategory::Main,
        pattern: r"\w*kjúkling\w*|chicken|(?:hot\s+)?wings|\w*væng\w*|bucket",
        modifiers: &["original", "zinger", "hot", "spicy", "heit", "sterk", "crispy"],
    },
    LexiconEntry {
        kind: "beef",
        category: FoodCategory::Main,
        pattern: r"\w*nautakjöt\w*|\w*nauta\w*|beef|steak",
        modifiers: &[],
    },
    LexiconEntry {
        kind: "fish",
        category: FoodCategory::Main,
        pattern: r"\w*fisk\w*|fish",
        modifiers: &["plokk", "steikt"],
    },
    LexiconEntry {
        kind: "fries",
        category: FoodCategory::Side,
        pattern: r"\w*fransk\w*|\w*frönsk\w*|fries|\w*kartöfl\w*|pommes",
        modifiers: &["sæt", "krydd"],
    },
    LexiconEntry {
        kind: "sauce",
        category: FoodCategory::Side,
        pattern: r"\w*sós\w*|sauce|dips?",
        modifiers: &["heit", "brún", "bbq", "kokteil", "hvítlauks", "bearnaise"],
    },
    LexiconEntry {
        kind: "salad",
        category: FoodCategory::Side,
        pattern: r"\w*salat\w*|salad|grænmeti\w*",
        modifiers: &[],
    },
    LexiconEntry {
        kind: "bread",
        category: FoodCategory::Side,
        pattern: r"\w*brauð\w*|bread",
        modifiers: &["hvítlauks", "ost"],
    },
    LexiconEntry {
        kind: "snack",
        category: FoodCategory::Side,
        pattern: r"snakk\w*|meðlæti\w*|snacks?|sides?",
        modifiers: &[],
    },
    LexiconEntry {
        kind: "soda",
        category: FoodCategory::Drink,
        pattern: r"gos\w*|\w*drykk\w*|soda|kók\w*|coke|pepsi|\w*cola|\w*kóla|appelsín",
        modifiers: &["sykurlaus", "zero", "diet", "ískalt"],
    },
    LexiconEntry {
        kind: "juice",
        category: FoodCategory::Drink,
        pattern: r"djús\w*|\w*safi|\w*safa|juice|ávaxt\w*|ávext\w*|svali",
        modifiers: &["appelsínu", "epla"],
    },
    LexiconEntry {
        kind: "coffee",
        category: FoodCategory::Drink,
        pattern: r"kaffi\w*|coffee",
        modifiers: &[],
    },
    LexiconEntry {
        kind: "ice_cream",
        category: FoodCategory::Dessert,
        pattern: r"ís|ísinn|\w*shake|\w*sjeik\w*|\w*hristing\w*",
        modifiers: &["súkkulaði", "vanillu", "jarðarberja"],
    },
    LexiconEntry {
        kind: "cookie",
        category: FoodCategory::Dessert,
        pattern: r"\w*kak[ao]\w*|\w*kök\w*|cookies?|kex|brownies?",
        modifiers: &["súkkulaði"],
    },
    LexiconEntry {
        kind: "dessert",
        category: FoodCategory::Dessert,
        pattern: r"eftirrétt\w*|desserts?",
        modifiers: &[],
    },
];

/// Compiled entries, each pattern wrapped in word boundaries
pub static LEXICON: LazyLock<Vec<(&'static LexiconEntry, Regex)>> = LazyLock::new(|| {
    ENTRIES
        .iter()
        .map(|entry| {
            let regex =
                Regex::new(&format!(r"(?i)\b(?:{})\b", entry.pattern)).expect("valid regex");
            (entry, regex)
        })
        .collect()
});

/// Look up a lexicon entry by its type key
pub fn entry_for(kind: &str) -> Option<&'static LexiconEntry> {
    ENTRIES.iter().find(|entry| entry.kind == kind)
}

const NUMBER_WORDS: &[(&str, u32)] = &[
    ("einn", 1),
    ("ein", 1),
    ("eitt", 1),
    ("tveir", 2),
    ("tvær", 2),
    ("tvö", 2),
    ("þrír", 3),
    ("þrjár", 3),
    ("þrjú", 3),
    ("fjórir", 4),
    ("fjórar", 4),
    ("fjögur", 4),
    ("fimm", 5),
    ("sex", 6),
    ("sjö", 7),
    ("átta", 8),
    ("níu", 9),
    ("tíu", 10),
    ("ellefu", 11),
    ("tólf", 12),
];

static NUMBER_WORD: LazyLock<Regex> = LazyLock::new(|| {
    let words: Vec<&str> = NUMBER_WORDS.iter().map(|(word, _)| *word).collect();
    Regex::new(&format!(r"(?i)\b({})\b", words.join("|"))).expect("valid regex")
});

/// A count written directly in front of the term: "2 pizzur", "2x pizza",
/// "2 stórar pizzur"
static ADJACENT_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\s*(?:x\s*)?(?:(?:stór|lítil|miðlungs)\w*\s+)?$")
        .expect("valid regex")
});

static INCHES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(\d{1,2})\s*(?:"|”|''|tomm\w*|inch\w*)"#).expect("valid regex")
});

static LITERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+(?:[.,]\d+)?)\s*(?:l|ltr|lítr\w*|lítra)\b").expect("valid regex")
});

static SIZE_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(stór\w*|lítil\w*|lítill|miðlungs|large|medium|small|big)\b")
        .expect("valid regex")
});

/// Quantity for a term starting at `term_start` within `phrase`
pub fn quantity(phrase: &str, term_start: usize) -> u32 {
    if let Some(caps) = ADJACENT_COUNT.captures(&phrase[..term_start]) {
        if let Some(n) = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) {
            if n > 0 {
                return n;
            }
        }
    }
    NUMBER_WORD
        .captures(phrase)
        .and_then(|caps| caps.get(1))
        .and_then(|m| {
            let word = m.as_str().to_lowercase();
            NUMBER_WORDS
                .iter()
                .find(|(w, _)| *w == word)
                .map(|(_, n)| *n)
        })
        .unwrap_or(1)
}

/// First size found in the phrase: inches, then liters, then a descriptor
pub fn size(phrase: &str) -> Option<Size> {
    if let Some(caps) = INCHES.captures(phrase) {
        return Some(Size::inches(&caps[1]));
    }
    if let Some(caps) = LITERS.captures(phrase) {
        return Some(Size::liters(caps[1].replace(',', ".")));
    }
    SIZE_WORD.captures(phrase).map(|caps| {
        let word = caps[1].to_lowercase();
        let canonical = if word.starts_with("stór") {
            "stór".to_string()
        } else if word.starts_with("lítil") {
            "lítil".to_string()
        } else {
            word
        };
        Size::descriptor(canonical)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SizeUnit;

    #[test]
    fn test_every_pattern_compiles() {
        assert_eq!(LEXICON.len(), ENTRIES.len());
    }

    #[test]
    fn test_entry_lookup() {
        assert_eq!(entry_for("fries").unwrap().category, FoodCategory::Side);
        assert!(entry_for("spaceship").is_none());
    }

    #[test]
    fn test_quantity_adjacent_digit() {
        let phrase = "2 búlluborgarar";
        assert_eq!(quantity(phrase, phrase.find("búllu").unwrap()), 2);
        let phrase = "3x pizza";
        assert_eq!(quantity(phrase, phrase.find("pizza").unwrap()), 3);
        let phrase = "2 stórar pizzur";
        assert_eq!(quantity(phrase, phrase.find("pizzur").unwrap()), 2);
    }

    #[test]
    fn test_quantity_number_word_and_default() {
        let phrase = "tvær pizzur";
        assert_eq!(quantity(phrase, phrase.find("pizzur").unwrap()), 2);
        let phrase = "2 l gos";
        assert_eq!(quantity(phrase, phrase.find("gos").unwrap()), 1);
        let phrase = "12 tommu pizza";
        assert_eq!(quantity(phrase, phrase.find("pizza").unwrap()), 1);
    }

    #[test]
    fn test_size_priority() {
        assert_eq!(size("stór 12\" pizza"), Some(Size::inches("12")));
        assert_eq!(size("12 tommu pizza"), Some(Size::inches("12")));
        assert_eq!(size("2 l gos"), Some(Size::liters("2")));
        assert_eq!(size("0,5 lítra gos"), Some(Size::liters("0.5")));
        let descriptor = size("stórar franskar").unwrap();
        assert_eq!(descriptor.unit, SizeUnit::Descriptor);
        assert_eq!(descriptor.value, "stór");
        assert_eq!(size("franskar"), None);
    }
}
