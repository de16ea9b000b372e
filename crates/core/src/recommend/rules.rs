//! Free-text to canonical-category resolution.

use super::normalize::normalize;

/// Category labels exactly as the catalog stores them.
pub const VALID_CATEGORIES: [&str; 8] =
    ["ACs", "EarPods", "Laptop", "Mobile", "Shoes", "Smartphones", "TVs", "Watches"];

/// One mapping from everyday trigger words to canonical category labels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryRule {
    pub categories: Vec<String>,
    pub trigger_words: Vec<String>,
}

impl CategoryRule {
    fn new(categories: &[&str], trigger_words: &[&str]) -> Self {
        Self {
            categories: categories.iter().map(|c| c.to_string()).collect(),
            trigger_words: trigger_words.iter().map(|w| w.to_string()).collect(),
        }
    }
}

/// Immutable rule table, built once at startup and injected into the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryRules {
    valid_categories: Vec<String>,
    rules: Vec<CategoryRule>,
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self::new(
            VALID_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            vec![
                CategoryRule::new(
                    &["Mobile", "Smartphones"],
                    &["phone", "smartphone", "mobile", "cell phone", "android", "iphone"],
                ),
                CategoryRule::new(
                    &["EarPods"],
                    &["earpods", "earbuds", "earphones", "airdopes", "buds", "tws"],
                ),
                CategoryRule::new(&["Laptop"], &["laptop", "notebook", "ultrabook"]),
                CategoryRule::new(&["TVs"], &["tv", "television", "smart tv"]),
                CategoryRule::new(&["Watches"], &["watch", "smartwatch", "smart watch"]),
                CategoryRule::new(&["ACs"], &["ac", "air conditioner", "aircon", "air conditioning"]),
                CategoryRule::new(
                    &["Shoes"],
                    &["shoe", "shoes", "sneaker", "sneakers", "running shoe"],
                ),
            ],
        )
    }
}

impl CategoryRules {
    pub fn new(valid_categories: Vec<String>, rules: Vec<CategoryRule>) -> Self {
        Self { valid_categories, rules }
    }

    /// Map raw user text to zero or more canonical category labels.
    ///
    /// An exact (normalized) match against a canonical label wins outright
    /// and never consults the rule table. Otherwise every rule whose any
    /// trigger word occurs as a substring of the normalized input
    /// contributes its categories; the result is the de-duplicated union in
    /// rule order. Blank input resolves to nothing, which callers interpret
    /// as "no category constraint".
    pub fn resolve(&self, input: &str) -> Vec<String> {
        let n = normalize(input);
        if n.is_empty() {
            return Vec::new();
        }

        let direct: Vec<String> =
            self.valid_categories.iter().filter(|c| normalize(c) == n).cloned().collect();
        if !direct.is_empty() {
            return direct;
        }

        let mut out: Vec<String> = Vec::new();
        for rule in &self.rules {
            if rule.trigger_words.iter().any(|w| n.contains(&normalize(w))) {
                for category in &rule.categories {
                    if !out.contains(category) {
                        out.push(category.clone());
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_match_is_case_and_space_insensitive() {
        let rules = CategoryRules::default();
        assert_eq!(rules.resolve("Laptop"), vec!["Laptop"]);
        assert_eq!(rules.resolve("laptop"), vec!["Laptop"]);
        assert_eq!(rules.resolve("  LAPTOP "), vec!["Laptop"]);
    }

    #[test]
    fn direct_match_takes_priority_over_rule_union() {
        // "mobile" is both a canonical label and a trigger word that would
        // otherwise pull in Smartphones as well.
        let rules = CategoryRules::default();
        assert_eq!(rules.resolve("Mobile"), vec!["Mobile"]);
    }

    #[test]
    fn trigger_word_substring_unions_rule_categories() {
        let rules = CategoryRules::default();
        assert_eq!(rules.resolve("I want a smartphone"), vec!["Mobile", "Smartphones"]);
    }

    #[test]
    fn multiple_rules_can_fire_without_duplicates() {
        let rules = CategoryRules::default();
        let resolved = rules.resolve("smartwatch with phone pairing");
        assert_eq!(resolved, vec!["Mobile", "Smartphones", "Watches"]);
    }

    #[test]
    fn unknown_text_resolves_to_nothing() {
        let rules = CategoryRules::default();
        assert!(rules.resolve("gadget").is_empty());
    }

    #[test]
    fn blank_input_resolves_to_nothing() {
        let rules = CategoryRules::default();
        assert!(rules.resolve("").is_empty());
        assert!(rules.resolve("   ").is_empty());
    }

    #[test]
    fn alternate_rule_tables_are_injectable() {
        let rules = CategoryRules::new(
            vec!["Fridges".to_string()],
            vec![CategoryRule::new(&["Fridges"], &["fridge", "refrigerator"])],
        );
        assert_eq!(rules.resolve("a big refrigerator"), vec!["Fridges"]);
        assert!(rules.resolve("smartphone").is_empty());
    }
}
