//! In-memory, insertion-ordered rule list.

use crate::rule::Rule;

/// Pattern of the first sample rule: a `START` ... `END` block.
pub const SAMPLE_BLOCK_PATTERN: &str = r"START[\s\S]*?END";

/// Pattern of the second sample rule: the body of a Java `main` method.
pub const SAMPLE_JAVA_MAIN_PATTERN: &str =
    r"public\s+static\s+void\s+main\s*\(\s*String\s*\[\s*\]\s+\w+\s*\)\s*\{[\s\S]*?\}";

/// The rule list shared by every open editor.
///
/// Order is insertion order and is also the overlap precedence order used when resolving
/// regions: earlier rules win.
#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    rules: Vec<Rule>,
}

impl RuleStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from an existing rule list.
    pub fn from_rules(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// All rules, including disabled and invalid ones.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Rules that are enabled and compile, in store order.
    pub fn enabled_rules(&self) -> Vec<Rule> {
        self.rules
            .iter()
            .filter(|rule| rule.is_enabled() && rule.is_valid())
            .cloned()
            .collect()
    }

    /// Append a rule.
    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Remove the first rule equal to `rule`.
    pub fn remove_rule(&mut self, rule: &Rule) -> bool {
        if let Some(pos) = self.rules.iter().position(|r| r == rule) {
            self.rules.remove(pos);
            true
        } else {
            false
        }
    }

    /// Replace the first rule equal to `old` with `new`, keeping its position.
    pub fn update_rule(&mut self, old: &Rule, new: Rule) -> bool {
        if let Some(slot) = self.rules.iter_mut().find(|r| **r == *old) {
            *slot = new;
            true
        } else {
            false
        }
    }

    /// Remove every rule.
    pub fn clear_rules(&mut self) {
        self.rules.clear();
    }

    /// Replace the store content with the two sample rules.
    pub fn add_sample_rules(&mut self) {
        self.clear_rules();
        self.add_rule(Rule::new(SAMPLE_BLOCK_PATTERN, ""));
        self.add_rule(Rule::new(SAMPLE_JAVA_MAIN_PATTERN, ""));
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if the store holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_rules_skip_invalid_and_disabled() {
        let mut store = RuleStore::new();
        store.add_rule(Rule::new("a+", ""));
        store.add_rule(Rule::new("(", ""));
        store.add_rule(Rule::new("b+", "").with_enabled(false));
        store.add_rule(Rule::new("", ""));
        store.add_rule(Rule::new("c+", ""));

        let patterns: Vec<String> = store
            .enabled_rules()
            .iter()
            .map(|r| r.pattern().to_string())
            .collect();
        assert_eq!(patterns, vec!["a+", "c+"]);
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_update_keeps_position() {
        let mut store = RuleStore::from_rules(vec![Rule::new("a", ""), Rule::new("b", "")]);
        assert!(store.update_rule(&Rule::new("a", ""), Rule::new("z", "")));
        assert_eq!(store.rules()[0].pattern(), "z");
        assert!(!store.update_rule(&Rule::new("missing", ""), Rule::new("y", "")));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut store = RuleStore::from_rules(vec![Rule::new("a", ""), Rule::new("b", "")]);
        assert!(store.remove_rule(&Rule::new("a", "")));
        assert!(!store.remove_rule(&Rule::new("a", "")));
        assert_eq!(store.len(), 1);
        store.clear_rules();
        assert!(store.is_empty());
    }

    #[test]
    fn test_sample_rules_replace_content() {
        let mut store = RuleStore::from_rules(vec![Rule::new("old", "")]);
        store.add_sample_rules();
        assert_eq!(store.len(), 2);
        assert_eq!(store.enabled_rules().len(), 2);
        assert_eq!(store.rules()[0].pattern(), SAMPLE_BLOCK_PATTERN);

        let java = "public static void main(String[] args) {\n    run();\n}";
        assert!(store.rules()[1].matches(java));
    }
}
