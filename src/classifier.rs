// Field classification heuristics
//
// Decides, for one flat object at a time, which keys denote template
// identifiers and which single value is the best human-readable name.
// The traversal engine decides what inherits where.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

lazy_static! {
    /// Values that look name-like but denote users, paths, hosts and the
    /// like. Shared with the store, which re-checks on insert.
    pub static ref VALUE_EXCLUDES: Regex =
        Regex::new(r"(?i)(user|file|path|folder|dir|owner|group|env|host|machine)").unwrap();
}

pub struct FieldClassifier {
    id_key: Regex,
    // Ordered most specific first: an explicit template-name field must win
    // over a generic "name" in the same object.
    name_rules: Vec<Regex>,
}

impl FieldClassifier {
    pub fn new() -> Self {
        let name_rules = vec![
            Regex::new(r"(?i)^template[_-]?(name|title|label)$").unwrap(),
            Regex::new(r"(?i)^legal[_-]?hold.*template.*(name|title|label)$").unwrap(),
            Regex::new(r"(?i)^display[_-]?name$").unwrap(),
            Regex::new(r"(?i)^title$").unwrap(),
            Regex::new(r"(?i)^label$").unwrap(),
            Regex::new(r"(?i)^name$").unwrap(),
        ];

        Self {
            id_key: Regex::new(r"(?i)legal[_-]?hold[_-]?template[_-]?id").unwrap(),
            name_rules,
        }
    }

    /// Identifier values under id-pattern keys, in key enumeration order.
    pub fn extract_identifiers(&self, object: &Map<String, Value>) -> Vec<String> {
        object
            .iter()
            .filter(|(key, _)| self.id_key.is_match(key))
            .filter_map(|(_, value)| scalar_to_string(value))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Best name candidate by rule specificity, empty string when none.
    pub fn extract_name_candidate(&self, object: &Map<String, Value>) -> String {
        for rule in &self.name_rules {
            for (key, value) in object {
                if !rule.is_match(key) {
                    continue;
                }
                let Some(candidate) = scalar_to_string(value) else {
                    continue;
                };
                let candidate = candidate.trim();
                if !candidate.is_empty() && !VALUE_EXCLUDES.is_match(candidate) {
                    return candidate.to_string();
                }
            }
        }
        String::new()
    }
}

impl Default for FieldClassifier {
    fn default() -> Self {
        Self::new()
    }
}

// Strings and numbers only; objects, arrays, bools and nulls never
// contribute identifiers or names.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
