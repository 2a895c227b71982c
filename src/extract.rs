//! Request feature extraction
//!
//! Turning raw request text into candidate feature names is an external
//! collaborator concern, not part of the engine core; the trait is the seam.
//! The shipped `KeywordExtractor` is a deliberately dumb, deterministic
//! splitter. Callers with real NLP plug their own implementation.

use regex::Regex;
use std::collections::HashSet;

/// Collaborator interface: raw request text to candidate feature names
pub trait FeatureExtractor {
    fn extract(&self, raw_request: &str) -> Vec<String>;
}

/// Fixed feature list; useful for tests and for callers that resolve
/// features upstream
pub struct StaticExtractor {
    features: Vec<String>,
}

impl StaticExtractor {
    pub fn new(features: &[&str]) -> Self {
        Self {
            features: features.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl FeatureExtractor for StaticExtractor {
    fn extract(&self, _raw_request: &str) -> Vec<String> {
        self.features.clone()
    }
}

/// Filler words dropped from feature phrases
const STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "to", "for", "of", "with", "in", "on", "task", "request",
    "requests", "add", "adds", "support", "supports", "should", "must", "have", "has", "field",
    "fields", "feature", "features", "collect", "store", "please", "implement", "we", "need",
    "needs", "want", "wants", "new", "user", "users",
];

/// Regex-based keyword splitter
///
/// Quoted phrases win outright; otherwise the text is split on list
/// separators ("and", commas, semicolons, newlines, bullets) and each
/// segment is reduced to its non-stopword tokens joined with '-'.
pub struct KeywordExtractor {
    quoted: Regex,
    bullet: Regex,
    token: Regex,
    stopwords: HashSet<&'static str>,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordExtractor {
    pub fn new() -> Self {
        Self {
            // The patterns are static, so construction cannot fail
            quoted: Regex::new(r#""([^"]+)""#).expect("static regex"),
            bullet: Regex::new(r"^\s*(?:[-*]|\d+[.)])\s*").expect("static regex"),
            token: Regex::new(r"[a-z0-9]+").expect("static regex"),
            stopwords: STOPWORDS.iter().copied().collect(),
        }
    }

    fn normalize(&self, segment: &str) -> Option<String> {
        let lowered = segment.to_lowercase();
        let tokens: Vec<&str> = self
            .token
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|t| t.len() > 1 && !self.stopwords.contains(t))
            .collect();
        if tokens.is_empty() {
            None
        } else {
            Some(tokens.join("-"))
        }
    }

    fn push_unique(seen: &mut HashSet<String>, out: &mut Vec<String>, feature: String) {
        if seen.insert(feature.clone()) {
            out.push(feature);
        }
    }
}

impl FeatureExtractor for KeywordExtractor {
    fn extract(&self, raw_request: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut features = Vec::new();

        // Quoted phrases are taken as explicit feature names
        for capture in self.quoted.captures_iter(raw_request) {
            if let Some(phrase) = capture.get(1) {
                if let Some(feature) = self.normalize(phrase.as_str()) {
                    Self::push_unique(&mut seen, &mut features, feature);
                }
            }
        }
        if !features.is_empty() {
            return features;
        }

        for line in raw_request.lines() {
            let line = self.bullet.replace(line, "");
            for segment in line
                .split([',', ';'])
                .flat_map(|s| s.split(" and "))
            {
                if let Some(feature) = self.normalize(segment) {
                    Self::push_unique(&mut seen, &mut features, feature);
                }
            }
        }

        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_phrases_win() {
        let extractor = KeywordExtractor::new();
        let features = extractor.extract(r#"Add "name" and "email address" to the form"#);
        assert_eq!(features, vec!["name", "email-address"]);
    }

    #[test]
    fn test_and_list_splitting() {
        let extractor = KeywordExtractor::new();
        let features = extractor.extract("collect name and email");
        assert_eq!(features, vec!["name", "email"]);
    }

    #[test]
    fn test_bullet_list() {
        let extractor = KeywordExtractor::new();
        let features = extractor.extract("- name validation\n- email\n* avatar upload");
        assert_eq!(
            features,
            vec!["name-validation", "email", "avatar-upload"]
        );
    }

    #[test]
    fn test_deduplication_preserves_order() {
        let extractor = KeywordExtractor::new();
        let features = extractor.extract("email, name, email");
        assert_eq!(features, vec!["email", "name"]);
    }

    #[test]
    fn test_stopwords_filtered() {
        let extractor = KeywordExtractor::new();
        let features = extractor.extract("the task requests a name field");
        assert_eq!(features, vec!["name"]);
    }

    #[test]
    fn test_static_extractor_ignores_text() {
        let extractor = StaticExtractor::new(&["name", "email"]);
        assert_eq!(extractor.extract("whatever"), vec!["name", "email"]);
    }
}
