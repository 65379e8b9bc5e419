use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z]+").expect("valid word regex"));

/// Derives profile tags from free-form bio text by matching lowercased words
/// against a configured vocabulary. The vocabulary is injected (from config),
/// not baked in, so it can be tuned or localized without code changes.
pub struct TagExtractor {
    vocabulary: HashSet<String>,
}

impl TagExtractor {
    pub fn new(vocabulary: &[String]) -> Self {
        Self {
            vocabulary: vocabulary.iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    pub fn extract(&self, bio: &str) -> BTreeSet<String> {
        WORD.find_iter(bio)
            .map(|m| m.as_str().to_lowercase())
            .filter(|word| self.vocabulary.contains(word))
            .collect()
    }
}

/// Number of tags two users share.
pub fn tag_overlap(a: &BTreeSet<String>, b: &BTreeSet<String>) -> usize {
    a.intersection(b).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> TagExtractor {
        TagExtractor::new(&[
            "music".to_string(),
            "coffee".to_string(),
            "yoga".to_string(),
            "dogs".to_string(),
        ])
    }

    #[test]
    fn extraction_is_case_insensitive_and_ignores_punctuation() {
        let tags = extractor().extract("Music lover. COFFEE enthusiast! Plant mom.");
        assert_eq!(
            tags,
            BTreeSet::from(["music".to_string(), "coffee".to_string()])
        );
    }

    #[test]
    fn words_outside_the_vocabulary_are_dropped() {
        let tags = extractor().extract("Photographer by day, DJ by night.");
        assert!(tags.is_empty());
    }

    #[test]
    fn repeated_words_produce_one_tag() {
        let tags = extractor().extract("coffee coffee coffee");
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn overlap_counts_shared_tags() {
        let a = BTreeSet::from(["music".to_string(), "coffee".to_string()]);
        let b = BTreeSet::from(["coffee".to_string(), "yoga".to_string()]);
        assert_eq!(tag_overlap(&a, &b), 1);
        assert_eq!(tag_overlap(&a, &a), 2);
        assert_eq!(tag_overlap(&a, &BTreeSet::new()), 0);
    }
}
