//! Content feature extraction used by the ingestion side of the system
//! to enrich candidates before they enter the pool.

use sha2::{Digest, Sha256};

use super::tfidf::TextSimilarity;

/// How many characters of normalized text feed the dedup fingerprint.
const FINGERPRINT_PREFIX_CHARS: usize = 100;

#[derive(Debug, Default)]
pub struct ContentAnalyzer {
    similarity: TextSimilarity,
}

impl ContentAnalyzer {
    pub fn new() -> Self {
        Self {
            similarity: TextSimilarity::new(),
        }
    }

    /// Top-k terms by augmented term frequency. Ties resolve
    /// alphabetically so output is stable across runs.
    pub fn extract_topics(&self, text: &str, top_k: usize) -> Vec<String> {
        let tokens = self.similarity.tokenize(text);
        let tf = self.similarity.compute_tf(&tokens);
        let mut terms: Vec<(String, f64)> = tf.into_iter().collect();
        terms.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        terms.into_iter().take(top_k).map(|(term, _)| term).collect()
    }

    /// Difficulty estimate from average word length.
    pub fn reading_level(&self, text: &str) -> &'static str {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return "intermediate";
        }
        let avg_word_length =
            words.iter().map(|w| w.len()).sum::<usize>() as f64 / words.len() as f64;

        if avg_word_length < 5.0 {
            "beginner"
        } else if avg_word_length < 6.5 {
            "intermediate"
        } else {
            "advanced"
        }
    }

    /// Dedup key: SHA-256 over the whitespace-normalized first 100
    /// characters of the lowercased text.
    pub fn content_fingerprint(&self, text: &str) -> String {
        let normalized = text
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        let prefix: String = normalized.chars().take(FINGERPRINT_PREFIX_CHARS).collect();
        format!("{:x}", Sha256::digest(prefix.as_bytes()))
    }
}
