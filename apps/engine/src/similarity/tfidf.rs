//! TF-IDF text similarity.
//!
//! Lexical similarity over the candidate corpus without external ML:
//! augmented term frequency, corpus-wide inverse document frequency,
//! cosine similarity over sparse vectors.

use std::collections::{HashMap, HashSet};

/// Words carrying no topical signal, dropped during tokenization.
const STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "as", "is", "was", "are", "were", "been", "be", "have", "has", "had", "do", "does",
    "did", "will", "would", "could", "should", "may", "might", "must", "shall", "can", "this",
    "that", "these", "those", "i", "you", "he", "she", "it", "we", "they", "what", "which", "who",
    "whom", "whose", "where", "when", "why", "how", "all", "each", "every", "both", "few", "more",
    "most", "other", "some", "such", "no", "not", "only", "own", "same", "so", "than", "too",
    "very",
];

/// TF-IDF based similarity calculator.
///
/// `build_index` must run once over the corpus before IDF is
/// meaningful. With no index built, IDF degenerates to `ln(1 / (1 + df))`
/// — 0 for unseen terms — a defined edge case, not an error.
#[derive(Debug)]
pub struct TextSimilarity {
    document_frequencies: HashMap<String, usize>,
    num_documents: usize,
    stopwords: HashSet<&'static str>,
}

impl Default for TextSimilarity {
    fn default() -> Self {
        Self::new()
    }
}

impl TextSimilarity {
    pub fn new() -> Self {
        Self {
            document_frequencies: HashMap::new(),
            num_documents: 0,
            stopwords: STOPWORDS.iter().copied().collect(),
        }
    }

    /// Lowercases and extracts alphanumeric words that start with a
    /// letter, dropping stopwords and words shorter than 3 characters.
    /// Order and duplicates are preserved for TF computation.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|w| w.len() > 2)
            .filter(|w| w.starts_with(|c: char| c.is_ascii_alphabetic()))
            .filter(|w| !self.stopwords.contains(w))
            .map(str::to_string)
            .collect()
    }

    /// Augmented term frequency: `0.5 + 0.5 * (count / max_count)` per
    /// distinct term, so long documents are not favored. Empty input
    /// yields an empty mapping.
    pub fn compute_tf(&self, tokens: &[String]) -> HashMap<String, f64> {
        if tokens.is_empty() {
            return HashMap::new();
        }
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for token in tokens {
            *counts.entry(token).or_insert(0) += 1;
        }
        let max_freq = counts.values().copied().max().unwrap_or(1) as f64;
        counts
            .into_iter()
            .map(|(term, freq)| (term.to_string(), 0.5 + 0.5 * (freq as f64 / max_freq)))
            .collect()
    }

    /// Builds the IDF index from a corpus. Call once with all candidate
    /// documents before similarity queries rely on IDF.
    pub fn build_index<S: AsRef<str>>(&mut self, documents: &[S]) {
        self.num_documents = documents.len();
        self.document_frequencies.clear();
        for document in documents {
            let distinct: HashSet<String> =
                self.tokenize(document.as_ref()).into_iter().collect();
            for token in distinct {
                *self.document_frequencies.entry(token).or_insert(0) += 1;
            }
        }
    }

    /// `IDF(t) = ln(N / (1 + df(t)))`. Negative for terms present in
    /// every document — preserved, never clamped. With no index built,
    /// N is treated as 1 so unseen terms get `ln(1) = 0`.
    pub fn compute_idf(&self, term: &str) -> f64 {
        let df = self.document_frequencies.get(term).copied().unwrap_or(0);
        let n = self.num_documents.max(1) as f64;
        (n / (1.0 + df as f64)).ln()
    }

    /// TF(t) x IDF(t) per term, against the currently built index.
    pub fn compute_tfidf_vector(&self, text: &str) -> HashMap<String, f64> {
        let tokens = self.tokenize(text);
        self.compute_tf(&tokens)
            .into_iter()
            .map(|(term, tf)| {
                let idf = self.compute_idf(&term);
                (term, tf * idf)
            })
            .collect()
    }

    /// Cosine similarity: dot product over the key intersection divided
    /// by the product of full-vector L2 norms. 0.0 when either vector
    /// is empty or has zero norm.
    pub fn cosine_similarity(vec1: &HashMap<String, f64>, vec2: &HashMap<String, f64>) -> f64 {
        if vec1.is_empty() || vec2.is_empty() {
            return 0.0;
        }
        let dot: f64 = vec1
            .iter()
            .filter_map(|(term, v1)| vec2.get(term).map(|v2| v1 * v2))
            .sum();
        let mag1 = vec1.values().map(|v| v * v).sum::<f64>().sqrt();
        let mag2 = vec2.values().map(|v| v * v).sum::<f64>().sqrt();
        if mag1 == 0.0 || mag2 == 0.0 {
            return 0.0;
        }
        dot / (mag1 * mag2)
    }

    /// Similarity between two texts using whatever index is currently
    /// built.
    pub fn similarity(&self, text1: &str, text2: &str) -> f64 {
        let vec1 = self.compute_tfidf_vector(text1);
        let vec2 = self.compute_tfidf_vector(text2);
        Self::cosine_similarity(&vec1, &vec2)
    }

    /// Ranks `documents` (id, text pairs) against `query` by cosine
    /// similarity. Only strictly positive scores are returned, sorted
    /// descending; ties keep encounter order.
    pub fn find_similar(
        &self,
        query: &str,
        documents: &[(String, String)],
        top_k: usize,
    ) -> Vec<(String, f64)> {
        let query_vec = self.compute_tfidf_vector(query);

        let mut scores: Vec<(String, f64)> = documents
            .iter()
            .filter_map(|(id, text)| {
                let doc_vec = self.compute_tfidf_vector(text);
                let score = Self::cosine_similarity(&query_vec, &doc_vec);
                (score > 0.0).then(|| (id.clone(), score))
            })
            .collect();

        scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scores.truncate(top_k);
        scores
    }
}
