//! Semantic candidate search over the TF-IDF index, broadened by query
//! expansion.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::info;

use crate::config::EngineConfig;
use crate::errors::EngineError;
use crate::models::{Candidate, ScoredCandidate, Signal};
use crate::similarity::{QueryExpander, TextSimilarity};
use crate::store::DataStore;

/// Search hit set plus the expansion terms that broadened the query.
#[derive(Debug, Clone)]
pub struct SearchResults {
    pub results: Vec<ScoredCandidate>,
    pub expanded_terms: Vec<String>,
}

pub struct SearchService {
    store: Arc<dyn DataStore>,
    expander: QueryExpander,
    similarity: RwLock<TextSimilarity>,
    config: EngineConfig,
}

impl SearchService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: Arc<dyn DataStore>, config: EngineConfig) -> Self {
        Self {
            store,
            expander: QueryExpander,
            similarity: RwLock::new(TextSimilarity::new()),
            config,
        }
    }

    /// Search at the configured default result count.
    pub async fn search_default(&self, query: &str) -> Result<SearchResults, EngineError> {
        self.search(query, self.config.search_limit).await
    }

    /// Rebuilds the TF-IDF index over the whole candidate pool. Run at
    /// startup and after ingestion batches; returns the document count.
    pub async fn rebuild_index(&self) -> Result<usize, EngineError> {
        let candidates = self.store.get_all_candidates().await?;
        let documents: Vec<String> = candidates.iter().map(document_text).collect();
        let count = documents.len();
        self.similarity
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .build_index(&documents);
        info!(documents = count, "similarity index rebuilt");
        Ok(count)
    }

    /// Expansion-broadened semantic search over all candidates.
    pub async fn search(&self, query: &str, limit: usize) -> Result<SearchResults, EngineError> {
        let expanded_terms = self.expander.expand(query);
        let candidates = self.store.get_all_candidates().await?;

        let documents: Vec<(String, String)> = candidates
            .iter()
            .map(|c| (c.id.clone(), document_text(c)))
            .collect();

        let full_query = if expanded_terms.is_empty() {
            query.to_string()
        } else {
            format!("{query} {}", expanded_terms.join(" "))
        };

        let hits = self
            .similarity
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .find_similar(&full_query, &documents, limit);

        let by_id: HashMap<&str, &Candidate> =
            candidates.iter().map(|c| (c.id.as_str(), c)).collect();
        let results = hits
            .into_iter()
            .filter_map(|(id, score)| {
                by_id.get(id.as_str()).map(|candidate| ScoredCandidate {
                    candidate: (*candidate).clone(),
                    score,
                    signals: vec![Signal::new(
                        "semantic_match",
                        format!("Semantic similarity: {:.1}%", score * 100.0),
                        score,
                    )],
                })
            })
            .collect();

        Ok(SearchResults {
            results,
            expanded_terms,
        })
    }
}

/// The indexable text of a candidate: title, summary, keywords.
fn document_text(candidate: &Candidate) -> String {
    format!(
        "{} {} {}",
        candidate.title,
        candidate.summary,
        candidate.keywords.join(" ")
    )
}
