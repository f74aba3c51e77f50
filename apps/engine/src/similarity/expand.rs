use std::collections::HashSet;

/// Domain-term expansion table for query broadening. Static by design:
/// these are curated relationships, not learned ones.
const EXPANSIONS: &[(&str, &[&str])] = &[
    ("kafka", &["streaming", "messaging", "event-sourcing", "pub-sub", "queue"]),
    ("distributed", &["distributed-systems", "microservices", "scalability"]),
    ("database", &["sql", "nosql", "storage", "persistence", "data"]),
    ("ml", &["machine-learning", "ai", "deep-learning", "neural-network"]),
    ("kubernetes", &["k8s", "container", "docker", "orchestration", "devops"]),
    ("rust", &["systems-programming", "memory-safety", "performance"]),
    ("async", &["concurrency", "parallel", "threading", "non-blocking"]),
    ("api", &["rest", "graphql", "endpoint", "http", "microservice"]),
    ("test", &["testing", "unit-test", "integration", "tdd", "quality"]),
    ("security", &["auth", "authentication", "authorization", "encryption"]),
];

/// Broadens retrieval queries with related domain terms.
#[derive(Debug, Default, Clone, Copy)]
pub struct QueryExpander;

impl QueryExpander {
    /// Returns the deduplicated union of expansions for every known
    /// word in `query`. Unknown words contribute nothing; order is not
    /// guaranteed.
    pub fn expand(&self, query: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut expansions = Vec::new();
        for word in query.to_lowercase().split_whitespace() {
            if let Some((_, terms)) = EXPANSIONS.iter().find(|(key, _)| *key == word) {
                for term in terms.iter() {
                    if seen.insert(*term) {
                        expansions.push((*term).to_string());
                    }
                }
            }
        }
        expansions
    }
}
