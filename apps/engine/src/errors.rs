use thiserror::Error;

/// Library-level error type.
///
/// The core has no retryable I/O of its own: storage implementations
/// surface their failures through `Storage`, and the in-memory reference
/// store never constructs one. Policy outcomes (wait/queue/skip) are
/// ordinary return values, not errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}
