//! Beacon engine — content recommendation and proactive delivery.
//!
//! The pipeline retrieves candidate content for a user, scores it with
//! an explicit weighted multi-signal formula (TF-IDF lexical similarity
//! plus user-based collaborative filtering), and decides when — if ever
//! — to deliver the top recommendation, given preferences, timing
//! windows, and receptivity estimates.
//!
//! HTTP transport, LLM conversation, and durable storage are external
//! collaborators: hosts implement [`store::DataStore`] and drive
//! [`recommend::RecommendationEngine`] and [`trigger::TriggerService`].

pub mod analytics;
pub mod config;
pub mod errors;
pub mod models;
pub mod recommend;
pub mod search;
pub mod similarity;
pub mod store;
pub mod trigger;

pub use config::{init_tracing, EngineConfig};
pub use errors::EngineError;
pub use models::{
    Candidate, ContentCategory, ContentPriority, Feedback, FeedbackAction, FrequencyPreference,
    ScoredCandidate, Signal, User, UserActivity, UserContext,
};
pub use recommend::RecommendationEngine;
pub use search::SearchService;
pub use store::{memory::MemoryStore, DataStore};
pub use trigger::{queue::MessageQueue, TriggerDecision, TriggerResult, TriggerService};
