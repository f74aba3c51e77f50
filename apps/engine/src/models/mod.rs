pub mod candidate;
pub mod feedback;
pub mod user;

pub use candidate::{Candidate, ContentCategory, ContentPriority, ScoredCandidate, Signal};
pub use feedback::{Feedback, FeedbackAction};
pub use user::{FrequencyPreference, User, UserActivity, UserContext};
