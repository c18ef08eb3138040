// Analyzer module: scoring and ranking of distribution targets for a job.

pub mod recommend;
pub mod topical;

// Re-export the main Recommender implementation for ease of use.
pub use recommend::{Recommender, RecommenderImpl};
