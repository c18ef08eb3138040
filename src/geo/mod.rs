// Geo module: location vocabulary and the matching engine built on it.

pub mod knowledge_base;
pub mod engine;

pub use engine::{GeoEngine, GroupGeo, NormalizedLocation};
pub use knowledge_base::{KnowledgeBase, LocationEntry, Region};
