pub mod analyzer;
pub mod config;
pub mod geo;
pub mod model;
pub mod normalizer;
pub mod notifier;
pub mod storage;
pub mod utils;
