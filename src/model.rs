// Core structs: Job, DistributionTarget, engine profiles, ScoredCandidate, errors
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A scraped job posting as the storage layer keeps it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default = "Utc::now")]
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    New,
    AwaitingApproval,
    Published,
    Skipped,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::New => "new",
            JobStatus::AwaitingApproval => "awaiting_approval",
            JobStatus::Published => "published",
            JobStatus::Skipped => "skipped",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(JobStatus::New),
            "awaiting_approval" => Some(JobStatus::AwaitingApproval),
            "published" => Some(JobStatus::Published),
            "skipped" => Some(JobStatus::Skipped),
            _ => None,
        }
    }
}

/// A social group or page the dispatcher may post to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionTarget {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub is_member: bool,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
}

/// The job fields the recommender reads, defaulted at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct JobProfile {
    pub location: String,
    pub title: String,
    pub description: String,
}

/// The target fields the recommender reads, defaulted at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetProfile {
    pub id: String,
    pub name: String,
    pub url: String,
    pub tags: Vec<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub target_id: String,
    pub name: String,
    pub url: String,
    pub score: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishStatus {
    Pending,
    Approved,
    Published,
    Skipped,
}

impl PublishStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublishStatus::Pending => "pending",
            PublishStatus::Approved => "approved",
            PublishStatus::Published => "published",
            PublishStatus::Skipped => "skipped",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PublishStatus::Pending),
            "approved" => Some(PublishStatus::Approved),
            "published" => Some(PublishStatus::Published),
            "skipped" => Some(PublishStatus::Skipped),
            _ => None,
        }
    }
}

/// Shortlist awaiting operator review, one per job.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub job_id: String,
    pub targets: Vec<ScoredCandidate>,
    pub status: PublishStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("location entry #{0} has an empty canonical name")]
    EmptyName(usize),
    #[error("location '{0}' has no keywords")]
    NoKeywords(String),
    #[error("location '{0}' does not list its own name as a keyword")]
    MissingSelfKeyword(String),
    #[error("location '{name}' has keyword '{keyword}' that is empty or not case-folded")]
    BadKeyword { name: String, keyword: String },
    #[error("duplicate canonical location '{0}'")]
    Duplicate(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid value in column {column}: {value}")]
    InvalidValue { column: &'static str, value: String },
    #[error("not found")]
    NotFound,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("telegram api error: {0}")]
    ApiError(String),
    #[error("telegram unreachable")]
    Unreachable,
    #[error("no publishing channel configured")]
    NoChannel,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
