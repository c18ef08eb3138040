use crate::model::{ConfigError, DistributionTarget, Job};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub telegram_bot_token: String,
    /// Operator chat that receives review messages and sends commands.
    pub telegram_chat_id: i64,
    /// Public channel approved jobs are published to.
    #[serde(default)]
    pub telegram_channel_id: Option<i64>,
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_check_interval")]
    pub check_interval_seconds: u64,
    #[serde(default)]
    pub seed_file: Option<String>,
    #[serde(default = "default_publish_delay")]
    pub publish_delay_seconds: [u64; 2],
}

/// Groups and jobs imported at startup.
#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub groups: Vec<DistributionTarget>,
    #[serde(default)]
    pub jobs: Vec<Job>,
}

fn default_database_path() -> String {
    "data.db".to_string()
}

fn default_check_interval() -> u64 {
    300
}

fn default_publish_delay() -> [u64; 2] {
    [5, 20]
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_json::from_str(content)?;
    let [min, max] = config.publish_delay_seconds;
    if min > max {
        return Err(ConfigError::Invalid(format!(
            "publish_delay_seconds min {} exceeds max {}",
            min, max
        )));
    }
    if config.check_interval_seconds == 0 {
        return Err(ConfigError::Invalid("check_interval_seconds must be positive".into()));
    }
    Ok(config)
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

pub fn load_seed(path: &str) -> Result<SeedData, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
