pub mod sender;
pub mod listener;
pub mod command_handler;

use crate::model::{Job, NotifyError, ScoredCandidate};
use crate::notifier::Publisher;
use crate::storage::SqliteStorage;
use reqwest::Client;
use std::sync::Arc;
use std::sync::atomic::AtomicI64;
use std::time::Instant;
use tokio::sync::{Mutex, Notify};

pub struct TelegramNotifier {
    pub bot_token: String,
    pub chat_id: i64,
    pub channel_id: Option<i64>,
    pub client: Client,
    pub offset: Arc<AtomicI64>,
    pub storage: Arc<Mutex<SqliteStorage>>,
    pub start_time: Instant,
    pub refresh_notify: Arc<Notify>,
}

impl TelegramNotifier {
    pub fn new(
        bot_token: String,
        chat_id: i64,
        channel_id: Option<i64>,
        storage: Arc<Mutex<SqliteStorage>>,
        refresh_notify: Arc<Notify>,
    ) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(35))
            .build()
            .map_err(|e| NotifyError::ApiError(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            bot_token,
            chat_id,
            channel_id,
            client,
            offset: Arc::new(AtomicI64::new(0)),
            storage,
            start_time: Instant::now(),
            refresh_notify,
        })
    }

    /// Message to the operator chat.
    pub async fn notify_text(&self, text: &str) -> Result<(), NotifyError> {
        sender::send_text(self, self.chat_id, text).await
    }

    /// Asks the operator to approve a job and its shortlist.
    pub async fn notify_review(&self, job: &Job, targets: &[ScoredCandidate]) -> Result<(), NotifyError> {
        sender::send_text(self, self.chat_id, &sender::format_review(job, targets)).await
    }

    pub async fn listen_for_commands(&self) {
        listener::listen_for_commands(self).await;
    }

    pub async fn set_my_commands(&self) -> Result<(), reqwest::Error> {
        let url = format!("https://api.telegram.org/bot{}/setMyCommands", self.bot_token);
        let commands = serde_json::json!({
            "commands": [
                { "command": "ping", "description": "Check connection" },
                { "command": "help", "description": "Command list" },
                { "command": "pending", "description": "Jobs awaiting approval" },
                { "command": "approve", "description": "Approve a job: /approve <id>" },
                { "command": "skip", "description": "Skip a job: /skip <id>" },
                { "command": "refresh", "description": "Run a dispatch cycle now" },
                { "command": "uptime", "description": "Service uptime" }
            ]
        });
        self.client.post(&url).json(&commands).send().await?;
        Ok(())
    }

    pub fn spawn_listener(notifier: Arc<TelegramNotifier>) {
        tokio::spawn(async move {
            tracing::info!("▶️ Starting Telegram listener...");
            notifier.listen_for_commands().await;
            tracing::info!("🛑 Telegram listener ended.");
        });
    }
}

#[async_trait::async_trait]
impl Publisher for TelegramNotifier {
    async fn publish(&self, job: &Job) -> Result<(), NotifyError> {
        let channel_id = self.channel_id.ok_or(NotifyError::NoChannel)?;
        sender::send_text(self, channel_id, &sender::format_post(job)).await
    }
}
