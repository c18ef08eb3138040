// notifier/telegram/command_handler.rs

use crate::model::{JobStatus, PublishStatus};
use crate::notifier::telegram::TelegramNotifier;
use crate::storage::SqliteStorage;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ping,
    Help,
    Pending,
    Approve(String),
    Skip(String),
    Refresh,
    Uptime,
    MissingArgument(&'static str),
    Unknown,
}

impl Command {
    /// Parses "/name[@bot] [arg]".
    pub fn parse(text: &str) -> Command {
        let mut parts = text.split_whitespace();
        let name = parts
            .next()
            .map(|p| p.split('@').next().unwrap_or(p))
            .unwrap_or("");
        let arg = parts.next().map(str::to_string);
        match (name, arg) {
            ("/ping", _) => Command::Ping,
            ("/help" | "/start", _) => Command::Help,
            ("/pending", _) => Command::Pending,
            ("/approve", Some(id)) => Command::Approve(id),
            ("/approve", None) => Command::MissingArgument("/approve"),
            ("/skip", Some(id)) => Command::Skip(id),
            ("/skip", None) => Command::MissingArgument("/skip"),
            ("/refresh", _) => Command::Refresh,
            ("/uptime", _) => Command::Uptime,
            _ => Command::Unknown,
        }
    }
}

const HELP: &str = "📋 Available commands:\n\
    /ping — check connection\n\
    /help — command list\n\
    /pending — jobs awaiting approval\n\
    /approve <id> — publish a job\n\
    /skip <id> — drop a job\n\
    /refresh — run a dispatch cycle now\n\
    /uptime — service uptime";

/// Handles an incoming command and triggers the corresponding action.
pub async fn handle_command(command_text: &str, notifier: &TelegramNotifier) {
    info!("Handling command: {}", command_text);
    let reply = match Command::parse(command_text) {
        Command::Ping => "✅ I am online!".to_string(),
        Command::Help => HELP.to_string(),
        Command::Pending => pending_summary(notifier).await,
        Command::Approve(id) => approve(notifier, &id).await,
        Command::Skip(id) => skip(notifier, &id).await,
        Command::Refresh => {
            notifier.refresh_notify.notify_one();
            "🔄 Dispatch cycle triggered.".to_string()
        }
        Command::Uptime => {
            let uptime = notifier.start_time.elapsed();
            format!(
                "⏱ Uptime: {:02}:{:02}:{:02}",
                uptime.as_secs() / 3600,
                (uptime.as_secs() % 3600) / 60,
                uptime.as_secs() % 60
            )
        }
        Command::MissingArgument(name) => format!("⚠️ Usage: {} <job_id>", name),
        Command::Unknown => "🤖 Unknown command. Type /help for a list of commands.".to_string(),
    };

    if let Err(e) = notifier.notify_text(&reply).await {
        warn!("Reply to '{}' failed: {:?}", command_text, e);
    }
}

async fn pending_summary(notifier: &TelegramNotifier) -> String {
    match notifier
        .storage
        .lock()
        .await
        .get_publish_requests_by_status(PublishStatus::Pending)
    {
        Ok(requests) if requests.is_empty() => "📭 Nothing awaiting approval.".to_string(),
        Ok(requests) => {
            let mut msg = String::from("🗂 Awaiting approval:\n");
            for req in requests {
                msg.push_str(&format!("🔸 {} — {} group(s)\n", req.job_id, req.targets.len()));
            }
            msg
        }
        Err(e) => format!("❌ Error: {}", e),
    }
}

async fn approve(notifier: &TelegramNotifier, job_id: &str) -> String {
    let storage = notifier.storage.lock().await;
    match storage.transition_publish_request(job_id, PublishStatus::Pending, PublishStatus::Approved) {
        Ok(true) => {
            notifier.refresh_notify.notify_one();
            format!("👍 Job {} approved, publishing shortly.", job_id)
        }
        Ok(false) => not_pending(&storage, job_id),
        Err(e) => format!("❌ Error: {}", e),
    }
}

async fn skip(notifier: &TelegramNotifier, job_id: &str) -> String {
    let storage = notifier.storage.lock().await;
    match storage.transition_publish_request(job_id, PublishStatus::Pending, PublishStatus::Skipped) {
        Ok(true) => match storage.set_job_status(job_id, JobStatus::Skipped) {
            Ok(()) => format!("🗑 Job {} skipped.", job_id),
            Err(e) => format!("❌ Request skipped but job update failed: {}", e),
        },
        Ok(false) => not_pending(&storage, job_id),
        Err(e) => format!("❌ Error: {}", e),
    }
}

/// Reply for a request that could not leave `Pending`.
fn not_pending(storage: &SqliteStorage, job_id: &str) -> String {
    match storage.get_publish_request(job_id) {
        Ok(Some(request)) => format!("⚠️ Job {} is already {}.", job_id, request.status.as_str()),
        Ok(None) => format!("⚠️ No pending request for job {}.", job_id),
        Err(e) => format!("❌ Error: {}", e),
    }
}
