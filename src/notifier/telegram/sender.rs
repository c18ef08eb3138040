// notifier/telegram/sender.rs

use crate::model::{Job, NotifyError, ScoredCandidate};
use crate::notifier::telegram::TelegramNotifier;
use crate::utils::truncate_chars;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

const DESCRIPTION_PREVIEW_CHARS: usize = 600;

/// Sends a plain text message to the given chat.
pub async fn send_text(notifier: &TelegramNotifier, chat_id: i64, text: &str) -> Result<(), NotifyError> {
    let url = format!("https://api.telegram.org/bot{}/sendMessage", notifier.bot_token);
    let response = match timeout(
        Duration::from_secs(10),
        notifier
            .client
            .post(&url)
            .form(&[("chat_id", chat_id.to_string()), ("text", text.to_string())])
            .send(),
    )
    .await
    {
        Ok(Ok(resp)) => resp,
        Ok(Err(e)) => {
            warn!("❌ Telegram send() failed: {:?}", e);
            return Err(NotifyError::ApiError(format!("Send failed: {}", e)));
        }
        Err(_) => {
            warn!("⏳ Telegram send() timed out");
            return Err(NotifyError::Unreachable);
        }
    };
    let status = response.status();
    let body = response.text().await.unwrap_or_else(|_| "unknown".into());
    if !status.is_success() {
        warn!("❌ Telegram API responded [{}]: {}", status, body);
        return Err(NotifyError::ApiError(format!("{}: {}", status, body)));
    }
    info!("✅ Telegram message sent to {} [{}]", chat_id, status);
    Ok(())
}

/// Operator message asking to approve a job and its group shortlist.
pub fn format_review(job: &Job, targets: &[ScoredCandidate]) -> String {
    let mut msg = format!(
        "🆕 New job awaiting approval\n\n💼 {}\n🏢 {}\n📍 {}\n🔗 {}\n",
        job.title,
        if job.company.is_empty() { "—" } else { job.company.as_str() },
        job.location.as_deref().filter(|l| !l.trim().is_empty()).unwrap_or("—"),
        job.link
    );
    if targets.is_empty() {
        msg.push_str("\n⚠️ No matching groups, channel only.\n");
    } else {
        msg.push_str("\n👥 Recommended groups:\n");
        for (i, t) in targets.iter().enumerate() {
            msg.push_str(&format!("{}. {} ({})\n   {}\n", i + 1, t.name, t.score, t.url));
        }
    }
    msg.push_str(&format!("\n/approve {}   /skip {}", job.id, job.id));
    msg
}

/// Public channel post for an approved job.
pub fn format_post(job: &Job) -> String {
    let mut msg = format!("📢 {}\n", job.title);
    if let Some(location) = job.location.as_deref().filter(|l| !l.trim().is_empty()) {
        msg.push_str(&format!("📍 {}\n", location.trim()));
    }
    if !job.company.is_empty() {
        msg.push_str(&format!("🏢 {}\n", job.company));
    }
    if !job.description.trim().is_empty() {
        msg.push_str(&format!("\n{}\n", truncate_chars(job.description.trim(), DESCRIPTION_PREVIEW_CHARS)));
    }
    if !job.link.is_empty() {
        msg.push_str(&format!("\n🔗 {}", job.link));
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn job() -> Job {
        Job {
            id: "j7".into(),
            title: "מפתח/ת Full Stack".into(),
            description: "עבודה במשרה מלאה".into(),
            location: Some("פתח תקווה".into()),
            company: String::new(),
            link: "https://jobs.example/j7".into(),
            status: Default::default(),
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn review_lists_targets_and_commands() {
        let targets = vec![ScoredCandidate {
            target_id: "g1".into(),
            name: "דרושים בפתח תקווה והסביבה".into(),
            url: "https://facebook.com/groups/g1".into(),
            score: 305,
        }];
        let msg = format_review(&job(), &targets);
        assert!(msg.contains("1. דרושים בפתח תקווה והסביבה (305)"));
        assert!(msg.contains("/approve j7"));
        assert!(msg.contains("🏢 —"));
    }

    #[test]
    fn review_without_targets_says_so() {
        assert!(format_review(&job(), &[]).contains("No matching groups"));
    }

    #[test]
    fn post_skips_empty_fields() {
        let mut j = job();
        j.location = None;
        let post = format_post(&j);
        assert!(post.starts_with("📢 מפתח/ת Full Stack"));
        assert!(!post.contains("📍"));
        assert!(!post.contains("🏢"));
        assert!(post.ends_with("🔗 https://jobs.example/j7"));
    }
}
