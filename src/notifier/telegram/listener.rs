// notifier/telegram/listener.rs

use crate::notifier::telegram::command_handler::handle_command;
use crate::notifier::telegram::TelegramNotifier;
use serde::Deserialize;
use std::sync::atomic::Ordering;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct TelegramApiResponse {
    result: Vec<TelegramUpdate>,
}

#[derive(Debug, Deserialize)]
struct TelegramUpdate {
    update_id: i64,
    message: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
struct TelegramMessage {
    chat: TelegramChat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelegramChat {
    id: i64,
}

/// Long-polls for Telegram updates and processes operator commands.
pub async fn listen_for_commands(notifier: &TelegramNotifier) {
    if let Err(e) = notifier.set_my_commands().await {
        warn!("setMyCommands failed: {:?}", e);
    }

    let url = format!("https://api.telegram.org/bot{}/getUpdates", notifier.bot_token);
    loop {
        let offset = notifier.offset.load(Ordering::SeqCst);
        let response = notifier
            .client
            .get(&url)
            .query(&[("offset", offset.to_string()), ("timeout", "25".to_string())])
            .send()
            .await;
        match response {
            Ok(resp) => match resp.json::<TelegramApiResponse>().await {
                Ok(api_response) => {
                    for update in api_response.result {
                        if let Some(message) = update.message.as_ref() {
                            match message.text.as_deref() {
                                Some(text) if message.chat.id == notifier.chat_id => {
                                    handle_command(text, notifier).await;
                                }
                                Some(_) => debug!("Ignoring message from chat {}", message.chat.id),
                                None => {}
                            }
                        }
                        notifier.offset.store(update.update_id + 1, Ordering::SeqCst);
                    }
                }
                Err(e) => warn!("getUpdates decode error: {:?}", e),
            },
            Err(e) => warn!("getUpdates failed: {:?}", e),
        }
        sleep(Duration::from_secs(1)).await;
    }
}
