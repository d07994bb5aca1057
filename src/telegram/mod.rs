use crate::error::{Error, Result};
use crate::metrics::ScanMetrics;
use async_trait::async_trait;
use log::{error, info};
use teloxide::prelude::*;
use teloxide::repls::CommandReplExt;
use teloxide::types::{ParseMode, Recipient};
use teloxide::utils::command::BotCommands;

pub mod format;

/// Outbound channel for alert messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends one HTML message to the configured destination.
    async fn send(&self, text: &str) -> Result<()>;
}

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "Start the bot")]
    Start,
    #[command(description = "Display this help message")]
    Help,
    #[command(description = "Show scan and alert counters")]
    Status,
}

/// Parses `-100123` style ids and falls back to `@channel` usernames.
pub fn parse_recipient(chat_id: &str) -> Result<Recipient> {
    let chat_id = chat_id.trim();
    if let Ok(id) = chat_id.parse::<i64>() {
        return Ok(Recipient::Id(ChatId(id)));
    }
    if chat_id.starts_with('@') && chat_id.len() > 1 {
        return Ok(Recipient::ChannelUsername(chat_id.to_string()));
    }
    Err(Error::ConfigError(format!("Invalid Telegram chat id: {:?}", chat_id)))
}

#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
    recipient: Recipient,
}

impl TelegramNotifier {
    pub fn new(bot_token: &str, chat_id: &str) -> Result<Self> {
        Ok(Self {
            bot: Bot::new(bot_token),
            recipient: parse_recipient(chat_id)?,
        })
    }

    /// Tests the bot credentials with `getMe`. Startup stops if this fails.
    pub async fn initialize(&self) -> Result<()> {
        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| Error::ChannelUnavailable(e.to_string()))?;
        info!("Telegram bot initialized: @{}", me.username());
        Ok(())
    }

    /// Answers `/start`, `/help` and `/status` until the process exits.
    pub async fn run_commands(self, metrics: ScanMetrics) {
        Command::repl(self.bot, move |bot: Bot, msg: Message, cmd: Command| {
            let metrics = metrics.clone();
            async move {
                if let Err(e) = bot.send_message(msg.chat.id, command_reply(&cmd, &metrics)).await {
                    error!("Error handling command {:?}: {}", cmd, e);
                }
                respond(())
            }
        })
        .await;
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        self.bot
            .send_message(self.recipient.clone(), text)
            .parse_mode(ParseMode::Html)
            .disable_web_page_preview(true)
            .await?;
        Ok(())
    }
}

pub fn command_reply(command: &Command, metrics: &ScanMetrics) -> String {
    match command {
        Command::Start => "🚀 DEX Alert Bot active!\n\
            New pairs that match the configured market cap, age and liquidity \
            filters are posted to the alert channel every scan."
            .to_string(),
        Command::Help => Command::descriptions().to_string(),
        Command::Status => {
            let snapshot = metrics.snapshot();
            format!(
                "📊 Status\n\
                Scans: {} ({} failed)\n\
                Source failures: {}\n\
                Candidates accepted: {}\n\
                Duplicates skipped: {}\n\
                Alerts sent: {}\n\
                Dispatch failures: {}",
                snapshot.scans,
                snapshot.failed_scans,
                snapshot.source_failures,
                snapshot.accepted,
                snapshot.duplicates,
                snapshot.alerts_sent,
                snapshot.dispatch_failures,
            )
        }
    }
}
