use std::path::Path;

use chrono_tz::Tz;

use crate::ai::{backend_from_config, FactGenerator};
use crate::config::{Config, Language};
use crate::error::Result;
use crate::models::{consumed_marker, format_timestamp, Clock, SystemClock};
use crate::services::{Notifier, TelegramNotifier};
use crate::store::TopicStore;

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No pending topic was left; nothing was sent or written.
    Exhausted,
    /// The fact was sent and the topic at `index` marked as consumed.
    Published { subject: String, index: usize },
}

impl RunOutcome {
    /// Human-readable line for stdout.
    pub fn notice(&self, language: Language, topics_path: &Path) -> String {
        match (self, language) {
            (RunOutcome::Exhausted, Language::Ru) => format!(
                "Темы для публикаций закончились! Пожалуйста, пополните файл {}.",
                topics_path.display()
            ),
            (RunOutcome::Exhausted, Language::En) => format!(
                "No topics left to publish! Please add more to {}.",
                topics_path.display()
            ),
            (RunOutcome::Published { subject, .. }, Language::Ru) => format!(
                "Публикация отправлена и тема отмечена как использованная: {}",
                subject
            ),
            (RunOutcome::Published { subject, .. }, Language::En) => {
                format!("Post sent and topic marked as used: {}", subject)
            }
        }
    }
}

/// Per-deployment values the run needs besides its components.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub recipient_id: String,
    pub timezone: Tz,
    pub timezone_label: String,
    pub language: Language,
}

impl RunSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            recipient_id: config.recipient_id.clone(),
            timezone: config.tz()?,
            timezone_label: config.timezone_label.clone(),
            language: config.language,
        })
    }
}

pub struct App {
    store: TopicStore,
    generator: FactGenerator,
    notifier: Box<dyn Notifier>,
    clock: Box<dyn Clock>,
    settings: RunSettings,
}

impl App {
    pub fn new(config: &Config) -> Result<Self> {
        let store = TopicStore::new(config.topics_path.clone());
        let generator = FactGenerator::new(
            backend_from_config(config)?,
            config.backend.params,
            config.language,
        );
        let notifier = TelegramNotifier::new(
            config.telegram_api_url.clone(),
            config.telegram_token.clone(),
        )?;

        Ok(Self::from_parts(
            store,
            generator,
            Box::new(notifier),
            Box::new(SystemClock),
            RunSettings::from_config(config)?,
        ))
    }

    pub fn from_parts(
        store: TopicStore,
        generator: FactGenerator,
        notifier: Box<dyn Notifier>,
        clock: Box<dyn Clock>,
        settings: RunSettings,
    ) -> Self {
        Self {
            store,
            generator,
            notifier,
            clock,
            settings,
        }
    }

    /// Load → generate → notify → mark used. The table is only rewritten
    /// after the message has been delivered.
    pub async fn run(&self) -> Result<RunOutcome> {
        let mut table = self.store.load()?;

        let Some(topic) = table.next_pending() else {
            tracing::debug!("No pending topics in {:?}", self.store.path());
            return Ok(RunOutcome::Exhausted);
        };
        tracing::debug!("Selected topic #{}: {}", topic.index, topic.subject);

        let fact = self.generator.generate(&topic.subject, &topic.category).await?;

        let timestamp = format_timestamp(self.clock.now(), self.settings.timezone);
        let message = compose_message(
            self.settings.language,
            &topic.subject,
            &topic.category,
            &fact,
            &timestamp,
            &self.settings.timezone_label,
        );
        self.notifier
            .send(&self.settings.recipient_id, &message)
            .await?;
        tracing::debug!("Review message sent to {}", self.settings.recipient_id);

        self.store.mark_used(
            &mut table,
            topic.index,
            consumed_marker(self.settings.language),
            &timestamp,
        )?;

        Ok(RunOutcome::Published {
            subject: topic.subject,
            index: topic.index,
        })
    }

    pub fn language(&self) -> Language {
        self.settings.language
    }

    pub fn topics_path(&self) -> &Path {
        self.store.path()
    }
}

/// Review message: header, topic, category, the fact, and the local time.
pub fn compose_message(
    language: Language,
    subject: &str,
    category: &str,
    fact: &str,
    timestamp: &str,
    timezone_label: &str,
) -> String {
    match language {
        Language::Ru => format!(
            "🌟 Новая публикация для проверки:\n\n\
             Тема: {}\nКатегория: {}\n\n\
             {}\n\n\
             Время: {} ({})",
            subject, category, fact, timestamp, timezone_label
        ),
        Language::En => format!(
            "🌟 New post for review:\n\n\
             Topic: {}\nCategory: {}\n\n\
             {}\n\n\
             Time: {} ({})",
            subject, category, fact, timestamp, timezone_label
        ),
    }
}
