//! Service configuration, loaded from environment variables (spec §6).
//!
//! Mirrors the teacher's `BaseConfig`/`BotConfig` split: a `load()`
//! constructor that reads env vars with sane defaults, and a `validate()`
//! pass that fails fast before the bot starts serving traffic. This
//! deployment backs the Knowledge Store with SQLite rather than the
//! original Postgres/Qdrant pair, so `DATABASE_URL` replaces `POSTGRES_*`
//! and the vector store stays in-process (see `DESIGN.md`).

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use embedding::EmbeddingConfig;
use llm_client::{ChatEndpointConfig, OptionalEndpointConfig};

/// Telegram connectivity, persistence, and logging: the part of config that
/// has nothing to do with any particular character or LLM backend.
#[derive(Debug, Clone)]
pub struct BaseConfig {
    /// TELEGRAM_BOT_TOKEN (falls back to BOT_TOKEN for teacher-compatibility).
    pub bot_token: String,
    /// TELEGRAM_API_URL / TELOXIDE_API_URL, for self-hosted Bot API servers.
    pub telegram_api_url: Option<String>,
    /// Knowledge Store (L4) connection string; sqlite by default.
    pub database_url: String,
    /// Log file path tracing writes alongside stdout.
    pub log_file: String,
}

impl BaseConfig {
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = token
            .or_else(|| env::var("TELEGRAM_BOT_TOKEN").ok())
            .or_else(|| env::var("BOT_TOKEN").ok())
            .context("TELEGRAM_BOT_TOKEN (or BOT_TOKEN) not set")?;
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://./whisperengine.db".to_string());
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| "logs/telegram-bot.log".to_string());
        let telegram_api_url = env::var("TELEGRAM_API_URL").or_else(|_| env::var("TELOXIDE_API_URL")).ok();

        Ok(Self { bot_token, telegram_api_url, database_url, log_file })
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(ref url) = self.telegram_api_url {
            reqwest::Url::parse(url)
                .with_context(|| format!("TELEGRAM_API_URL is set but not a valid URL: {url}"))?;
        }
        Ok(())
    }
}

/// Character identity and persona source (spec §6: `DISCORD_BOT_NAME`/`BOT_NAME`,
/// `BOT_SYSTEM_PROMPT_FILE`).
#[derive(Debug, Clone)]
pub struct CharacterConfig {
    pub name: String,
    pub system_prompt_file: String,
}

impl CharacterConfig {
    pub fn load() -> Result<Self> {
        let name = env::var("BOT_NAME")
            .or_else(|_| env::var("DISCORD_BOT_NAME"))
            .unwrap_or_else(|_| "assistant".to_string());
        let system_prompt_file =
            env::var("BOT_SYSTEM_PROMPT_FILE").unwrap_or_else(|_| "persona.md".to_string());
        Ok(Self { name, system_prompt_file })
    }

    pub fn load_persona(&self) -> Result<String> {
        std::fs::read_to_string(&self.system_prompt_file)
            .with_context(|| format!("could not read BOT_SYSTEM_PROMPT_FILE at {}", self.system_prompt_file))
    }
}

/// Top-level config: base + character + the LLM/embedding endpoint configs
/// the ambient `llm-client`/`embedding` crates already know how to load.
pub struct BotConfig {
    pub base: BaseConfig,
    pub character: CharacterConfig,
    pub chat: ChatEndpointConfig,
    pub emotion: Option<OptionalEndpointConfig>,
    pub embedding: EmbeddingConfig,
    pub reply_chunk_size: usize,
    pub global_turn_deadline: Duration,
}

impl BotConfig {
    pub fn load(token: Option<String>) -> Result<Self> {
        let base = BaseConfig::load(token)?;
        let character = CharacterConfig::load()?;
        let chat = ChatEndpointConfig::from_env()?;
        let emotion = OptionalEndpointConfig::emotion_from_env();
        let embedding = EmbeddingConfig::from_env();
        let reply_chunk_size = env::var("REPLY_CHUNK_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2_000);
        let global_turn_deadline_secs: u64 = env::var("GLOBAL_TURN_DEADLINE_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(45);

        Ok(Self {
            base,
            character,
            chat,
            emotion,
            embedding,
            reply_chunk_size,
            global_turn_deadline: Duration::from_secs(global_turn_deadline_secs),
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.base.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn bot_token_argument_overrides_the_environment() {
        std::env::remove_var("TELEGRAM_BOT_TOKEN");
        std::env::remove_var("BOT_TOKEN");
        let config = BaseConfig::load(Some("explicit-token".to_string())).unwrap();
        assert_eq!(config.bot_token, "explicit-token");
    }

    #[test]
    #[serial]
    fn missing_token_is_an_error() {
        std::env::remove_var("TELEGRAM_BOT_TOKEN");
        std::env::remove_var("BOT_TOKEN");
        assert!(BaseConfig::load(None).is_err());
    }

    #[test]
    #[serial]
    fn character_name_defaults_when_unset() {
        std::env::remove_var("BOT_NAME");
        std::env::remove_var("DISCORD_BOT_NAME");
        let config = CharacterConfig::load().unwrap();
        assert_eq!(config.name, "assistant");
    }

    #[test]
    #[serial]
    fn invalid_telegram_api_url_fails_validation() {
        let base = BaseConfig {
            bot_token: "t".to_string(),
            telegram_api_url: Some("not a url".to_string()),
            database_url: "sqlite::memory:".to_string(),
            log_file: "logs/test.log".to_string(),
        };
        assert!(base.validate().is_err());
    }
}
