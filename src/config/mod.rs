//! Configuration module for the vidgate bot.
//!
//! Loads configuration from environment variables (and `.env`).

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use teloxide::types::{ChatId, Recipient, UserId};
use thiserror::Error;
use url::Url;

const DEFAULT_CHANNEL: &str = "@ViralCityBD";
const DEFAULT_ADMIN_ID: u64 = 6_705_245_237;
const DEFAULT_UPDATE_CHANNEL_URL: &str = "https://t.me/+inmCyx05zdMyNTll";
const DEFAULT_STORE_FILE: &str = "current_video.txt";
const DEFAULT_DELETE_AFTER_SECS: u64 = 900;
const DEFAULT_RETRY_PAUSE_SECS: u64 = 2;
const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 600;
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 60;
const DEFAULT_WEBHOOK_PORT: u16 = 8080;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable is not set")]
    MissingEnvVar(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Bot running mode
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BotMode {
    #[default]
    Polling,
    Webhook,
}

/// The channel users must belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelRef {
    /// Public channel addressed by `@username` (stored without the `@`).
    Username(String),
    /// Channel addressed by numeric chat id.
    Id(ChatId),
}

impl ChannelRef {
    /// Recipient form used by `getChatMember`.
    pub fn recipient(&self) -> Recipient {
        match self {
            Self::Username(name) => Recipient::ChannelUsername(format!("@{}", name)),
            Self::Id(id) => Recipient::Id(*id),
        }
    }

    /// Public join link, only derivable for username channels.
    pub fn public_link(&self) -> Option<Url> {
        match self {
            Self::Username(name) => Url::parse(&format!("https://t.me/{}", name)).ok(),
            Self::Id(_) => None,
        }
    }
}

impl FromStr for ChannelRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(id) = s.parse::<i64>() {
            return Ok(Self::Id(ChatId(id)));
        }

        let name = s.trim_start_matches('@');
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(format!("'{}' is neither a chat id nor a channel username", s));
        }
        Ok(Self::Username(name.to_string()))
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    // Telegram
    pub bot_token: String,
    pub bot_mode: BotMode,
    pub webhook_url: Option<Url>,
    pub webhook_port: u16,
    pub webhook_secret: Option<String>,
    pub poll_timeout: Duration,

    /// Port for the health endpoint in polling mode.
    pub health_port: Option<u16>,

    /// Channel whose members may receive the video.
    pub channel: ChannelRef,
    pub channel_join_url: Url,

    /// The single user allowed to replace the stored video.
    pub admin_id: UserId,

    /// Target of the button attached to the deletion notice.
    pub update_channel_url: Url,

    pub video_store_file: PathBuf,

    pub delete_after: Duration,
    pub retry_pause: Duration,
    pub upload_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Only `BOT_TOKEN` is required; everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bot_token = get("BOT_TOKEN").ok_or(ConfigError::MissingEnvVar("BOT_TOKEN"))?;

        let bot_mode = match get("BOT_MODE") {
            Some(raw) => serde_json::from_value::<BotMode>(serde_json::Value::String(raw.to_lowercase()))
                .map_err(|e| ConfigError::Invalid {
                    name: "BOT_MODE",
                    reason: e.to_string(),
                })?,
            None => BotMode::default(),
        };

        let webhook_url = get("WEBHOOK_URL")
            .map(|raw| parse_url("WEBHOOK_URL", &raw))
            .transpose()?;

        if bot_mode == BotMode::Webhook && webhook_url.is_none() {
            return Err(ConfigError::MissingEnvVar("WEBHOOK_URL"));
        }

        let channel: ChannelRef = get("CHANNEL_ID")
            .as_deref()
            .unwrap_or(DEFAULT_CHANNEL)
            .parse::<ChannelRef>()
            .map_err(|reason| ConfigError::Invalid { name: "CHANNEL_ID", reason })?;

        let channel_join_url = match get("CHANNEL_JOIN_URL") {
            Some(raw) => parse_url("CHANNEL_JOIN_URL", &raw)?,
            None => channel
                .public_link()
                .ok_or(ConfigError::MissingEnvVar("CHANNEL_JOIN_URL"))?,
        };

        let update_channel_url = parse_url(
            "UPDATE_CHANNEL_URL",
            get("UPDATE_CHANNEL_URL")
                .as_deref()
                .unwrap_or(DEFAULT_UPDATE_CHANNEL_URL),
        )?;

        Ok(Self {
            bot_token,
            bot_mode,
            webhook_url,
            webhook_port: parse_num(&get, "WEBHOOK_PORT", DEFAULT_WEBHOOK_PORT)?,
            webhook_secret: get("WEBHOOK_SECRET"),
            poll_timeout: secs(parse_num(&get, "POLL_TIMEOUT_SECS", DEFAULT_POLL_TIMEOUT_SECS)?),
            health_port: get("HEALTH_PORT")
                .map(|raw| parse_value("HEALTH_PORT", &raw))
                .transpose()?,
            channel,
            channel_join_url,
            admin_id: UserId(parse_num(&get, "ADMIN_ID", DEFAULT_ADMIN_ID)?),
            update_channel_url,
            video_store_file: get("VIDEO_STORE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_FILE)),
            delete_after: secs(parse_num(&get, "DELETE_AFTER_SECS", DEFAULT_DELETE_AFTER_SECS)?),
            retry_pause: secs(parse_num(&get, "RETRY_PAUSE_SECS", DEFAULT_RETRY_PAUSE_SECS)?),
            upload_timeout: secs(parse_num(
                &get,
                "UPLOAD_TIMEOUT_SECS",
                DEFAULT_UPLOAD_TIMEOUT_SECS,
            )?),
        })
    }
}

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

fn parse_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

fn parse_value<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

fn parse_num<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(raw) => parse_value(name, &raw),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_missing_token_is_fatal() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar("BOT_TOKEN")));

        let err = load(&[("BOT_TOKEN", "   ")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar("BOT_TOKEN")));
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("BOT_TOKEN", "123:abc")]).unwrap();

        assert_eq!(config.bot_mode, BotMode::Polling);
        assert_eq!(config.channel, ChannelRef::Username("ViralCityBD".to_string()));
        assert_eq!(config.channel_join_url.as_str(), "https://t.me/ViralCityBD");
        assert_eq!(config.admin_id, UserId(6_705_245_237));
        assert_eq!(config.delete_after, Duration::from_secs(900));
        assert_eq!(config.retry_pause, Duration::from_secs(2));
        assert_eq!(config.video_store_file, PathBuf::from("current_video.txt"));
        assert!(config.health_port.is_none());
    }

    #[test]
    fn test_numeric_channel_needs_join_url() {
        let err = load(&[("BOT_TOKEN", "t"), ("CHANNEL_ID", "-1001234")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar("CHANNEL_JOIN_URL")));

        let config = load(&[
            ("BOT_TOKEN", "t"),
            ("CHANNEL_ID", "-1001234"),
            ("CHANNEL_JOIN_URL", "https://t.me/+invite"),
        ])
        .unwrap();
        assert_eq!(config.channel, ChannelRef::Id(ChatId(-1001234)));
        assert_eq!(config.channel.recipient(), Recipient::Id(ChatId(-1001234)));
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        let err = load(&[("BOT_TOKEN", "t"), ("DELETE_AFTER_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "DELETE_AFTER_SECS", .. }));
    }

    #[test]
    fn test_webhook_mode_requires_url() {
        let err = load(&[("BOT_TOKEN", "t"), ("BOT_MODE", "webhook")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar("WEBHOOK_URL")));
    }

    #[test]
    fn test_bot_mode_parsing() {
        let config = load(&[
            ("BOT_TOKEN", "t"),
            ("BOT_MODE", "Webhook"),
            ("WEBHOOK_URL", "https://example.com/hook"),
        ])
        .unwrap();
        assert_eq!(config.bot_mode, BotMode::Webhook);

        let config = load(&[("BOT_TOKEN", "t"), ("BOT_MODE", "POLLING")]).unwrap();
        assert_eq!(config.bot_mode, BotMode::Polling);

        let err = load(&[("BOT_TOKEN", "t"), ("BOT_MODE", "socket")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "BOT_MODE", .. }));
    }

    #[test]
    fn test_channel_ref_parsing() {
        assert_eq!(
            "@some_channel".parse::<ChannelRef>(),
            Ok(ChannelRef::Username("some_channel".to_string()))
        );
        assert_eq!(
            "some_channel".parse::<ChannelRef>().unwrap().recipient(),
            Recipient::ChannelUsername("@some_channel".to_string())
        );
        assert!("@bad name".parse::<ChannelRef>().is_err());
    }
}
