use anyhow::Result;
use std::env;

use crate::constants::{
    DEFAULT_DECLINE_COOLDOWN_HOURS, DEFAULT_MAX_DISCOVERY_LIMIT, DEFAULT_POSITION_TTL_SECS,
    DEFAULT_SERVER_PORT, DEFAULT_SWEEP_INTERVAL_SECS, DEFAULT_TAG_VOCABULARY,
};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Seconds of silence before a position is swept.
    pub position_ttl_secs: u64,
    /// Period of the background stale-position sweep.
    pub sweep_interval_secs: u64,
    /// Hours before a declined pair may send interest again.
    pub decline_cooldown_hours: i64,
    /// Upper bound on the `limit` a discovery request may ask for.
    pub max_discovery_limit: usize,
    /// Keyword vocabulary for bio tag extraction.
    pub tag_vocabulary: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_SERVER_PORT.to_string())
                .parse()
                .unwrap_or(DEFAULT_SERVER_PORT),
            position_ttl_secs: env::var("POSITION_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_POSITION_TTL_SECS),
            sweep_interval_secs: env::var("SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS),
            decline_cooldown_hours: env::var("DECLINE_COOLDOWN_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_DECLINE_COOLDOWN_HOURS),
            max_discovery_limit: env::var("MAX_DISCOVERY_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_DISCOVERY_LIMIT),
            tag_vocabulary: env::var("TAG_VOCABULARY")
                .map(|raw| parse_vocabulary(&raw))
                .unwrap_or_else(|_| default_vocabulary()),
        })
    }

    pub fn decline_cooldown(&self) -> chrono::Duration {
        chrono::Duration::hours(self.decline_cooldown_hours)
    }

    pub fn position_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.position_ttl_secs as i64)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_SERVER_PORT,
            position_ttl_secs: DEFAULT_POSITION_TTL_SECS,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            decline_cooldown_hours: DEFAULT_DECLINE_COOLDOWN_HOURS,
            max_discovery_limit: DEFAULT_MAX_DISCOVERY_LIMIT,
            tag_vocabulary: default_vocabulary(),
        }
    }
}

fn default_vocabulary() -> Vec<String> {
    DEFAULT_TAG_VOCABULARY
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn parse_vocabulary(raw: &str) -> Vec<String> {
    let words: Vec<String> = raw
        .split(',')
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        default_vocabulary()
    } else {
        words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_parsing_trims_and_lowercases() {
        let words = parse_vocabulary(" Music, coffee ,YOGA,,");
        assert_eq!(words, vec!["music", "coffee", "yoga"]);
    }

    #[test]
    fn empty_vocabulary_override_falls_back_to_default() {
        let words = parse_vocabulary(" , ,");
        assert_eq!(words.len(), DEFAULT_TAG_VOCABULARY.len());
    }
}
