use log::warn;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

use crate::blockchain::DEFAULT_DIFFICULTY;
use crate::network::AdoptionPolicy;

/// Reward transaction appended to every mined block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reward {
    pub owner: String,
    pub amount: i64,
}

/// Node settings, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub node_address: String,
    pub reward: Option<Reward>,
    pub difficulty: usize,
    pub adoption: AdoptionPolicy,
    pub peer_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key/value source; missing or unparseable
    /// values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let node_address = lookup("NODE_ADDRESS")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string());

        let reward = lookup("OWNER")
            .filter(|v| !v.is_empty())
            .map(|owner| Reward {
                owner,
                amount: parse_or(&lookup, "REWARD", 1),
            });

        let adoption = if parse_or(&lookup, "VERIFY_PEER_CHAINS", true) {
            AdoptionPolicy::Verified
        } else {
            AdoptionPolicy::Trusting
        };

        Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&lookup, "PORT", 8080),
            node_address,
            reward,
            difficulty: parse_or(&lookup, "DIFFICULTY", DEFAULT_DIFFICULTY).min(64),
            adoption,
            peer_timeout: Duration::from_secs(parse_or(&lookup, "PEER_TIMEOUT_SECS", 10)),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("ignoring unparseable {key}={raw:?}");
            default
        }),
        None => default,
    }
}
