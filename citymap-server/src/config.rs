use std::{env, str::FromStr, time::Duration};

use anyhow::Context;

use crate::outbound::repositories::{DEFAULT_IDLE_TTL, DEFAULT_MAX_SESSIONS};

const SERVER_PORT_KEY: &str = "SERVER_PORT";
const DEFAULT_SERVER_PORT: &str = "3000";
const SESSION_IDLE_SECS_KEY: &str = "SESSION_IDLE_SECS";
const MAX_SESSIONS_KEY: &str = "MAX_SESSIONS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server_port: String,
    pub session_idle_ttl: Duration,
    pub max_sessions: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Config> {
        let server_port =
            load_env(SERVER_PORT_KEY)?.unwrap_or_else(|| DEFAULT_SERVER_PORT.to_string());

        server_port
            .parse::<u16>()
            .with_context(|| format!("{SERVER_PORT_KEY} is not a valid port: {server_port}"))?;

        let session_idle_ttl = parse_env::<u64>(SESSION_IDLE_SECS_KEY)?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_IDLE_TTL);
        let max_sessions = parse_env(MAX_SESSIONS_KEY)?.unwrap_or(DEFAULT_MAX_SESSIONS);

        Ok(Config {
            server_port,
            session_idle_ttl,
            max_sessions,
        })
    }
}

fn load_env(key: &str) -> anyhow::Result<Option<String>> {
    match env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(err).with_context(|| format!("failed to load environment variable {key}")),
    }
}

fn parse_env<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    load_env(key)?
        .map(|value| {
            value
                .parse()
                .with_context(|| format!("{key} is not a valid number: {value}"))
        })
        .transpose()
}
