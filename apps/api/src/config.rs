use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::models::template::TemplateId;

/// Application configuration loaded from environment variables.
/// Every variable has a default, so a bare `cargo run` serves the demo data.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub template_ids: Vec<TemplateId>,
    pub template_body_max: usize,
    pub notification_ttl: Duration,
    pub action_timeout: Duration,
    pub support_submit_delay: Duration,
    pub seed_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            template_ids: ['A', 'B', 'C', 'D', 'E'].map(TemplateId).to_vec(),
            template_body_max: 300,
            notification_ttl: Duration::from_millis(3000),
            action_timeout: Duration::from_secs(10),
            support_submit_delay: Duration::from_millis(1000),
            seed_path: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();

        Ok(Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            template_ids: match std::env::var("TEMPLATE_IDS") {
                Ok(raw) => parse_template_ids(&raw)?,
                Err(_) => defaults.template_ids,
            },
            template_body_max: parse_env("TEMPLATE_BODY_MAX", defaults.template_body_max)?,
            notification_ttl: Duration::from_millis(parse_env("NOTIFICATION_TTL_MS", 3000u64)?),
            action_timeout: Duration::from_secs(parse_env("ACTION_TIMEOUT_SECS", 10u64)?),
            support_submit_delay: Duration::from_millis(parse_env(
                "SUPPORT_SUBMIT_DELAY_MS",
                1000u64,
            )?),
            seed_path: std::env::var("SEED_PATH").ok().map(PathBuf::from),
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

/// Parses a comma-separated list of single-letter template ids, e.g. `A,B,C`.
pub fn parse_template_ids(raw: &str) -> Result<Vec<TemplateId>> {
    let mut ids = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let id: TemplateId = part
            .parse()
            .with_context(|| format!("TEMPLATE_IDS entry '{part}' is not a single letter"))?;
        if ids.contains(&id) {
            bail!("TEMPLATE_IDS lists '{part}' more than once");
        }
        ids.push(id);
    }
    if ids.is_empty() {
        bail!("TEMPLATE_IDS must name at least one template");
    }
    Ok(ids)
}
