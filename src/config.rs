use crate::monitor::MonitoredProgram;
use crate::sources::rpc::FetchSettings;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;
use std::fs;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    pub symbol: String,
    pub address: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProgramConfig {
    pub label: String,
    pub program_id: String,
}

#[derive(Debug, Deserialize)]
pub struct MonitorConfig {
    pub monitor: MonitorSettings,
    pub programs: Vec<ProgramConfig>,
    #[serde(default)]
    pub notify: NotifySettings,
}

#[derive(Debug, Deserialize)]
pub struct MonitorSettings {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_signatures_per_page")]
    pub signatures_per_page: usize,
    #[serde(default = "default_signature_pages")]
    pub signature_pages: usize,
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
    #[serde(default = "default_standard_fee")]
    pub standard_fee_lamports: u64,
    #[serde(default)]
    pub dedupe_horizon_cycles: u64,
    pub tokens_file: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct NotifySettings {
    #[serde(default)]
    pub log_file: Option<String>,
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub dry_run: bool,
}

fn default_rpc_url() -> String {
    DEFAULT_RPC_URL.to_string()
}

fn default_poll_interval_secs() -> u64 {
    1
}

fn default_signatures_per_page() -> usize {
    1000
}

fn default_signature_pages() -> usize {
    2
}

fn default_fetch_concurrency() -> usize {
    16
}

fn default_standard_fee() -> u64 {
    crate::arbitrage::SOL_STANDARD_TX_FEE
}

impl MonitorConfig {
    /// Apply `SOLANA_RPC_URL`, `NOTIFY_WEBHOOK_URL` and `TEST_MODE` from `env`.
    pub fn apply_env<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(rpc_url) = env("SOLANA_RPC_URL") {
            self.monitor.rpc_url = rpc_url;
        }
        if let Some(webhook_url) = env("NOTIFY_WEBHOOK_URL") {
            self.notify.webhook_url = Some(webhook_url);
        }
        if env("TEST_MODE").is_some() {
            self.notify.dry_run = true;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.programs.is_empty() {
            bail!("At least one program must be configured");
        }
        if self.monitor.poll_interval_secs == 0 {
            bail!("poll_interval_secs must be greater than zero");
        }
        if self.monitor.fetch_concurrency == 0 {
            bail!("fetch_concurrency must be greater than zero");
        }
        if !(1..=1000).contains(&self.monitor.signatures_per_page) {
            bail!(
                "signatures_per_page must be between 1 and 1000, got {}",
                self.monitor.signatures_per_page
            );
        }
        url::Url::parse(&self.monitor.rpc_url)
            .with_context(|| format!("Invalid rpc_url: {}", self.monitor.rpc_url))?;
        if let Some(webhook_url) = &self.notify.webhook_url {
            url::Url::parse(webhook_url)
                .with_context(|| format!("Invalid webhook_url: {}", webhook_url))?;
        }
        self.monitored_programs()?;
        Ok(())
    }

    pub fn monitored_programs(&self) -> Result<Vec<MonitoredProgram>> {
        self.programs
            .iter()
            .map(|program| {
                let program_id = Pubkey::from_str(&program.program_id)
                    .with_context(|| format!("Invalid program id: {}", program.program_id))?;
                Ok(MonitoredProgram {
                    label: program.label.clone(),
                    program_id,
                })
            })
            .collect()
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            signatures_per_page: self.monitor.signatures_per_page,
            signature_pages: self.monitor.signature_pages,
            fetch_concurrency: self.monitor.fetch_concurrency,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.monitor.poll_interval_secs)
    }
}

pub fn load_tokens(path: &str) -> Result<Vec<TokenConfig>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read tokens config: {}", path))?;

    let tokens: Vec<TokenConfig> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse tokens config: {}", path))?;

    Ok(tokens)
}

pub fn load_config(path: &str) -> Result<MonitorConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path))?;

    let config: MonitorConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path))?;

    Ok(config)
}
