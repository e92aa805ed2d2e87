use crate::monitor::LabeledEvent;
use crate::notify::format_units;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LegLogEntry {
    pub instruction: String,
    pub source: String,
    pub destination: String,
    pub in_amount: String,
    pub minimum_out_amount: String,
}

/// One JSONL record per reported arbitrage.
#[derive(Debug, Serialize)]
pub struct ArbitrageLogEntry {
    pub timestamp: String,
    pub signature: String,
    pub program_id: String,
    pub program_label: String,
    pub token_symbol: String,
    pub token_mint: String,
    pub profit_raw: String,
    pub profit: String,
    pub fee_lamports: u64,
    pub fee_was_elevated: bool,
    pub legs: Vec<LegLogEntry>,
}

impl From<&LabeledEvent> for ArbitrageLogEntry {
    fn from(labeled: &LabeledEvent) -> Self {
        let event = &labeled.event;
        Self {
            timestamp: Utc::now().to_rfc3339(),
            signature: event.signature.clone(),
            program_id: event.program_id.to_string(),
            program_label: labeled.program_label.clone(),
            token_symbol: labeled.token.symbol.clone(),
            token_mint: labeled.mint.to_string(),
            // amounts as strings so u64 survives JSON readers that use doubles
            profit_raw: event.profit.to_string(),
            profit: format_units(event.profit, labeled.token.decimals),
            fee_lamports: event.fee,
            fee_was_elevated: event.fee_was_elevated,
            legs: event
                .legs
                .iter()
                .map(|leg| LegLogEntry {
                    instruction: leg.instruction.to_string(),
                    source: leg.source.to_string(),
                    destination: leg.destination.to_string(),
                    in_amount: leg.in_amount.to_string(),
                    minimum_out_amount: leg.minimum_out_amount.to_string(),
                })
                .collect(),
        }
    }
}

pub struct ArbitrageLogger {
    log_file: String,
}

impl ArbitrageLogger {
    pub fn new(log_file: &str) -> Result<Self> {
        if let Some(parent) = Path::new(log_file).parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {:?}", parent))?;
        }

        Ok(Self {
            log_file: log_file.to_string(),
        })
    }

    pub fn path(&self) -> &str {
        &self.log_file
    }

    /// Append one event to the JSONL file and sync it.
    pub fn log_event(&self, labeled: &LabeledEvent) -> Result<()> {
        let entry = ArbitrageLogEntry::from(labeled);
        let json_line =
            serde_json::to_string(&entry).with_context(|| "Failed to serialize arbitrage entry")?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)
            .with_context(|| format!("Failed to open log file: {}", self.log_file))?;

        writeln!(file, "{}", json_line)
            .with_context(|| format!("Failed to write to log file: {}", self.log_file))?;

        file.sync_all()
            .with_context(|| format!("Failed to sync log file: {}", self.log_file))?;

        Ok(())
    }
}
