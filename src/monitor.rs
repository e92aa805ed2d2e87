use crate::arbitrage::{ArbitrageDetector, ArbitrageEvent};
use crate::decoder::InstructionDecoder;
use crate::dedupe::{DedupeKey, DedupeState};
use crate::extractor::extract_legs;
use crate::sources::{SourceError, TransactionSource};
use crate::token_registry::{short_mint, TokenInfo, TokenMetadata};
use crate::transaction::Transaction;
use futures::future::join_all;
use log::{debug, info, warn};
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoredProgram {
    pub label: String,
    pub program_id: Pubkey,
}

/// An arbitrage event with its output asset resolved for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledEvent {
    pub event: ArbitrageEvent,
    pub program_label: String,
    pub mint: Pubkey,
    pub token: TokenInfo,
}

impl DedupeKey for LabeledEvent {
    fn dedupe_key(&self) -> &str {
        &self.event.signature
    }
}

#[derive(Debug, Error)]
pub enum LabelError {
    #[error("Event {0} has no output account")]
    NoOutputAccount(String),

    #[error("Failed to read output account {account}: {source}")]
    OutputAccount {
        account: Pubkey,
        #[source]
        source: SourceError,
    },

    #[error("Failed to read mint {mint}: {source}")]
    Mint {
        mint: Pubkey,
        #[source]
        source: SourceError,
    },
}

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Failed to fetch transactions for {program_id}: {source}")]
    Source {
        program_id: Pubkey,
        #[source]
        source: SourceError,
    },
}

/// Outcome of one completed polling cycle.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub cycle: u64,
    pub transactions: usize,
    pub candidates: usize,
    pub dropped: usize,
    pub new_events: Vec<LabeledEvent>,
    pub elapsed: Duration,
}

/// Runs the decode, detect, label and dedupe pipeline once per cycle.
///
/// Owns the [`DedupeState`]; it is only updated when every program of the cycle was
/// fetched successfully.
pub struct Monitor {
    source: Arc<dyn TransactionSource>,
    tokens: Arc<dyn TokenMetadata>,
    decoder: InstructionDecoder,
    detector: ArbitrageDetector,
    programs: Vec<MonitoredProgram>,
    dedupe: DedupeState,
}

impl Monitor {
    pub fn new(
        source: Arc<dyn TransactionSource>,
        tokens: Arc<dyn TokenMetadata>,
        programs: Vec<MonitoredProgram>,
        detector: ArbitrageDetector,
        dedupe: DedupeState,
    ) -> Self {
        Self {
            source,
            tokens,
            decoder: InstructionDecoder::new(),
            detector,
            programs,
            dedupe,
        }
    }

    pub fn programs(&self) -> &[MonitoredProgram] {
        &self.programs
    }

    pub fn dedupe(&self) -> &DedupeState {
        &self.dedupe
    }

    /// Arbitrage events in `transactions`, in transaction order.
    pub fn find_arbitrage(
        &self,
        program_id: &Pubkey,
        transactions: &[Transaction],
    ) -> Vec<ArbitrageEvent> {
        transactions
            .iter()
            .filter_map(|tx| {
                let legs = extract_legs(&self.decoder, tx, program_id);
                self.detector.detect(program_id, tx, legs)
            })
            .collect()
    }

    async fn label(
        &self,
        program: &MonitoredProgram,
        event: ArbitrageEvent,
    ) -> Result<LabeledEvent, LabelError> {
        let account = event
            .output_account()
            .ok_or_else(|| LabelError::NoOutputAccount(event.signature.clone()))?;

        let mint = self
            .source
            .token_account_mint(&account)
            .await
            .map_err(|source| LabelError::OutputAccount { account, source })?;

        let token = match self.tokens.lookup(&mint) {
            Some(token) => token,
            None => {
                debug!("Mint {} not in token list, reading decimals on chain", mint);
                let decimals = self
                    .source
                    .mint_decimals(&mint)
                    .await
                    .map_err(|source| LabelError::Mint { mint, source })?;
                TokenInfo {
                    symbol: short_mint(&mint),
                    decimals,
                }
            }
        };

        Ok(LabeledEvent {
            event,
            program_label: program.label.clone(),
            mint,
            token,
        })
    }

    /// Fetch, detect and label for every program, then commit the new events.
    ///
    /// A fetch failure aborts the cycle before anything is committed. Events whose label
    /// lookup fails are dropped and stay eligible for the next cycle. Events reported in an
    /// earlier cycle are not labelled again, only marked as sighted.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, MonitorError> {
        let start = Instant::now();
        let mut report = CycleReport::default();
        let mut batches = Vec::with_capacity(self.programs.len());
        let mut sightings = Vec::with_capacity(self.programs.len());

        for program in &self.programs {
            info!("Polling for new Jupiter {} arbitrage trades.", program.label);
            let transactions = self
                .source
                .recent_transactions(&program.program_id)
                .await
                .map_err(|source| MonitorError::Source {
                    program_id: program.program_id,
                    source,
                })?;

            let candidates = self.find_arbitrage(&program.program_id, &transactions);
            report.transactions += transactions.len();
            report.candidates += candidates.len();

            let (seen, unseen): (Vec<ArbitrageEvent>, Vec<ArbitrageEvent>) = candidates
                .into_iter()
                .partition(|event| self.dedupe.contains(&program.program_id, &event.signature));
            sightings.push((
                program.program_id,
                seen.into_iter().map(|event| event.signature).collect::<Vec<_>>(),
            ));

            // join_all keeps input order
            let results = join_all(unseen.into_iter().map(|event| self.label(program, event))).await;
            let mut labeled = Vec::with_capacity(results.len());
            for result in results {
                match result {
                    Ok(event) => labeled.push(event),
                    Err(e) => {
                        warn!("⚠️  Dropping arbitrage candidate: {}", e);
                        report.dropped += 1;
                    }
                }
            }
            batches.push((program.program_id, labeled));
        }

        for (program_id, signatures) in &sightings {
            self.dedupe
                .refresh(program_id, signatures.iter().map(String::as_str));
        }
        report.new_events = self.dedupe.commit(batches);
        report.cycle = self.dedupe.cycle();
        report.elapsed = start.elapsed();
        Ok(report)
    }
}
