use super::{decimals_of_mint, mint_of_token_account, SourceError, SourceResult, TransactionSource};
use crate::transaction::{AccountKey, RawInstruction, Transaction};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use log::{debug, info};
use serde_json::json;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_client::GetConfirmedSignaturesForAddress2Config;
use solana_client::rpc_config::RpcTransactionConfig;
use solana_client::rpc_request::RpcRequest;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::message::{MessageHeader, VersionedMessage};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_transaction_status::option_serializer::OptionSerializer;
use solana_transaction_status::{EncodedConfirmedTransactionWithStatusMeta, UiTransactionEncoding};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

/// How much history one poll walks back through.
#[derive(Debug, Clone, Copy)]
pub struct FetchSettings {
    pub signatures_per_page: usize,
    pub signature_pages: usize,
    pub fetch_concurrency: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            signatures_per_page: 1000,
            signature_pages: 2,
            fetch_concurrency: 16,
        }
    }
}

/// Transaction source backed by a Solana JSON-RPC endpoint.
pub struct RpcTransactionSource {
    rpc_client: Arc<RpcClient>,
    settings: FetchSettings,
}

impl RpcTransactionSource {
    pub fn new(rpc_url: &str, settings: FetchSettings) -> Self {
        info!("📡 RPC URL: {}", rpc_url);
        Self::with_client(
            RpcClient::new_with_commitment(rpc_url.to_string(), CommitmentConfig::confirmed()),
            settings,
        )
    }

    pub fn with_client(rpc_client: RpcClient, settings: FetchSettings) -> Self {
        info!(
            "📄 Fetching {} page(s) of {} signatures, {} concurrent requests",
            settings.signature_pages, settings.signatures_per_page, settings.fetch_concurrency
        );

        Self {
            rpc_client: Arc::new(rpc_client),
            settings,
        }
    }

    /// Walk back `signature_pages` pages of signatures for `program_id`.
    async fn recent_signatures(&self, program_id: &Pubkey) -> SourceResult<Vec<String>> {
        let mut signatures = Vec::new();
        let mut before = None;

        for _ in 0..self.settings.signature_pages {
            let page = self
                .rpc_client
                .get_signatures_for_address_with_config(
                    program_id,
                    GetConfirmedSignaturesForAddress2Config {
                        before,
                        until: None,
                        limit: Some(self.settings.signatures_per_page),
                        commitment: Some(CommitmentConfig::confirmed()),
                    },
                )
                .await?;

            let last_page = page.len() < self.settings.signatures_per_page;
            match page.last() {
                Some(last) => before = Some(parse_signature(&last.signature)?),
                None => break,
            }
            signatures.extend(page.into_iter().map(|status| status.signature));

            if last_page {
                break;
            }
        }

        Ok(signatures)
    }

    async fn fetch_transaction(&self, signature: String) -> SourceResult<Option<Transaction>> {
        let parsed = parse_signature(&signature)?;
        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::Base64),
            commitment: Some(CommitmentConfig::confirmed()),
            max_supported_transaction_version: Some(0),
        };
        // null when the node has not seen the transaction (pruned or not yet propagated)
        let confirmed: Option<EncodedConfirmedTransactionWithStatusMeta> = self
            .rpc_client
            .send(
                RpcRequest::GetTransaction,
                json!([parsed.to_string(), config]),
            )
            .await?;

        match confirmed {
            Some(confirmed) => Ok(into_transaction(signature, confirmed)),
            None => {
                debug!("Transaction {} not found, skipping", signature);
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl TransactionSource for RpcTransactionSource {
    async fn recent_transactions(&self, program_id: &Pubkey) -> SourceResult<Vec<Transaction>> {
        let start = Instant::now();
        let signatures = self.recent_signatures(program_id).await?;
        debug!("Fetched {} signatures for {}", signatures.len(), program_id);

        // buffered() yields in input order, so the batch stays newest first
        let fetched: Vec<SourceResult<Option<Transaction>>> = stream::iter(signatures)
            .map(|signature| self.fetch_transaction(signature))
            .buffered(self.settings.fetch_concurrency.max(1))
            .collect()
            .await;

        let mut transactions = Vec::with_capacity(fetched.len());
        for result in fetched {
            if let Some(transaction) = result? {
                transactions.push(transaction);
            }
        }

        info!(
            "✅ Fetched {} transactions for {} in {:?}",
            transactions.len(),
            program_id,
            start.elapsed()
        );
        Ok(transactions)
    }

    async fn token_account_mint(&self, token_account: &Pubkey) -> SourceResult<Pubkey> {
        let account = self.rpc_client.get_account(token_account).await?;
        mint_of_token_account(&account.data).ok_or(SourceError::NotTokenAccount(*token_account))
    }

    async fn mint_decimals(&self, mint: &Pubkey) -> SourceResult<u8> {
        let account = self.rpc_client.get_account(mint).await?;
        decimals_of_mint(&account.data).ok_or(SourceError::NotMint(*mint))
    }
}

fn parse_signature(signature: &str) -> SourceResult<Signature> {
    Signature::from_str(signature).map_err(|_| SourceError::InvalidSignature(signature.to_string()))
}

fn into_transaction(
    signature: String,
    confirmed: EncodedConfirmedTransactionWithStatusMeta,
) -> Option<Transaction> {
    let with_meta = confirmed.transaction;
    // without status meta the fee paid is unknown
    let Some(meta) = with_meta.meta else {
        debug!("Transaction {} has no status meta, skipping", signature);
        return None;
    };
    let versioned = match with_meta.transaction.decode() {
        Some(versioned) => versioned,
        None => {
            debug!("Could not decode transaction {}", signature);
            return None;
        }
    };

    let (loaded_writable, loaded_readonly) = match meta.loaded_addresses {
        OptionSerializer::Some(loaded) => (
            parse_pubkeys(&loaded.writable),
            parse_pubkeys(&loaded.readonly),
        ),
        _ => (Vec::new(), Vec::new()),
    };
    let fee = meta.fee;

    Some(build_transaction(
        signature,
        &versioned.message,
        fee,
        &loaded_writable,
        &loaded_readonly,
    ))
}

fn parse_pubkeys(keys: &[String]) -> Vec<Pubkey> {
    keys.iter()
        .filter_map(|key| Pubkey::from_str(key).ok())
        .collect()
}

/// Resolve the account-key list (static keys, then lookup-table writable and readonly
/// addresses) and every top-level instruction's accounts.
pub fn build_transaction(
    signature: String,
    message: &VersionedMessage,
    fee: u64,
    loaded_writable: &[Pubkey],
    loaded_readonly: &[Pubkey],
) -> Transaction {
    let header = message.header();
    let static_keys = message.static_account_keys();

    let mut account_keys: Vec<AccountKey> = static_keys
        .iter()
        .enumerate()
        .map(|(i, pubkey)| {
            AccountKey::new(
                *pubkey,
                is_signer(header, i),
                is_static_writable(header, i, static_keys.len()),
            )
        })
        .collect();
    account_keys.extend(
        loaded_writable
            .iter()
            .map(|pubkey| AccountKey::new(*pubkey, false, true)),
    );
    account_keys.extend(
        loaded_readonly
            .iter()
            .map(|pubkey| AccountKey::new(*pubkey, false, false)),
    );

    let resolve = |index: u8| account_keys.get(index as usize).map(|key| key.pubkey);
    let instructions = message
        .instructions()
        .iter()
        .filter_map(|ix| {
            let program_id = resolve(ix.program_id_index)?;
            let accounts = ix
                .accounts
                .iter()
                .map(|index| resolve(*index))
                .collect::<Option<Vec<_>>>()?;
            Some(RawInstruction {
                program_id,
                accounts,
                data: ix.data.clone(),
            })
        })
        .collect();

    Transaction {
        signature,
        account_keys,
        instructions,
        fee,
    }
}

fn is_signer(header: &MessageHeader, index: usize) -> bool {
    index < header.num_required_signatures as usize
}

fn is_static_writable(header: &MessageHeader, index: usize, num_static: usize) -> bool {
    let signers = header.num_required_signatures as usize;
    if index < signers {
        index < signers.saturating_sub(header.num_readonly_signed_accounts as usize)
    } else {
        index < num_static.saturating_sub(header.num_readonly_unsigned_accounts as usize)
    }
}
