pub mod rpc;

use crate::transaction::Transaction;
use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

pub use rpc::RpcTransactionSource;

pub type SourceResult<T> = Result<T, SourceError>;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("RPC request failed: {0}")]
    Rpc(#[from] solana_client::client_error::ClientError),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Account {0} is not an SPL token account")]
    NotTokenAccount(Pubkey),

    #[error("Account {0} is not an SPL mint")]
    NotMint(Pubkey),

    #[error("{0}")]
    Other(String),
}

/// Where transactions and the auxiliary account state come from.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Recent transactions that invoked `program_id`, newest first.
    async fn recent_transactions(&self, program_id: &Pubkey) -> SourceResult<Vec<Transaction>>;

    /// Mint of an SPL token account.
    async fn token_account_mint(&self, token_account: &Pubkey) -> SourceResult<Pubkey>;

    /// Decimal places of an SPL mint.
    async fn mint_decimals(&self, mint: &Pubkey) -> SourceResult<u8>;
}

/// Packed size of an SPL token account.
pub const TOKEN_ACCOUNT_LEN: usize = 165;
/// Packed size of an SPL mint.
pub const MINT_LEN: usize = 82;
// mint_authority: COption<Pubkey> (36) + supply: u64 (8)
const MINT_DECIMALS_OFFSET: usize = 44;

/// Mint stored in the first 32 bytes of a token account.
pub fn mint_of_token_account(data: &[u8]) -> Option<Pubkey> {
    if data.len() != TOKEN_ACCOUNT_LEN {
        return None;
    }
    let bytes: [u8; 32] = data[..32].try_into().ok()?;
    Some(Pubkey::from(bytes))
}

pub fn decimals_of_mint(data: &[u8]) -> Option<u8> {
    if data.len() != MINT_LEN {
        return None;
    }
    data.get(MINT_DECIMALS_OFFSET).copied()
}
