use crate::config::TokenConfig;
use log::warn;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::str::FromStr;

/// Display data for a mint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub symbol: String,
    pub decimals: u8,
}

/// Token metadata lookup, used for reporting only.
pub trait TokenMetadata: Send + Sync {
    fn lookup(&self, mint: &Pubkey) -> Option<TokenInfo>;
}

/// In-memory mint -> token table loaded from the token list.
#[derive(Debug, Default)]
pub struct TokenRegistry {
    tokens: HashMap<Pubkey, TokenInfo>,
}

impl TokenRegistry {
    pub fn new(tokens: Vec<TokenConfig>) -> Self {
        let mut registry = HashMap::with_capacity(tokens.len());
        for token in tokens {
            match Pubkey::from_str(&token.address) {
                Ok(mint) => {
                    registry.insert(
                        mint,
                        TokenInfo {
                            symbol: token.symbol,
                            decimals: token.decimals,
                        },
                    );
                }
                Err(_) => warn!("⚠️  Skipping token {} with invalid mint {}", token.symbol, token.address),
            }
        }
        Self { tokens: registry }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl TokenMetadata for TokenRegistry {
    fn lookup(&self, mint: &Pubkey) -> Option<TokenInfo> {
        self.tokens.get(mint).cloned()
    }
}

/// `EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v` -> `EPjF…Dt1v`
pub fn short_mint(mint: &Pubkey) -> String {
    let full = mint.to_string();
    if full.len() <= 8 {
        return full;
    }
    format!("{}…{}", &full[..4], &full[full.len() - 4..])
}
