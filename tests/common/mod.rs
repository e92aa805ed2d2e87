#![allow(dead_code)]

use async_trait::async_trait;
use jupiter_arb_monitor::config::TokenConfig;
use jupiter_arb_monitor::idl::{instruction_discriminator, Side, SidedSwapArgs, SwapArgs};
use jupiter_arb_monitor::sources::{SourceError, SourceResult, TransactionSource};
use jupiter_arb_monitor::token_registry::TokenRegistry;
use jupiter_arb_monitor::transaction::{AccountKey, RawInstruction, Transaction};
use solana_sdk::pubkey::Pubkey;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const USDC: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

/// Chain state served from memory.
#[derive(Default)]
pub struct MemorySource {
    transactions: Mutex<HashMap<Pubkey, Vec<Transaction>>>,
    mints: Mutex<HashMap<Pubkey, Pubkey>>,
    decimals: Mutex<HashMap<Pubkey, u8>>,
    failing: Mutex<HashSet<Pubkey>>,
    mint_lookups: AtomicUsize,
}

impl MemorySource {
    pub fn push_transaction(&self, program_id: Pubkey, transaction: Transaction) {
        self.transactions
            .lock()
            .unwrap()
            .entry(program_id)
            .or_default()
            .push(transaction);
    }

    pub fn set_mint(&self, token_account: Pubkey, mint: Pubkey) {
        self.mints.lock().unwrap().insert(token_account, mint);
    }

    pub fn set_decimals(&self, mint: Pubkey, decimals: u8) {
        self.decimals.lock().unwrap().insert(mint, decimals);
    }

    pub fn set_failing(&self, program_id: Pubkey, failing: bool) {
        let mut set = self.failing.lock().unwrap();
        if failing {
            set.insert(program_id);
        } else {
            set.remove(&program_id);
        }
    }

    pub fn mint_lookups(&self) -> usize {
        self.mint_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransactionSource for MemorySource {
    async fn recent_transactions(&self, program_id: &Pubkey) -> SourceResult<Vec<Transaction>> {
        if self.failing.lock().unwrap().contains(program_id) {
            return Err(SourceError::Other(format!("{} unavailable", program_id)));
        }
        Ok(self
            .transactions
            .lock()
            .unwrap()
            .get(program_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn token_account_mint(&self, token_account: &Pubkey) -> SourceResult<Pubkey> {
        self.mint_lookups.fetch_add(1, Ordering::SeqCst);
        self.mints
            .lock()
            .unwrap()
            .get(token_account)
            .copied()
            .ok_or(SourceError::NotTokenAccount(*token_account))
    }

    async fn mint_decimals(&self, mint: &Pubkey) -> SourceResult<u8> {
        self.decimals
            .lock()
            .unwrap()
            .get(mint)
            .copied()
            .ok_or(SourceError::NotMint(*mint))
    }
}

pub fn usdc_mint() -> Pubkey {
    USDC.parse().unwrap()
}

pub fn registry() -> TokenRegistry {
    TokenRegistry::new(vec![TokenConfig {
        symbol: "USDC".to_string(),
        address: USDC.to_string(),
        decimals: 6,
    }])
}

pub fn token_program() -> Pubkey {
    Pubkey::new_from_array([6; 32])
}

fn instruction(
    program_id: Pubkey,
    account_count: usize,
    placed: &[(usize, Pubkey)],
    data: Vec<u8>,
) -> RawInstruction {
    let mut accounts: Vec<Pubkey> = (0..account_count).map(|_| Pubkey::new_unique()).collect();
    for (index, pubkey) in placed {
        accounts[*index] = *pubkey;
    }
    RawInstruction {
        program_id,
        accounts,
        data,
    }
}

fn swap_data(name: &str, in_amount: Option<u64>, minimum_out_amount: u64) -> Vec<u8> {
    let mut data = instruction_discriminator(name).to_vec();
    data.extend(
        borsh::to_vec(&SwapArgs {
            in_amount,
            minimum_out_amount,
            platform_fee_bps: 0,
        })
        .unwrap(),
    );
    data
}

fn sided_swap_data(name: &str, side: Side, in_amount: u64, minimum_out_amount: u64) -> Vec<u8> {
    let mut data = instruction_discriminator(name).to_vec();
    data.extend(
        borsh::to_vec(&SidedSwapArgs {
            side,
            in_amount: Some(in_amount),
            minimum_out_amount,
            platform_fee_bps: 0,
        })
        .unwrap(),
    );
    data
}

/// A `tokenSwap` instruction: token program at index 1, source at 5, destination at 8.
pub fn token_swap(
    program_id: Pubkey,
    source: Pubkey,
    destination: Pubkey,
    in_amount: Option<u64>,
    minimum_out_amount: u64,
) -> RawInstruction {
    instruction(
        program_id,
        11,
        &[(1, token_program()), (5, source), (8, destination)],
        swap_data("tokenSwap", in_amount, minimum_out_amount),
    )
}

/// A `serumSwap` instruction: order payer at index 10, coin wallet at 11, pc wallet at 12,
/// token program at 14.
pub fn serum_swap(
    program_id: Pubkey,
    payer: Pubkey,
    coin: Pubkey,
    pc: Pubkey,
    side: Side,
    in_amount: u64,
    minimum_out_amount: u64,
) -> RawInstruction {
    instruction(
        program_id,
        16,
        &[(10, payer), (11, coin), (12, pc), (14, token_program())],
        sided_swap_data("serumSwap", side, in_amount, minimum_out_amount),
    )
}

/// An `aldrinSwap` instruction: base at index 8, quote at 9, token program at 10.
pub fn aldrin_swap(
    program_id: Pubkey,
    base: Pubkey,
    quote: Pubkey,
    side: Side,
    in_amount: u64,
    minimum_out_amount: u64,
) -> RawInstruction {
    instruction(
        program_id,
        11,
        &[(8, base), (9, quote), (10, token_program())],
        sided_swap_data("aldrinSwap", side, in_amount, minimum_out_amount),
    )
}

/// An `aldrinV2Swap` instruction: base at index 8, quote at 9, curve at 10, token program
/// at 11.
pub fn aldrin_v2_swap(
    program_id: Pubkey,
    base: Pubkey,
    quote: Pubkey,
    side: Side,
    in_amount: u64,
    minimum_out_amount: u64,
) -> RawInstruction {
    instruction(
        program_id,
        12,
        &[(8, base), (9, quote), (11, token_program())],
        sided_swap_data("aldrinV2Swap", side, in_amount, minimum_out_amount),
    )
}

pub fn transaction(signature: &str, fee: u64, instructions: Vec<RawInstruction>) -> Transaction {
    Transaction {
        signature: signature.to_string(),
        account_keys: vec![AccountKey::new(Pubkey::new_unique(), true, true)],
        instructions,
        fee,
    }
}
