//! Binary layouts of the aggregator program's instructions.
//!
//! Every instruction payload starts with an 8-byte Anchor discriminator,
//! `sha256("global:<snake_case_name>")[..8]`, followed by the Borsh-encoded
//! arguments.

use borsh::{BorshDeserialize, BorshSerialize};
use sha2::{Digest, Sha256};
use std::fmt;

pub const DISCRIMINATOR_LEN: usize = 8;

/// Instruction names the aggregator IDL declares, swap or not.
///
/// Only the swap subset has a schema; the rest are recognised so the decoder can
/// tell an untracked instruction apart from a payload it cannot read at all.
pub const IDL_INSTRUCTIONS: &[&str] = &[
    "route",
    "createOpenOrders",
    "initializeTokenLedger",
    "setTokenLedger",
    "riskCheckAndFee",
    "mercurialExchange",
    "saberExchange",
    "saberSwap",
    "senchaExchange",
    "serumSwap",
    "tokenSwap",
    "stepTokenSwap",
    "cropperTokenSwap",
    "raydiumSwap",
    "raydiumSwapV2",
    "aldrinSwap",
    "aldrinV2Swap",
    "cremaTokenSwap",
    "lifinitySwap",
    "cykuraSwap",
    "whirlpoolSwap",
    "marinadeDeposit",
    "marinadeUnstake",
];

/// Order side carried by order-book and dual-asset pool swaps.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Bid,
    Ask,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct SwapArgs {
    pub in_amount: Option<u64>,
    pub minimum_out_amount: u64,
    pub platform_fee_bps: u8,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct SidedSwapArgs {
    pub side: Side,
    pub in_amount: Option<u64>,
    pub minimum_out_amount: u64,
    pub platform_fee_bps: u8,
}

/// Argument layout following the discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgLayout {
    Swap,
    SidedSwap,
}

/// A decoded scalar argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgValue {
    U64(u64),
    U8(u8),
    Side(Side),
    Null,
}

impl ArgValue {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            ArgValue::U64(v) => Some(*v),
            ArgValue::U8(v) => Some(u64::from(*v)),
            _ => None,
        }
    }

    pub fn as_side(&self) -> Option<Side> {
        match self {
            ArgValue::Side(side) => Some(*side),
            _ => None,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::U64(v) => write!(f, "{}", v),
            ArgValue::U8(v) => write!(f, "{}", v),
            ArgValue::Side(Side::Bid) => write!(f, "bid"),
            ArgValue::Side(Side::Ask) => write!(f, "ask"),
            ArgValue::Null => write!(f, "null"),
        }
    }
}

/// A named argument, named as in the IDL (camel case).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedArg {
    pub name: &'static str,
    pub value: ArgValue,
}

fn arg(name: &'static str, value: ArgValue) -> DecodedArg {
    DecodedArg { name, value }
}

fn optional_u64(value: Option<u64>) -> ArgValue {
    value.map(ArgValue::U64).unwrap_or(ArgValue::Null)
}

impl ArgLayout {
    /// Decode the bytes after the discriminator. Trailing bytes are ignored.
    pub fn decode(self, payload: &[u8]) -> std::io::Result<Vec<DecodedArg>> {
        let mut cursor = payload;
        let args = match self {
            ArgLayout::Swap => {
                let args = SwapArgs::deserialize(&mut cursor)?;
                vec![
                    arg("inAmount", optional_u64(args.in_amount)),
                    arg("minimumOutAmount", ArgValue::U64(args.minimum_out_amount)),
                    arg("platformFeeBps", ArgValue::U8(args.platform_fee_bps)),
                ]
            }
            ArgLayout::SidedSwap => {
                let args = SidedSwapArgs::deserialize(&mut cursor)?;
                vec![
                    arg("side", ArgValue::Side(args.side)),
                    arg("inAmount", optional_u64(args.in_amount)),
                    arg("minimumOutAmount", ArgValue::U64(args.minimum_out_amount)),
                    arg("platformFeeBps", ArgValue::U8(args.platform_fee_bps)),
                ]
            }
        };
        Ok(args)
    }
}

/// `aldrinV2Swap` -> `aldrin_v2_swap`
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

pub fn instruction_discriminator(name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let preimage = format!("global:{}", snake_case(name));
    let hash = Sha256::digest(preimage.as_bytes());
    let mut discriminator = [0u8; DISCRIMINATOR_LEN];
    discriminator.copy_from_slice(&hash[..DISCRIMINATOR_LEN]);
    discriminator
}

/// Discriminator table for every instruction in [`IDL_INSTRUCTIONS`].
#[derive(Debug, Clone)]
pub struct InstructionIdl {
    entries: Vec<([u8; DISCRIMINATOR_LEN], &'static str)>,
}

impl InstructionIdl {
    pub fn new() -> Self {
        let entries = IDL_INSTRUCTIONS
            .iter()
            .map(|name| (instruction_discriminator(name), *name))
            .collect();
        Self { entries }
    }

    /// Resolve the instruction name from the leading discriminator of `data`.
    pub fn identify(&self, data: &[u8]) -> Option<&'static str> {
        let discriminator = data.get(..DISCRIMINATOR_LEN)?;
        self.entries
            .iter()
            .find(|(d, _)| d.as_slice() == discriminator)
            .map(|(_, name)| *name)
    }
}

impl Default for InstructionIdl {
    fn default() -> Self {
        Self::new()
    }
}
