use crate::idl::ArgLayout;
use std::collections::HashMap;
use std::fmt;

/// The swap instructions whose accounts the monitor knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapProtocol {
    TokenSwap,
    MercurialExchange,
    SerumSwap,
    StepTokenSwap,
    SaberExchange,
    CropperTokenSwap,
    RaydiumSwap,
    RaydiumSwapV2,
    AldrinSwap,
    AldrinV2Swap,
    CremaTokenSwap,
    SenchaExchange,
}

const TOKEN_PROGRAM: &str = "tokenProgram";

const SPL_TOKEN_SWAP_ACCOUNTS: &[&str] = &[
    "tokenSwapProgram",
    "tokenProgram",
    "swap",
    "authority",
    "userTransferAuthority",
    "source",
    "swapSource",
    "swapDestination",
    "destination",
    "poolMint",
    "poolFee",
];

const CROPPER_ACCOUNTS: &[&str] = &[
    "tokenSwapProgram",
    "tokenProgram",
    "swap",
    "swapState",
    "authority",
    "userTransferAuthority",
    "source",
    "swapSource",
    "swapDestination",
    "destination",
    "poolMint",
    "poolFee",
];

const MERCURIAL_ACCOUNTS: &[&str] = &[
    "swapProgram",
    "swapState",
    "tokenProgram",
    "poolAuthority",
    "userTransferAuthority",
    "sourceTokenAccount",
    "destinationTokenAccount",
];

const SERUM_ACCOUNTS: &[&str] = &[
    "market",
    "openOrders",
    "requestQueue",
    "eventQueue",
    "bids",
    "asks",
    "coinVault",
    "pcVault",
    "vaultSigner",
    "authority",
    "orderPayerTokenAccount",
    "coinWallet",
    "pcWallet",
    "dexProgram",
    "tokenProgram",
    "rent",
];

const SABER_ACCOUNTS: &[&str] = &[
    "swapProgram",
    "tokenProgram",
    "swap",
    "swapAuthority",
    "userAuthority",
    "inputUserAccount",
    "inputTokenAccount",
    "outputUserAccount",
    "outputTokenAccount",
    "feesTokenAccount",
];

const SENCHA_ACCOUNTS: &[&str] = &[
    "swapProgram",
    "tokenProgram",
    "swap",
    "userAuthority",
    "inputUserAccount",
    "inputTokenAccount",
    "inputFeesAccount",
    "outputUserAccount",
    "outputTokenAccount",
    "outputFeesAccount",
];

const RAYDIUM_ACCOUNTS: &[&str] = &[
    "swapProgram",
    "tokenProgram",
    "ammId",
    "ammAuthority",
    "ammOpenOrders",
    "ammTargetOrders",
    "poolCoinTokenAccount",
    "poolPcTokenAccount",
    "serumProgramId",
    "serumMarket",
    "serumBids",
    "serumAsks",
    "serumEventQueue",
    "serumCoinVaultAccount",
    "serumPcVaultAccount",
    "serumVaultSigner",
    "userSourceTokenAccount",
    "userDestinationTokenAccount",
    "userSourceOwner",
];

const RAYDIUM_V2_ACCOUNTS: &[&str] = &[
    "swapProgram",
    "tokenProgram",
    "ammId",
    "ammAuthority",
    "ammOpenOrders",
    "poolCoinTokenAccount",
    "poolPcTokenAccount",
    "serumProgramId",
    "serumMarket",
    "serumBids",
    "serumAsks",
    "serumEventQueue",
    "serumCoinVaultAccount",
    "serumPcVaultAccount",
    "serumVaultSigner",
    "userSourceTokenAccount",
    "userDestinationTokenAccount",
    "userSourceOwner",
];

const ALDRIN_ACCOUNTS: &[&str] = &[
    "swapProgram",
    "pool",
    "poolSigner",
    "poolMint",
    "baseTokenVault",
    "quoteTokenVault",
    "feePoolTokenAccount",
    "walletAuthority",
    "userBaseTokenAccount",
    "userQuoteTokenAccount",
    "tokenProgram",
];

const ALDRIN_V2_ACCOUNTS: &[&str] = &[
    "swapProgram",
    "pool",
    "poolSigner",
    "poolMint",
    "baseTokenVault",
    "quoteTokenVault",
    "feePoolTokenAccount",
    "walletAuthority",
    "userBaseTokenAccount",
    "userQuoteTokenAccount",
    "curve",
    "tokenProgram",
];

const CREMA_ACCOUNTS: &[&str] = &[
    "swapProgram",
    "pool",
    "poolAuthority",
    "userTransferAuthority",
    "userSourceTokenAccount",
    "userDestinationTokenAccount",
    "poolSourceTokenAccount",
    "poolDestinationTokenAccount",
    "tickDst",
    "tokenProgram",
];

/// Role assignment as written in the IDL (camel case).
#[derive(Debug, Clone, Copy)]
enum RoleFields {
    Simple {
        source: &'static str,
        destination: &'static str,
    },
    DualAsset {
        base: &'static str,
        quote: &'static str,
    },
    OrderBook {
        source: &'static str,
        coin: &'static str,
        pc: &'static str,
    },
}

impl SwapProtocol {
    pub const ALL: [SwapProtocol; 12] = [
        SwapProtocol::TokenSwap,
        SwapProtocol::MercurialExchange,
        SwapProtocol::SerumSwap,
        SwapProtocol::StepTokenSwap,
        SwapProtocol::SaberExchange,
        SwapProtocol::CropperTokenSwap,
        SwapProtocol::RaydiumSwap,
        SwapProtocol::RaydiumSwapV2,
        SwapProtocol::AldrinSwap,
        SwapProtocol::AldrinV2Swap,
        SwapProtocol::CremaTokenSwap,
        SwapProtocol::SenchaExchange,
    ];

    /// Instruction name in the aggregator IDL.
    pub fn identifier(self) -> &'static str {
        match self {
            SwapProtocol::TokenSwap => "tokenSwap",
            SwapProtocol::MercurialExchange => "mercurialExchange",
            SwapProtocol::SerumSwap => "serumSwap",
            SwapProtocol::StepTokenSwap => "stepTokenSwap",
            SwapProtocol::SaberExchange => "saberExchange",
            SwapProtocol::CropperTokenSwap => "cropperTokenSwap",
            SwapProtocol::RaydiumSwap => "raydiumSwap",
            SwapProtocol::RaydiumSwapV2 => "raydiumSwapV2",
            SwapProtocol::AldrinSwap => "aldrinSwap",
            SwapProtocol::AldrinV2Swap => "aldrinV2Swap",
            SwapProtocol::CremaTokenSwap => "cremaTokenSwap",
            SwapProtocol::SenchaExchange => "senchaExchange",
        }
    }

    /// Account names in instruction order.
    pub fn accounts(self) -> &'static [&'static str] {
        match self {
            SwapProtocol::TokenSwap | SwapProtocol::StepTokenSwap => SPL_TOKEN_SWAP_ACCOUNTS,
            SwapProtocol::CropperTokenSwap => CROPPER_ACCOUNTS,
            SwapProtocol::MercurialExchange => MERCURIAL_ACCOUNTS,
            SwapProtocol::SerumSwap => SERUM_ACCOUNTS,
            SwapProtocol::SaberExchange => SABER_ACCOUNTS,
            SwapProtocol::SenchaExchange => SENCHA_ACCOUNTS,
            SwapProtocol::RaydiumSwap => RAYDIUM_ACCOUNTS,
            SwapProtocol::RaydiumSwapV2 => RAYDIUM_V2_ACCOUNTS,
            SwapProtocol::AldrinSwap => ALDRIN_ACCOUNTS,
            SwapProtocol::AldrinV2Swap => ALDRIN_V2_ACCOUNTS,
            SwapProtocol::CremaTokenSwap => CREMA_ACCOUNTS,
        }
    }

    pub fn arg_layout(self) -> ArgLayout {
        match self {
            SwapProtocol::SerumSwap | SwapProtocol::AldrinSwap | SwapProtocol::AldrinV2Swap => {
                ArgLayout::SidedSwap
            }
            _ => ArgLayout::Swap,
        }
    }

    fn role_fields(self) -> RoleFields {
        match self {
            SwapProtocol::TokenSwap
            | SwapProtocol::StepTokenSwap
            | SwapProtocol::CropperTokenSwap => RoleFields::Simple {
                source: "source",
                destination: "destination",
            },
            SwapProtocol::MercurialExchange => RoleFields::Simple {
                source: "sourceTokenAccount",
                destination: "destinationTokenAccount",
            },
            SwapProtocol::SaberExchange | SwapProtocol::SenchaExchange => RoleFields::Simple {
                source: "inputUserAccount",
                destination: "outputUserAccount",
            },
            SwapProtocol::RaydiumSwap
            | SwapProtocol::RaydiumSwapV2
            | SwapProtocol::CremaTokenSwap => RoleFields::Simple {
                source: "userSourceTokenAccount",
                destination: "userDestinationTokenAccount",
            },
            SwapProtocol::SerumSwap => RoleFields::OrderBook {
                source: "orderPayerTokenAccount",
                coin: "coinWallet",
                pc: "pcWallet",
            },
            SwapProtocol::AldrinSwap | SwapProtocol::AldrinV2Swap => RoleFields::DualAsset {
                base: "userBaseTokenAccount",
                quote: "userQuoteTokenAccount",
            },
        }
    }
}

impl fmt::Display for SwapProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// Account roles of one protocol, already converted to display names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleSet {
    Simple {
        source: String,
        destination: String,
        token_program: String,
    },
    DualAsset {
        base: String,
        quote: String,
        token_program: String,
    },
    OrderBook {
        source: String,
        coin: String,
        pc: String,
        token_program: String,
    },
}

impl RoleSet {
    fn from_fields(fields: RoleFields) -> Self {
        let token_program = sentence_case(TOKEN_PROGRAM);
        match fields {
            RoleFields::Simple {
                source,
                destination,
            } => RoleSet::Simple {
                source: sentence_case(source),
                destination: sentence_case(destination),
                token_program,
            },
            RoleFields::DualAsset { base, quote } => RoleSet::DualAsset {
                base: sentence_case(base),
                quote: sentence_case(quote),
                token_program,
            },
            RoleFields::OrderBook { source, coin, pc } => RoleSet::OrderBook {
                source: sentence_case(source),
                coin: sentence_case(coin),
                pc: sentence_case(pc),
                token_program,
            },
        }
    }

    pub fn token_program(&self) -> &str {
        match self {
            RoleSet::Simple { token_program, .. }
            | RoleSet::DualAsset { token_program, .. }
            | RoleSet::OrderBook { token_program, .. } => token_program,
        }
    }

    /// Every display name this role set refers to.
    pub fn names(&self) -> Vec<&str> {
        match self {
            RoleSet::Simple {
                source,
                destination,
                token_program,
            } => vec![source.as_str(), destination.as_str(), token_program.as_str()],
            RoleSet::DualAsset {
                base,
                quote,
                token_program,
            } => vec![base.as_str(), quote.as_str(), token_program.as_str()],
            RoleSet::OrderBook {
                source,
                coin,
                pc,
                token_program,
            } => vec![
                source.as_str(),
                coin.as_str(),
                pc.as_str(),
                token_program.as_str(),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProtocolSchema {
    pub protocol: SwapProtocol,
    pub arg_layout: ArgLayout,
    pub accounts: &'static [&'static str],
    pub roles: RoleSet,
}

impl ProtocolSchema {
    pub fn new(protocol: SwapProtocol) -> Self {
        Self {
            protocol,
            arg_layout: protocol.arg_layout(),
            accounts: protocol.accounts(),
            roles: RoleSet::from_fields(protocol.role_fields()),
        }
    }

    pub fn identifier(&self) -> &'static str {
        self.protocol.identifier()
    }
}

/// Result of a registry lookup.
#[derive(Debug, Clone, Copy)]
pub enum SchemaLookup<'a> {
    Supported(&'a ProtocolSchema),
    Unsupported,
}

impl<'a> SchemaLookup<'a> {
    pub fn supported(self) -> Option<&'a ProtocolSchema> {
        match self {
            SchemaLookup::Supported(schema) => Some(schema),
            SchemaLookup::Unsupported => None,
        }
    }
}

/// Fixed table of the swap protocols, keyed by instruction name.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: HashMap<&'static str, ProtocolSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        let schemas = SwapProtocol::ALL
            .iter()
            .map(|protocol| (protocol.identifier(), ProtocolSchema::new(*protocol)))
            .collect();
        Self { schemas }
    }

    pub fn lookup(&self, identifier: &str) -> SchemaLookup<'_> {
        match self.schemas.get(identifier) {
            Some(schema) => SchemaLookup::Supported(schema),
            None => SchemaLookup::Unsupported,
        }
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProtocolSchema> {
        self.schemas.values()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// `userSourceTokenAccount` -> `User Source Token Account`
pub fn sentence_case(field: &str) -> String {
    let mut spaced = String::with_capacity(field.len() + 4);
    for ch in field.chars() {
        if ch.is_ascii_uppercase() {
            spaced.push(' ');
        }
        spaced.push(ch);
    }
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
