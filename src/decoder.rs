use crate::idl::{ArgValue, DecodedArg, InstructionIdl, DISCRIMINATOR_LEN};
use crate::schema::{sentence_case, SchemaLookup, SchemaRegistry};
use crate::transaction::{AccountKey, RawInstruction};
use log::debug;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

pub type DecodeResult<T> = Result<T, DecodeError>;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Instruction has no accounts")]
    NoAccounts,

    #[error("Payload does not match any known instruction layout")]
    UnknownLayout,

    #[error("Instruction {0} has no swap schema")]
    Unsupported(&'static str),

    #[error("Failed to decode {name} arguments: {source}")]
    Arguments {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{name} expects {expected} accounts, got {actual}")]
    MissingAccounts {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// An instruction account labelled with its display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAccount {
    pub name: String,
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedInstruction {
    pub name: &'static str,
    pub accounts: Vec<DecodedAccount>,
    pub args: Vec<DecodedArg>,
}

impl DecodedInstruction {
    /// Address of the first account whose display name is `name`.
    pub fn account(&self, name: &str) -> Option<Pubkey> {
        self.accounts
            .iter()
            .find(|account| account.name == name)
            .map(|account| account.pubkey)
    }

    pub fn arg(&self, name: &str) -> Option<&ArgValue> {
        self.args
            .iter()
            .find(|arg| arg.name == name)
            .map(|arg| &arg.value)
    }
}

/// Decodes aggregator instructions against the known layouts and swap schemas.
#[derive(Debug, Clone, Default)]
pub struct InstructionDecoder {
    idl: InstructionIdl,
    registry: SchemaRegistry,
}

impl InstructionDecoder {
    pub fn new() -> Self {
        Self {
            idl: InstructionIdl::new(),
            registry: SchemaRegistry::new(),
        }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Decode one instruction, or `None` when it is not a readable swap.
    pub fn decode(
        &self,
        instruction: &RawInstruction,
        account_keys: &[AccountKey],
    ) -> Option<DecodedInstruction> {
        match self.try_decode(instruction, account_keys) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                debug!("Skipping instruction: {}", e);
                None
            }
        }
    }

    pub fn try_decode(
        &self,
        instruction: &RawInstruction,
        account_keys: &[AccountKey],
    ) -> DecodeResult<DecodedInstruction> {
        if instruction.accounts.is_empty() {
            return Err(DecodeError::NoAccounts);
        }

        let name = self
            .idl
            .identify(&instruction.data)
            .ok_or(DecodeError::UnknownLayout)?;

        let schema = match self.registry.lookup(name) {
            SchemaLookup::Supported(schema) => schema,
            SchemaLookup::Unsupported => return Err(DecodeError::Unsupported(name)),
        };

        let args = schema
            .arg_layout
            .decode(&instruction.data[DISCRIMINATOR_LEN..])
            .map_err(|source| DecodeError::Arguments { name, source })?;

        if instruction.accounts.len() < schema.accounts.len() {
            return Err(DecodeError::MissingAccounts {
                name,
                expected: schema.accounts.len(),
                actual: instruction.accounts.len(),
            });
        }

        let accounts = instruction
            .accounts
            .iter()
            .enumerate()
            .map(|(i, pubkey)| {
                let name = match schema.accounts.get(i) {
                    Some(field) => sentence_case(field),
                    None => format!("Remaining Account {}", i - schema.accounts.len()),
                };
                let (is_signer, is_writable) = account_flags(account_keys, pubkey);
                DecodedAccount {
                    name,
                    pubkey: *pubkey,
                    is_signer,
                    is_writable,
                }
            })
            .collect();

        Ok(DecodedInstruction {
            name,
            accounts,
            args,
        })
    }
}

/// Signer/writable flags of `pubkey` in the transaction, `(false, false)` when absent.
fn account_flags(account_keys: &[AccountKey], pubkey: &Pubkey) -> (bool, bool) {
    account_keys
        .iter()
        .find(|key| key.pubkey == *pubkey)
        .map(|key| (key.signer, key.writable))
        .unwrap_or((false, false))
}
