use crate::decoder::{DecodedInstruction, InstructionDecoder};
use crate::idl::{ArgValue, Side};
use crate::schema::{ProtocolSchema, RoleSet};
use crate::transaction::Transaction;
use log::debug;
use solana_sdk::pubkey::Pubkey;

/// One normalized swap taken from a single instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapLeg {
    pub instruction: &'static str,
    pub source: Pubkey,
    pub destination: Pubkey,
    pub in_amount: u64,
    pub minimum_out_amount: u64,
    pub token_program: Pubkey,
}

/// Build a swap leg from a decoded instruction, or `None` when a role or amount is missing.
pub fn extract(decoded: &DecodedInstruction, schema: &ProtocolSchema) -> Option<SwapLeg> {
    let (source, destination) = resolve_endpoints(decoded, &schema.roles);
    let token_program = decoded.account(schema.roles.token_program());
    let in_amount = decoded.arg("inAmount").and_then(ArgValue::as_u64);
    let minimum_out_amount = decoded.arg("minimumOutAmount").and_then(ArgValue::as_u64);

    match (source, destination, token_program, in_amount, minimum_out_amount) {
        (
            Some(source),
            Some(destination),
            Some(token_program),
            Some(in_amount),
            Some(minimum_out_amount),
        ) => Some(SwapLeg {
            instruction: decoded.name,
            source,
            destination,
            in_amount,
            minimum_out_amount,
            token_program,
        }),
        _ => {
            debug!(
                "Discarding incomplete {} leg (source: {:?}, destination: {:?}, token program: {:?}, in: {:?}, min out: {:?})",
                decoded.name, source, destination, token_program, in_amount, minimum_out_amount
            );
            None
        }
    }
}

fn resolve_endpoints(
    decoded: &DecodedInstruction,
    roles: &RoleSet,
) -> (Option<Pubkey>, Option<Pubkey>) {
    match roles {
        // The output wallet is whichever side of the market the payer did not pay from.
        RoleSet::OrderBook {
            source, coin, pc, ..
        } => {
            let source = decoded.account(source);
            let coin = decoded.account(coin);
            let pc = decoded.account(pc);
            let destination = match (coin, source) {
                (Some(coin), Some(source)) if coin == source => pc,
                (Some(coin), Some(_)) => Some(coin),
                _ => None,
            };
            (source, destination)
        }
        RoleSet::DualAsset { base, quote, .. } => {
            match decoded.arg("side").and_then(ArgValue::as_side) {
                Some(Side::Bid) => (decoded.account(quote), decoded.account(base)),
                Some(Side::Ask) => (decoded.account(base), decoded.account(quote)),
                None => (None, None),
            }
        }
        RoleSet::Simple {
            source,
            destination,
            ..
        } => (decoded.account(source), decoded.account(destination)),
    }
}

/// Legs of every decodable swap instruction `program_id` executed in `transaction`,
/// in instruction order.
pub fn extract_legs(
    decoder: &InstructionDecoder,
    transaction: &Transaction,
    program_id: &Pubkey,
) -> Vec<SwapLeg> {
    transaction
        .instructions_for(program_id)
        .filter_map(|ix| decoder.decode(ix, &transaction.account_keys))
        .filter_map(|decoded| {
            let schema = decoder.registry().lookup(decoded.name).supported()?;
            extract(&decoded, schema)
        })
        .collect()
}
