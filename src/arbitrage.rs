use crate::extractor::SwapLeg;
use crate::transaction::Transaction;
use log::debug;
use solana_sdk::pubkey::Pubkey;

/// Base fee of a single-signature transaction, in lamports.
pub const SOL_STANDARD_TX_FEE: u64 = 5_000;

/// A round trip that guarantees more out than it put in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArbitrageEvent {
    pub signature: String,
    pub program_id: Pubkey,
    pub legs: Vec<SwapLeg>,
    /// `minimum_out_amount` of the last leg minus `in_amount` of the first, in base units.
    pub profit: u64,
    pub fee: u64,
    pub fee_was_elevated: bool,
}

impl ArbitrageEvent {
    /// Token account the round trip ends in.
    pub fn output_account(&self) -> Option<Pubkey> {
        self.legs.last().map(|leg| leg.destination)
    }
}

pub struct ArbitrageDetector {
    standard_fee: u64,
}

impl ArbitrageDetector {
    pub fn new(standard_fee: u64) -> Self {
        Self { standard_fee }
    }

    /// Check the legs of one transaction for a round trip.
    ///
    /// Two shapes are recognised: a single leg paying from and into the same account, and
    /// two legs where the second returns to the first one's source. Longer chains are
    /// not evaluated.
    pub fn detect(
        &self,
        program_id: &Pubkey,
        transaction: &Transaction,
        legs: Vec<SwapLeg>,
    ) -> Option<ArbitrageEvent> {
        let (in_amount, out_amount) = match legs.as_slice() {
            [leg] if leg.source == leg.destination => (leg.in_amount, leg.minimum_out_amount),
            [first, last] if first.source == last.destination => {
                (first.in_amount, last.minimum_out_amount)
            }
            [] | [_] | [_, _] => return None,
            _ => {
                debug!(
                    "Not evaluating {} with {} legs",
                    transaction.signature,
                    legs.len()
                );
                return None;
            }
        };

        if in_amount >= out_amount {
            return None;
        }

        Some(ArbitrageEvent {
            signature: transaction.signature.clone(),
            program_id: *program_id,
            profit: out_amount - in_amount,
            fee: transaction.fee,
            fee_was_elevated: transaction.fee != self.standard_fee,
            legs,
        })
    }
}

impl Default for ArbitrageDetector {
    fn default() -> Self {
        Self::new(SOL_STANDARD_TX_FEE)
    }
}
