use solana_sdk::pubkey::Pubkey;

/// One entry of a transaction's account-key list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountKey {
    pub pubkey: Pubkey,
    pub signer: bool,
    pub writable: bool,
}

impl AccountKey {
    pub fn new(pubkey: Pubkey, signer: bool, writable: bool) -> Self {
        Self {
            pubkey,
            signer,
            writable,
        }
    }
}

/// A top-level instruction with its account indices already resolved to addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInstruction {
    pub program_id: Pubkey,
    pub accounts: Vec<Pubkey>,
    pub data: Vec<u8>,
}

/// Immutable snapshot of a confirmed transaction as fetched from the chain.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub signature: String,
    pub account_keys: Vec<AccountKey>,
    pub instructions: Vec<RawInstruction>,
    /// Fee paid, in lamports.
    pub fee: u64,
}

impl Transaction {
    /// Instructions addressed to `program_id`, in message order.
    pub fn instructions_for<'a>(
        &'a self,
        program_id: &'a Pubkey,
    ) -> impl Iterator<Item = &'a RawInstruction> + 'a {
        self.instructions
            .iter()
            .filter(move |ix| ix.program_id == *program_id)
    }
}
