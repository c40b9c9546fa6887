use serde::Deserialize;
use serde::Serialize;

use crate::models::decoy_set::RingMember;
use crate::models::fund_targets::ParsedTarget;
use crate::models::unspent_output::OutputId;
use crate::models::unspent_output::UnspentOutput;
use crate::protocol::amount::Amount;
use crate::protocol::keys::SecretKey;
use crate::protocol::keys::TxHash;
use crate::protocol::mixin::Mixin;
use crate::protocol::payment_id::PaymentId;
use crate::protocol::payment_id::PaymentIdField;

/// one real input with its ring. `ring[real_index]` is the real output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxSource {
    pub output: UnspentOutput,
    pub ring: Vec<RingMember>,
    pub real_index: usize,
}

/// everything needed to sign a transaction.
#[derive(Debug, Clone)]
pub struct UnsignedTransaction {
    pub sources: Vec<TxSource>,
    pub destinations: Vec<ParsedTarget>,
    pub fee: Amount,
    pub payment_id: Option<PaymentIdField>,
    pub unlock_time: u64,
    pub ringct: bool,
    pub mixin: Mixin,
    pub tx_secret_key: SecretKey,
}

impl UnsignedTransaction {
    pub fn input_total(&self) -> Option<Amount> {
        Amount::checked_sum(self.sources.iter().map(|s| s.output.amount))
    }

    /// destinations only, the fee is not included.
    pub fn output_total(&self) -> Option<Amount> {
        Amount::checked_sum(self.destinations.iter().map(|d| d.amount))
    }

    pub fn change(&self) -> Option<&ParsedTarget> {
        self.destinations.iter().find(|d| d.is_change)
    }
}

/// a signed, serialized transaction ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub tx_hash: TxHash,
    pub tx_key: SecretKey,
    pub serialized: Vec<u8>,
}

impl SignedTransaction {
    pub fn serialized_hex(&self) -> String {
        hex::encode(&self.serialized)
    }

    pub fn size(&self) -> usize {
        self.serialized.len()
    }
}

/// outcome of a successful send.
#[derive(Debug, Clone)]
pub struct SentTransaction {
    pub target_address: String,
    pub sent_amount: Amount,
    pub fee: Amount,
    pub change_amount: Amount,
    pub tx_hash: TxHash,
    pub tx_key: SecretKey,
    pub serialized_size: usize,
    pub payment_id: Option<PaymentId>,
    pub mixin: Mixin,
    pub spent_outputs: Vec<OutputId>,
}
