use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::protocol::amount::Amount;
use crate::protocol::keys::PublicKey;
use crate::protocol::keys::TxHash;

/// identifies an output by the transaction that created it and its index
/// within that transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OutputId {
    pub tx_hash: TxHash,
    pub index: u64,
}

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tx_hash, self.index)
    }
}

/// an output owned by the sender, as reported by the gateway.
///
/// read-only to this crate. `rct` carries the RingCT commitment/mask material
/// and is `None` for pre-RingCT outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnspentOutput {
    pub tx_hash: TxHash,
    pub tx_pub_key: PublicKey,
    pub index: u64,
    pub global_index: u64,
    pub amount: Amount,
    pub public_key: PublicKey,
    pub rct: Option<String>,
    pub height: u64,
}

impl UnspentOutput {
    pub fn id(&self) -> OutputId {
        OutputId {
            tx_hash: self.tx_hash,
            index: self.index,
        }
    }

    pub fn is_ringct(&self) -> bool {
        self.rct.is_some()
    }

    /// RingCT outputs have no dust concept.
    pub fn is_dust(&self, dust_threshold: Amount) -> bool {
        !self.is_ringct() && self.amount < dust_threshold
    }

    /// amount key used when requesting decoys: `"0"` for RingCT outputs,
    /// else the literal piconero amount.
    pub fn decoy_amount_key(&self) -> String {
        if self.is_ringct() {
            "0".to_owned()
        } else {
            self.amount.to_piconero().to_string()
        }
    }
}

/// total amount of a list of outputs, `None` on overflow.
pub fn total_amount<'a>(outputs: impl IntoIterator<Item = &'a UnspentOutput>) -> Option<Amount> {
    Amount::checked_sum(outputs.into_iter().map(|o| o.amount))
}
