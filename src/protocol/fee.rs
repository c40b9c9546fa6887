//! network fee model.
//!
//! The fee is `ceil(size / 1024) * fee_per_kb * multiplier(priority)`, where
//! the size is an estimate derived from the input, output and ring counts.
//! Everything here is pure: the same arguments always give the same fee,
//! which the selection loop relies on to terminate.
use serde::Deserialize;
use serde::Serialize;

use crate::config_models::fee_priority::FeePriorityTable;
use crate::protocol::amount::Amount;
use crate::protocol::mixin::Mixin;

pub const BYTES_PER_KB: usize = 1024;

/// outputs assumed when selecting for a fixed amount: destination + change.
pub const OUTPUTS_WITH_CHANGE: usize = 2;

/// outputs of a sweep: the destination only.
pub const OUTPUTS_SWEEP: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeeError {
    #[error("fee priority {priority} is not in the configured range 1..={highest}")]
    InvalidPriority { priority: u32, highest: u32 },

    #[error("fee computation overflowed")]
    FeeOverflow,
}

/// current fee state of one send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeQuote {
    /// rate from the live fee oracle.
    pub fee_per_kb: Amount,

    /// fee estimated for the current candidate set.
    pub network_fee: Amount,

    /// amount to send before the fee is applied.
    pub feeless_total: Amount,
}

impl FeeQuote {
    /// total that the selected inputs must cover.
    pub fn total_with_fee(&self) -> Option<Amount> {
        num_traits::CheckedAdd::checked_add(&self.feeless_total, &self.network_fee)
    }
}

/// estimated serialized size in bytes of a transaction.
pub fn estimate_tx_size(inputs: usize, mixin: Mixin, outputs: usize, ringct: bool) -> usize {
    let ring = mixin.ring_size();

    // version, unlock time
    let mut size = 1 + 6;

    // vin: tag, amount, key offsets, key image.
    // key offsets are varints, 3 bytes each is a fair guess.
    size += inputs * (1 + 6 + ring * 3 + 32);

    // vout: amount, one-time key
    size += outputs * (6 + 32);

    // extra: tx public key and nonce
    size += 40;

    if ringct {
        // rct type
        size += 1;
        // range proofs
        size += (2 * 64 * 32 + 32 + 64 * 32) * outputs;
        // MLSAGs
        size += inputs * (32 * ring + 32);
        // pseudo outs
        size += 32 * inputs;
        // ecdh info
        size += 2 * 32 * outputs;
        // output commitments
        size += 32 * outputs;
        // fee
        size += 4;
    } else {
        // one (c, r) scalar pair per ring member
        size += inputs * ring * 64;
    }

    size
}

/// fee for `num_bytes` at the given rate and multiplier.
pub fn calculate_fee(fee_per_kb: Amount, num_bytes: usize, multiplier: u64) -> Result<Amount, FeeError> {
    let num_kb = u64::try_from(num_bytes.div_ceil(BYTES_PER_KB)).map_err(|_| FeeError::FeeOverflow)?;
    num_kb
        .checked_mul(multiplier)
        .and_then(|factor| fee_per_kb.checked_scalar_mul(factor))
        .ok_or(FeeError::FeeOverflow)
}

/// fee for a transaction of `estimated_size` bytes at `priority`.
pub fn compute_fee(
    priority: u32,
    estimated_size: usize,
    fee_per_kb: Amount,
    table: &FeePriorityTable,
) -> Result<Amount, FeeError> {
    let multiplier = table
        .multiplier(priority)
        .ok_or(FeeError::InvalidPriority {
            priority,
            highest: table.highest_priority(),
        })?;
    calculate_fee(fee_per_kb, estimated_size, multiplier)
}

/// fee for a transaction with the given shape.
pub fn estimate_fee(
    priority: u32,
    inputs: usize,
    mixin: Mixin,
    outputs: usize,
    ringct: bool,
    fee_per_kb: Amount,
    table: &FeePriorityTable,
) -> Result<Amount, FeeError> {
    let size = estimate_tx_size(inputs, mixin, outputs, ringct);
    compute_fee(priority, size, fee_per_kb, table)
}
