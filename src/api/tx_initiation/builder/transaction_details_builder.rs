//! This module provides a builder for generating an [UnsignedTransaction].
//!
//! The builder turns selected outputs, their decoys and the fund targets into
//! rings and destinations, and attaches the payment id. It performs no I/O.
//! The result contains everything needed for a
//! [SignedTransaction](crate::models::transaction::SignedTransaction) except
//! the signatures.
//!
//! see [builder](super) for examples of using the builders together.
use itertools::Itertools;
use num_traits::CheckedAdd;
use rand::rng;
use rand::Rng;

use super::decoy_acquirer::DecoyMap;
use crate::api::tx_initiation::error::CreateTxError;
use crate::crypto::TxCryptography;
use crate::models::decoy_set::RingMember;
use crate::models::fund_targets::FundTargets;
use crate::models::fund_targets::ParsedTarget;
use crate::models::transaction::TxSource;
use crate::models::transaction::UnsignedTransaction;
use crate::models::unspent_output::UnspentOutput;
use crate::protocol::keys::SecretKey;
use crate::protocol::mixin::Mixin;
use crate::protocol::payment_id::PaymentId;
use crate::protocol::payment_id::PaymentIdField;

/// a builder to generate an [UnsignedTransaction].
// note: all fields intentionally private
#[derive(Debug)]
pub struct TransactionDetailsBuilder<'a> {
    fund_targets: Option<&'a FundTargets>,
    decoys: Option<&'a DecoyMap>,
    payment_id: Option<PaymentId>,
    encrypt_payment_id: bool,
    mixin: Mixin,
    ringct: bool,
    unlock_time: u64,
}

impl Default for TransactionDetailsBuilder<'_> {
    fn default() -> Self {
        Self {
            fund_targets: None,
            decoys: None,
            payment_id: None,
            encrypt_payment_id: true,
            mixin: Default::default(),
            ringct: true,
            unlock_time: 0,
        }
    }
}

impl<'a> TransactionDetailsBuilder<'a> {
    /// instantiate builder
    pub fn new() -> Self {
        Default::default()
    }

    /// selected outputs, destinations and fee.
    pub fn fund_targets(mut self, fund_targets: &'a FundTargets) -> Self {
        self.fund_targets = Some(fund_targets);
        self
    }

    /// decoys for every selected output.
    pub fn decoys(mut self, decoys: &'a DecoyMap) -> Self {
        self.decoys = Some(decoys);
        self
    }

    /// payment id supplied by the caller, if any.
    pub fn payment_id(mut self, payment_id: Option<PaymentId>) -> Self {
        self.payment_id = payment_id;
        self
    }

    /// encrypt a short payment id to the destination. defaults to true.
    pub fn encrypt_payment_id(mut self, encrypt: bool) -> Self {
        self.encrypt_payment_id = encrypt;
        self
    }

    pub fn mixin(mut self, mixin: Mixin) -> Self {
        self.mixin = mixin;
        self
    }

    pub fn ringct(mut self, ringct: bool) -> Self {
        self.ringct = ringct;
        self
    }

    pub fn unlock_time(mut self, unlock_time: u64) -> Self {
        self.unlock_time = unlock_time;
        self
    }

    /// Build the [UnsignedTransaction].
    ///
    /// Each ring holds the real output at a uniformly random position among
    /// its decoys. Inputs must equal destinations plus fee exactly.
    pub fn build(self, crypto: &dyn TxCryptography) -> Result<UnsignedTransaction, CreateTxError> {
        let Self {
            fund_targets: Some(fund_targets),
            decoys: Some(decoys),
            payment_id,
            encrypt_payment_id,
            mixin,
            ringct,
            unlock_time,
        } = self
        else {
            return Err(CreateTxError::MissingRequirement(
                "fund targets and decoys".to_owned(),
            ));
        };

        let destination = fund_targets.destination().ok_or_else(|| {
            CreateTxError::MissingRequirement("destination".to_owned())
        })?;
        check_change(fund_targets)?;

        let sources = fund_targets
            .using_outs
            .iter()
            .map(|output| {
                let decoys = decoys.get(&output.id()).ok_or_else(|| {
                    CreateTxError::ConstructionInconsistency(format!(
                        "no decoys for output {}",
                        output.id()
                    ))
                })?;
                ring_for(output, decoys.members(), mixin)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let tx_secret_key = crypto.generate_tx_secret_key();
        let payment_id = payment_id_field(
            payment_id,
            encrypt_payment_id,
            destination,
            &tx_secret_key,
            crypto,
        )?;

        let unsigned = UnsignedTransaction {
            sources,
            destinations: fund_targets.fund_targets.clone(),
            fee: fund_targets.final_fee,
            payment_id,
            unlock_time,
            ringct,
            mixin,
            tx_secret_key,
        };
        check_conservation(&unsigned)?;

        tracing::debug!(
            inputs = unsigned.sources.len(),
            outputs = unsigned.destinations.len(),
            fee = %unsigned.fee,
            "assembled unsigned transaction"
        );
        Ok(unsigned)
    }
}

/// ring of `decoys` plus the real output inserted at a random position.
fn ring_for(output: &UnspentOutput, decoys: &[RingMember], mixin: Mixin) -> Result<TxSource, CreateTxError> {
    if decoys.len() != mixin.decoys() {
        return Err(CreateTxError::InsufficientAnonymitySet {
            global_index: output.global_index,
            needed: mixin.decoys(),
            received: decoys.len(),
        });
    }

    let real_index = rng().random_range(0..=decoys.len());
    let mut ring = decoys.to_vec();
    ring.insert(real_index, RingMember::from(output));

    if !ring.iter().map(|m| m.global_index).all_unique() {
        tracing::error!(global_index = output.global_index, "ring has duplicate members");
        return Err(CreateTxError::ConstructionInconsistency(format!(
            "ring for output {} has duplicate members",
            output.id()
        )));
    }

    Ok(TxSource {
        output: output.clone(),
        ring,
        real_index,
    })
}

fn check_change(fund_targets: &FundTargets) -> Result<(), CreateTxError> {
    let change = fund_targets.change();
    let expect_change = !fund_targets.is_sweeping && fund_targets.change_amount.is_positive();
    match change {
        Some(change) if expect_change && change.amount == fund_targets.change_amount => Ok(()),
        None if !expect_change => Ok(()),
        _ => Err(CreateTxError::ConstructionInconsistency(format!(
            "change target does not match change amount {}",
            fund_targets.change_amount
        ))),
    }
}

fn check_conservation(unsigned: &UnsignedTransaction) -> Result<(), CreateTxError> {
    let inputs = unsigned.input_total().ok_or(CreateTxError::AmountOverflow)?;
    let spent = unsigned
        .output_total()
        .and_then(|outputs| outputs.checked_add(&unsigned.fee))
        .ok_or(CreateTxError::AmountOverflow)?;
    if inputs != spent {
        tracing::error!(%inputs, %spent, "amounts are not conserved");
        return Err(CreateTxError::ConstructionInconsistency(format!(
            "inputs {inputs} != outputs plus fee {spent}"
        )));
    }
    Ok(())
}

fn payment_id_field(
    requested: Option<PaymentId>,
    encrypt: bool,
    destination: &ParsedTarget,
    tx_secret_key: &SecretKey,
    crypto: &dyn TxCryptography,
) -> Result<Option<PaymentIdField>, CreateTxError> {
    let encrypt_short = |id| {
        crypto
            .encrypt_payment_id(id, &destination.keys.view_public(), tx_secret_key)
            .map(PaymentIdField::Encrypted)
            .map_err(|e| CreateTxError::ConstructionInconsistency(e.to_string()))
    };

    match (requested, destination.keys.integrated_payment_id) {
        (Some(_), Some(_)) => Err(CreateTxError::InvalidPaymentId(
            "destination is an integrated address and already carries a payment id".to_owned(),
        )),
        (None, Some(integrated)) => encrypt_short(integrated).map(Some),
        (Some(PaymentId::Short(id)), None) if encrypt => encrypt_short(id).map(Some),
        (Some(PaymentId::Long(_)), None) if encrypt => Err(CreateTxError::InvalidPaymentId(
            "a long payment id cannot be encrypted".to_owned(),
        )),
        (Some(id), None) => Ok(Some(PaymentIdField::Clear(id))),
        (None, None) => Ok(None),
    }
}
