//! an in-process [RemoteGateway] holding canned data.
//!
//! Failures can be scripted per call type, and every call is recorded so
//! callers can assert on what reached the "network".
use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use async_trait::async_trait;

use super::AmountOutputs;
use super::GatewayError;
use super::GatewayOutput;
use super::RemoteGateway;
use super::SubmitAck;
use super::UnspentOutputs;
use crate::models::decoy_set::RingMember;
use crate::models::unspent_output::UnspentOutput;
use crate::protocol::amount::Amount;
use crate::protocol::keys::KeyImage;
use crate::protocol::keys::SecretKey;
use crate::protocol::mixin::Mixin;

/// a call received by a [MemoryGateway].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Login { address: String },
    UnspentOutputs { address: String, mixin: Mixin },
    RandomOutputs { amounts: Vec<String>, count: u32 },
    SubmitRawTx { address: String, tx_hex: String },
}

#[derive(Debug, Default)]
struct MemoryState {
    known_accounts: HashSet<String>,
    per_kb_fee: Amount,
    outputs: Vec<UnspentOutput>,
    spent_key_images: Vec<KeyImage>,
    decoys: HashMap<String, Vec<RingMember>>,
    unspent_outputs_failure: Option<GatewayError>,
    random_outputs_failure: Option<GatewayError>,
    submit_failure: Option<GatewayError>,
    calls: Vec<GatewayCall>,
    accepted: Vec<String>,
}

#[derive(Debug, Default)]
pub struct MemoryGateway {
    state: Mutex<MemoryState>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Default::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_per_kb_fee(self, per_kb_fee: Amount) -> Self {
        self.state().per_kb_fee = per_kb_fee;
        self
    }

    pub fn with_outputs(self, outputs: Vec<UnspentOutput>) -> Self {
        self.state().outputs.extend(outputs);
        self
    }

    /// key images the account has already published.
    pub fn with_spent_key_images(self, key_images: Vec<KeyImage>) -> Self {
        self.state().spent_key_images.extend(key_images);
        self
    }

    /// decoy pool for an amount key (`"0"` for RingCT).
    pub fn with_decoys(self, amount: impl Into<String>, decoys: Vec<RingMember>) -> Self {
        self.state().decoys.entry(amount.into()).or_default().extend(decoys);
        self
    }

    pub fn fail_unspent_outputs_with(&self, error: GatewayError) {
        self.state().unspent_outputs_failure = Some(error);
    }

    pub fn fail_random_outputs_with(&self, error: GatewayError) {
        self.state().random_outputs_failure = Some(error);
    }

    pub fn fail_submit_with(&self, error: GatewayError) {
        self.state().submit_failure = Some(error);
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state().calls.clone()
    }

    /// hex of every transaction accepted so far.
    pub fn submitted(&self) -> Vec<String> {
        self.state().accepted.clone()
    }

    pub fn submit_attempts(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| matches!(c, GatewayCall::SubmitRawTx { .. }))
            .count()
    }
}

#[async_trait]
impl RemoteGateway for MemoryGateway {
    async fn login(&self, address: &str, _view_key: &SecretKey) -> Result<bool, GatewayError> {
        let mut state = self.state();
        state.calls.push(GatewayCall::Login {
            address: address.to_owned(),
        });
        Ok(state.known_accounts.insert(address.to_owned()))
    }

    async fn unspent_outputs(
        &self,
        address: &str,
        _view_key: &SecretKey,
        mixin: Mixin,
        _dust_threshold: Amount,
    ) -> Result<UnspentOutputs, GatewayError> {
        let mut state = self.state();
        state.calls.push(GatewayCall::UnspentOutputs {
            address: address.to_owned(),
            mixin,
        });
        if let Some(e) = state.unspent_outputs_failure.clone() {
            return Err(e);
        }
        Ok(UnspentOutputs {
            per_kb_fee: state.per_kb_fee,
            outputs: state
                .outputs
                .iter()
                .map(|output| GatewayOutput {
                    output: output.clone(),
                    spend_key_images: state.spent_key_images.clone(),
                })
                .collect(),
        })
    }

    async fn random_outputs(
        &self,
        amounts: Vec<String>,
        count: u32,
    ) -> Result<Vec<AmountOutputs>, GatewayError> {
        let mut state = self.state();
        state.calls.push(GatewayCall::RandomOutputs {
            amounts: amounts.clone(),
            count,
        });
        if let Some(e) = state.random_outputs_failure.clone() {
            return Err(e);
        }
        Ok(amounts
            .into_iter()
            .map(|amount| {
                let outputs = state
                    .decoys
                    .get(&amount)
                    .map(|pool| pool.iter().take(count as usize).cloned().collect())
                    .unwrap_or_default();
                AmountOutputs { amount, outputs }
            })
            .collect())
    }

    async fn submit_raw_tx(
        &self,
        address: &str,
        _view_key: &SecretKey,
        tx_hex: &str,
    ) -> Result<SubmitAck, GatewayError> {
        let mut state = self.state();
        state.calls.push(GatewayCall::SubmitRawTx {
            address: address.to_owned(),
            tx_hex: tx_hex.to_owned(),
        });
        if let Some(e) = state.submit_failure.clone() {
            return Err(e);
        }
        state.accepted.push(tx_hex.to_owned());
        Ok(SubmitAck {
            status: "OK".to_owned(),
        })
    }
}
