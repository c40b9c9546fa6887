//! boundary to the remote light-wallet gateway.
//!
//! The send pipeline talks to the gateway only through [RemoteGateway]:
//!
//! * `unspent_outputs` — the sender's outputs and the live per-kB fee.
//! * `random_outputs`  — decoy candidates, `count` per requested amount.
//! * `submit_raw_tx`   — broadcast a serialized, signed transaction.
//!
//! [LightWalletClient](light_wallet_client::LightWalletClient) speaks the
//! JSON-over-HTTP light-wallet API. [MemoryGateway](memory::MemoryGateway)
//! serves canned data and is used by tests and offline tooling.
use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::models::decoy_set::RingMember;
use crate::models::unspent_output::UnspentOutput;
use crate::protocol::amount::Amount;
use crate::protocol::keys::KeyImage;
use crate::protocol::keys::SecretKey;
use crate::protocol::mixin::Mixin;

pub mod light_wallet_client;
pub mod memory;
pub mod wire;

/// enumerates gateway failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    #[error("gateway transport failed: {0}")]
    Transport(String),

    #[error("gateway returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode gateway response: {0}")]
    Decode(String),

    /// the gateway understood the request and explicitly refused it.
    #[error("gateway rejected the request: {reason}")]
    Rejected { reason: String },
}

impl GatewayError {
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// an owned output together with the key images the gateway has seen spent
/// from the same account. an output is spent if its own key image is among
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayOutput {
    pub output: UnspentOutput,
    pub spend_key_images: Vec<KeyImage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnspentOutputs {
    pub per_kb_fee: Amount,
    pub outputs: Vec<GatewayOutput>,
}

/// decoy candidates for one requested amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountOutputs {
    pub amount: String,
    pub outputs: Vec<RingMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubmitAck {
    pub status: String,
}

#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// register or look up the account. returns `true` if it was created.
    async fn login(&self, address: &str, view_key: &SecretKey) -> Result<bool, GatewayError>;

    /// outputs received by `address`, plus the current fee rate.
    async fn unspent_outputs(
        &self,
        address: &str,
        view_key: &SecretKey,
        mixin: Mixin,
        dust_threshold: Amount,
    ) -> Result<UnspentOutputs, GatewayError>;

    /// `count` decoy candidates for each entry of `amounts`, in request order.
    async fn random_outputs(
        &self,
        amounts: Vec<String>,
        count: u32,
    ) -> Result<Vec<AmountOutputs>, GatewayError>;

    async fn submit_raw_tx(
        &self,
        address: &str,
        view_key: &SecretKey,
        tx_hex: &str,
    ) -> Result<SubmitAck, GatewayError>;
}
