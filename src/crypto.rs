//! boundary to the cryptographic primitives.
//!
//! Address decoding, payment id encryption, key image derivation and ring
//! signing are provided by the caller through [TxCryptography]. This crate
//! only orchestrates the order in which they are invoked.
use serde::Deserialize;
use serde::Serialize;

use crate::config_models::network::Network;
use crate::models::transaction::SignedTransaction;
use crate::models::transaction::UnsignedTransaction;
use crate::models::unspent_output::UnspentOutput;
use crate::protocol::keys::KeyImage;
use crate::protocol::keys::PublicKey;
use crate::protocol::keys::SecretKey;
use crate::protocol::keys::SecretViewSendKeys;
use crate::protocol::keys::ViewSendKeys;
use crate::protocol::payment_id::SHORT_PAYMENT_ID_LENGTH;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("crypto primitive failed: {0}")]
pub struct CryptoError(pub String);

/// public keys recovered from an address string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedAddress {
    pub keys: ViewSendKeys,
    pub is_subaddress: bool,

    /// short payment id embedded in an integrated address.
    pub integrated_payment_id: Option<[u8; SHORT_PAYMENT_ID_LENGTH]>,
}

impl DecodedAddress {
    pub fn view_public(&self) -> PublicKey {
        self.keys.view
    }
}

/// cryptographic operations consumed by the send pipeline.
///
/// Implementations must be deterministic for identical inputs except where
/// the signature scheme itself draws randomness.
pub trait TxCryptography: Send + Sync {
    /// decode an address string for the given network.
    fn decode_address(&self, address: &str, network: Network) -> Result<DecodedAddress, CryptoError>;

    /// encrypt a short payment id to the holder of `view_public`.
    fn encrypt_payment_id(
        &self,
        payment_id: [u8; SHORT_PAYMENT_ID_LENGTH],
        view_public: &PublicKey,
        tx_secret_key: &SecretKey,
    ) -> Result<[u8; SHORT_PAYMENT_ID_LENGTH], CryptoError>;

    /// key image the sender would publish when spending `output`.
    fn generate_key_image(
        &self,
        output: &UnspentOutput,
        public_keys: &ViewSendKeys,
        secret_keys: &SecretViewSendKeys,
    ) -> Result<KeyImage, CryptoError>;

    /// fresh one-time secret key for a new transaction.
    fn generate_tx_secret_key(&self) -> SecretKey;

    /// sign a fully assembled transaction and serialize it.
    fn sign_transaction(
        &self,
        unsigned: &UnsignedTransaction,
        secret_keys: &SecretViewSendKeys,
    ) -> Result<SignedTransaction, CryptoError>;
}
