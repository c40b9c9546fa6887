//! a builder for [SignedTransaction].
//!
//! see [builder](super) for examples of using the builders together.

use subtle::ConstantTimeEq;

use crate::api::tx_initiation::error::CreateTxError;
use crate::crypto::TxCryptography;
use crate::models::transaction::SignedTransaction;
use crate::models::transaction::UnsignedTransaction;
use crate::protocol::keys::SecretViewSendKeys;
use crate::protocol::keys::TxHash;

/// a builder for [SignedTransaction]
///
/// see module docs for example usage.
#[derive(Debug, Default)]
pub struct TransactionBuilder<'a> {
    unsigned: Option<&'a UnsignedTransaction>,
    secret_keys: Option<&'a SecretViewSendKeys>,
}

impl<'a> TransactionBuilder<'a> {
    /// instantiate
    pub fn new() -> Self {
        Default::default()
    }

    /// set the unsigned transaction (required)
    pub fn unsigned_transaction(mut self, unsigned: &'a UnsignedTransaction) -> Self {
        self.unsigned = Some(unsigned);
        self
    }

    /// set the sender's secret keys (required)
    pub fn secret_keys(mut self, secret_keys: &'a SecretViewSendKeys) -> Self {
        self.secret_keys = Some(secret_keys);
        self
    }

    /// sign and serialize.
    ///
    /// A signing failure is a construction defect: nothing partially signed
    /// is ever returned.
    pub fn build(self, crypto: &dyn TxCryptography) -> Result<SignedTransaction, CreateTxError> {
        let Some(unsigned) = self.unsigned else {
            return Err(CreateTxError::MissingRequirement("unsigned transaction".to_owned()));
        };
        let Some(secret_keys) = self.secret_keys else {
            return Err(CreateTxError::MissingRequirement("secret keys".to_owned()));
        };

        let signed = crypto
            .sign_transaction(unsigned, secret_keys)
            .map_err(|e| {
                tracing::error!("signing failed: {e}");
                CreateTxError::ConstructionInconsistency(e.to_string())
            })?;

        if signed.tx_hash == TxHash::default() || signed.serialized.is_empty() {
            return Err(CreateTxError::ConstructionInconsistency(
                "signed transaction is empty".to_owned(),
            ));
        }
        if !bool::from(signed.tx_key.ct_eq(&unsigned.tx_secret_key)) {
            return Err(CreateTxError::ConstructionInconsistency(
                "signed transaction carries a different tx key".to_owned(),
            ));
        }

        tracing::debug!(tx_hash = %signed.tx_hash, size = signed.size(), "signed transaction");
        Ok(signed)
    }
}
