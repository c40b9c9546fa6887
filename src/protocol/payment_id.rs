use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

pub const SHORT_PAYMENT_ID_LENGTH: usize = 8;
pub const LONG_PAYMENT_ID_LENGTH: usize = 32;

/// optional correlation value attached to a transaction for the recipient's
/// bookkeeping.
///
/// `Short` ids can be encrypted to the recipient. `Long` ids are the legacy
/// unencrypted form; they are accepted but only ever travel in the clear.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentId {
    Short([u8; SHORT_PAYMENT_ID_LENGTH]),
    Long([u8; LONG_PAYMENT_ID_LENGTH]),
}

impl PaymentId {
    pub fn is_short(&self) -> bool {
        matches!(self, Self::Short(_))
    }

    pub fn to_hex(&self) -> String {
        match self {
            Self::Short(bytes) => hex::encode(bytes),
            Self::Long(bytes) => hex::encode(bytes),
        }
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("payment id must be {} or {} hex characters: {0:?}", SHORT_PAYMENT_ID_LENGTH * 2, LONG_PAYMENT_ID_LENGTH * 2)]
pub struct ParsePaymentIdError(String);

impl FromStr for PaymentId {
    type Err = ParsePaymentIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim()).map_err(|_| ParsePaymentIdError(s.to_owned()))?;
        match bytes.len() {
            SHORT_PAYMENT_ID_LENGTH => {
                let mut id = [0u8; SHORT_PAYMENT_ID_LENGTH];
                id.copy_from_slice(&bytes);
                Ok(Self::Short(id))
            }
            LONG_PAYMENT_ID_LENGTH => {
                let mut id = [0u8; LONG_PAYMENT_ID_LENGTH];
                id.copy_from_slice(&bytes);
                Ok(Self::Long(id))
            }
            _ => Err(ParsePaymentIdError(s.to_owned())),
        }
    }
}

/// the payment id as it is written into the transaction extra field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentIdField {
    /// short id encrypted to the destination's public view key.
    Encrypted([u8; SHORT_PAYMENT_ID_LENGTH]),
    /// id sent as given.
    Clear(PaymentId),
}
