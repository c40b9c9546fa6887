//! fixed-size key material exchanged with the gateway and the crypto
//! collaborator.
//!
//! Public values are plain 32-byte newtypes rendered as lowercase hex.
//! [SecretKey] is zeroized on drop and never prints its bytes.
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use subtle::Choice;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;
use zeroize::ZeroizeOnDrop;

pub const KEY_LENGTH: usize = 32;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseKeyError {
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("expected {KEY_LENGTH} bytes, got {0}")]
    Length(usize),
}

fn decode_32(s: &str) -> Result<[u8; KEY_LENGTH], ParseKeyError> {
    let bytes = hex::decode(s.trim())?;
    let len = bytes.len();
    bytes.try_into().map_err(|_| ParseKeyError::Length(len))
}

macro_rules! hex_bytes_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(pub [u8; KEY_LENGTH]);

        impl $name {
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl FromStr for $name {
            type Err = ParseKeyError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                decode_32(s).map(Self)
            }
        }

        impl From<[u8; KEY_LENGTH]> for $name {
            fn from(bytes: [u8; KEY_LENGTH]) -> Self {
                Self(bytes)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

hex_bytes_newtype!(
    /// a compressed curve point: spend/view public keys, output keys, tx
    /// public keys.
    PublicKey
);

hex_bytes_newtype!(
    /// key image of a spent output; identical key images mean a double spend.
    KeyImage
);

hex_bytes_newtype!(
    /// transaction hash as reported by the network.
    TxHash
);

/// a private scalar. zeroized on drop; `Debug` is redacted. equality is
/// constant time.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; KEY_LENGTH]);

impl SecretKey {
    pub fn new(bytes: [u8; KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.0
    }

    /// hex rendering for the wire. Callers must not log the result.
    pub fn expose_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl ConstantTimeEq for SecretKey {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0[..].ct_eq(&other.0[..])
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for SecretKey {}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

impl FromStr for SecretKey {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_32(s).map(Self)
    }
}

/// public view and spend keys of one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSendKeys {
    pub view: PublicKey,
    pub spend: PublicKey,
}

/// private view and spend keys of one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretViewSendKeys {
    pub view: SecretKey,
    pub spend: SecretKey,
}
