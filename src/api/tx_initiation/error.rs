//! provides error types related to initiating transactions.

use serde::Deserialize;
use serde::Serialize;

use crate::gateway::GatewayError;
use crate::protocol::amount::Amount;
use crate::protocol::fee::FeeError;
use crate::protocol::mixin::InvalidMixin;

/// enumerates possible transaction creation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[non_exhaustive]
pub enum CreateTxError {
    #[error("missing required data to build transaction: {0}")]
    MissingRequirement(String),

    /// `dust` is the amount held in outputs that were excluded as dust. if
    /// `spendable + dust` would cover the request, sweeping is the remedy
    /// rather than adding funds.
    #[error(
        "insufficient funds. requested: {}, spendable: {}, dust: {}",
        requested,
        spendable,
        dust
    )]
    InsufficientFunds {
        requested: Amount,
        spendable: Amount,
        dust: Amount,
    },

    #[error("no spendable outputs available")]
    NoSpendableOutputs,

    #[error("invalid mixin: {0}")]
    InvalidMixin(String),

    #[error("fee priority {priority} is not in the configured range 1..={highest}")]
    InvalidPriority { priority: u32, highest: u32 },

    #[error("fee computation overflowed")]
    FeeOverflow,

    /// amounts reported for the outputs do not fit in a `u64` when added up.
    #[error("sum of output amounts overflowed")]
    AmountOverflow,

    #[error(
        "not enough decoys for output {global_index}. needed {needed}, got {received}"
    )]
    InsufficientAnonymitySet {
        global_index: u64,
        needed: usize,
        received: usize,
    },

    #[error("malformed destination address: {0}")]
    MalformedDestination(String),

    #[error("invalid payment id: {0}")]
    InvalidPaymentId(String),

    #[error("transaction construction is inconsistent: {0}")]
    ConstructionInconsistency(String),

    #[error(
        "fee did not converge after {attempts} attempts. last required fee: {required}"
    )]
    FeeDidNotConverge { attempts: usize, required: Amount },
}

/// enumerates possible transaction send errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SendError {
    #[error(transparent)]
    Tx(#[from] CreateTxError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// the outcome of the submission cannot be known.
    #[error(
        "transaction submission outcome is unknown, check transaction history before retrying. reason: {reason}"
    )]
    SubmissionUnknown { reason: String },

    #[error("transaction was rejected by the gateway. reason: {reason}")]
    SubmissionRejected { reason: String },
}

/// coarse classification of a [SendError], for callers deciding how to
/// react.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[non_exhaustive]
pub enum ErrorKind {
    InsufficientFunds,
    InvalidMixin,
    InvalidInput,
    InsufficientAnonymitySet,
    MalformedDestination,
    ConstructionInconsistency,
    Gateway,
    SubmissionUnknown,
    SubmissionRejected,
}

impl CreateTxError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientFunds { .. } | Self::NoSpendableOutputs => {
                ErrorKind::InsufficientFunds
            }
            Self::InvalidMixin(_) => ErrorKind::InvalidMixin,
            Self::MissingRequirement(_)
            | Self::InvalidPriority { .. }
            | Self::InvalidPaymentId(_) => ErrorKind::InvalidInput,
            Self::InsufficientAnonymitySet { .. } => ErrorKind::InsufficientAnonymitySet,
            Self::MalformedDestination(_) => ErrorKind::MalformedDestination,
            Self::FeeOverflow
            | Self::AmountOverflow
            | Self::ConstructionInconsistency(_)
            | Self::FeeDidNotConverge { .. } => ErrorKind::ConstructionInconsistency,
        }
    }
}

impl SendError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Tx(e) => e.kind(),
            Self::Gateway(_) => ErrorKind::Gateway,
            Self::SubmissionUnknown { .. } => ErrorKind::SubmissionUnknown,
            Self::SubmissionRejected { .. } => ErrorKind::SubmissionRejected,
        }
    }
}

impl From<FeeError> for CreateTxError {
    fn from(e: FeeError) -> Self {
        match e {
            FeeError::InvalidPriority { priority, highest } => {
                Self::InvalidPriority { priority, highest }
            }
            FeeError::FeeOverflow => Self::FeeOverflow,
        }
    }
}

impl From<InvalidMixin> for CreateTxError {
    fn from(e: InvalidMixin) -> Self {
        Self::InvalidMixin(e.0)
    }
}

impl From<FeeError> for SendError {
    fn from(e: FeeError) -> Self {
        Self::Tx(e.into())
    }
}
