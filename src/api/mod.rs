//! public api for sending funds from a light wallet.
//!
//! [tx_initiation] holds the send pipeline. [export] gathers the types a
//! caller needs in one place.
pub mod export;
pub mod tx_initiation;
