//! Wallet-side transaction construction for RingCT light wallets.
//!
//! Given a destination and the sender's outputs, the crate selects inputs,
//! fetches decoys from a light-wallet gateway, assembles and signs a
//! transaction through a caller-supplied [crypto::TxCryptography], and
//! submits it. Progress is reported through
//! [StatusSink](api::tx_initiation::status::StatusSink).
//!
//! Start at [api::tx_initiation].
//
// If code coverage tool `cargo-llvm-cov` is running with the nightly toolchain,
// enable the unstable “coverage” attribute so that `#[cfg(test)]` modules can
// be annotated with `#[cfg_attr(coverage_nightly, coverage(off))]`.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod config_models;
pub mod crypto;
pub mod gateway;
pub mod models;
pub mod protocol;
