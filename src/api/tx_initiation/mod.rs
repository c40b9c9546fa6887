//! provides builders and APIs for initiating transactions.
//!
//! The module is designed to provide flexible, low-level manipulation
//! of transactions as well as an easy to use high-level
//! [send_funds()](send::TransactionSender::send_funds()) method.
//!
//! It is composed of three layers:
//!
//! 1. [builder] provides a set of transaction builders.
//! 2. [initiator] provides [TransactionInitiator](initiator::TransactionInitiator)
//!    that wraps the builders and submits the tx.
//! 3. [send] provides [TransactionSender](send::TransactionSender) with a
//!    single, simple `send_funds()` method.
//!
//! # Transaction Initiation Sequence
//!
//! When sending funds, the sequence is:
//!  1. fetch unspent outputs and the fee rate from the gateway.
//!  2. select outputs covering the amount plus fee.
//!  3. fetch decoys for every selected output.
//!  4. assemble rings, destinations and payment id.
//!  5. sign and serialize.
//!  6. if the signed size needs a higher fee, go back to 2.
//!  7. submit.
//!
//! note: `TransactionSender::send_funds()` performs steps 1-7.
//! `TransactionInitiator` provides 2 and 3-7 as separate operations.
//!
//! Progress is reported through a [StatusSink](status::StatusSink).

pub mod builder;
pub mod error;
pub mod initiator;
pub mod send;
pub mod status;
pub mod submit;
