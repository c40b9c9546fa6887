//! provides common types used in the crate's public API
//!
//! They are exported here in one location for convenience.

pub use crate::api::tx_initiation::builder::input_selector::InputSelectionPolicy;
pub use crate::api::tx_initiation::builder::input_selector::InputSelectionPriority;
pub use crate::api::tx_initiation::builder::input_selector::SortOrder;
pub use crate::api::tx_initiation::error::CreateTxError;
pub use crate::api::tx_initiation::error::ErrorKind;
pub use crate::api::tx_initiation::error::SendError;
pub use crate::api::tx_initiation::initiator::SendRequest;
pub use crate::api::tx_initiation::initiator::SenderAccount;
pub use crate::api::tx_initiation::initiator::TransactionInitiator;
pub use crate::api::tx_initiation::send::TransactionSender;
pub use crate::api::tx_initiation::status::Status;
pub use crate::api::tx_initiation::status::StatusLog;
pub use crate::api::tx_initiation::status::StatusSink;
pub use crate::config_models::fee_priority::FeePriorityTable;
pub use crate::config_models::network::Network;
pub use crate::config_models::send_config::SendConfig;
pub use crate::crypto::CryptoError;
pub use crate::crypto::DecodedAddress;
pub use crate::crypto::TxCryptography;
pub use crate::gateway::light_wallet_client::LightWalletClient;
pub use crate::gateway::memory::MemoryGateway;
pub use crate::gateway::GatewayError;
pub use crate::gateway::RemoteGateway;
pub use crate::models::fund_targets::FundTargets;
pub use crate::models::transaction::SentTransaction;
pub use crate::models::transaction::SignedTransaction;
pub use crate::models::transaction::UnsignedTransaction;
pub use crate::models::unspent_output::UnspentOutput;
pub use crate::protocol::amount::Amount;
pub use crate::protocol::keys::SecretViewSendKeys;
pub use crate::protocol::keys::ViewSendKeys;
pub use crate::protocol::mixin::Mixin;
pub use crate::protocol::payment_id::PaymentId;
