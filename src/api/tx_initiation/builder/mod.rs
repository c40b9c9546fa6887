//! provides builders for generating a transaction.
//!
//! these builders are quite flexible, if a little verbose to use. The
//! [initiator](super::initiator) and [send](super::send) APIs use the builders
//! internally.
//!
//! Here is a typical transaction initiation sequence using the builder API.
//!
//! ```no_run
//! # use xmr_light_send::api::tx_initiation::builder::decoy_acquirer::DecoyAcquirer;
//! # use xmr_light_send::api::tx_initiation::builder::input_selector::InputSelector;
//! # use xmr_light_send::api::tx_initiation::builder::transaction_builder::TransactionBuilder;
//! # use xmr_light_send::api::tx_initiation::builder::transaction_details_builder::TransactionDetailsBuilder;
//! # use xmr_light_send::api::tx_initiation::submit::TxSubmitter;
//! # use xmr_light_send::api::export::*;
//! # use xmr_light_send::models::fund_targets::ParsedTarget;
//! # use xmr_light_send::protocol::keys::TxHash;
//!
//! async fn send_transaction(
//!     gateway: &dyn RemoteGateway,
//!     crypto: &dyn TxCryptography,
//!     sender_address: &str,
//!     public_keys: ViewSendKeys,
//!     secret_keys: &SecretViewSendKeys,
//!     recipient: &str,
//!     amount: Amount,
//! ) -> anyhow::Result<TxHash> {
//!     let mixin = Mixin::default();
//!
//!     // outputs and the live fee rate
//!     let unspent = gateway
//!         .unspent_outputs(sender_address, &secret_keys.view, mixin, Amount::from_piconero(2_000_000_000))
//!         .await?;
//!
//!     // select inputs
//!     let selection = InputSelector::new()
//!         .candidates(unspent.outputs.into_iter().map(|o| o.output).collect())
//!         .policy(InputSelectionPriority::Random)
//!         .spend_amount(amount)
//!         .mixin(mixin)
//!         .fee_per_kb(unspent.per_kb_fee)
//!         .build(&())?;
//!
//!     // destination plus change
//!     let mut targets = vec![ParsedTarget {
//!         address: recipient.to_owned(),
//!         keys: crypto.decode_address(recipient, Network::Mainnet)?,
//!         amount: selection.sending_amount,
//!         is_change: false,
//!     }];
//!     if selection.change_amount.is_positive() {
//!         targets.push(ParsedTarget {
//!             address: sender_address.to_owned(),
//!             keys: DecodedAddress {
//!                 keys: public_keys,
//!                 is_subaddress: false,
//!                 integrated_payment_id: None,
//!             },
//!             amount: selection.change_amount,
//!             is_change: true,
//!         });
//!     }
//!     let fund_targets = FundTargets {
//!         fund_targets: targets,
//!         final_fee: selection.fee.network_fee,
//!         using_outs: selection.selected,
//!         sending_amount: selection.sending_amount,
//!         change_amount: selection.change_amount,
//!         fee_quote: selection.fee,
//!         is_sweeping: false,
//!     };
//!
//!     // decoys for every input
//!     let decoys = DecoyAcquirer::new(gateway)
//!         .fetch(&fund_targets.using_outs, mixin)
//!         .await?;
//!
//!     // rings, destinations and payment id
//!     let unsigned = TransactionDetailsBuilder::new()
//!         .fund_targets(&fund_targets)
//!         .decoys(&decoys)
//!         .mixin(mixin)
//!         .build(crypto)?;
//!
//!     // sign
//!     let signed = TransactionBuilder::new()
//!         .unsigned_transaction(&unsigned)
//!         .secret_keys(secret_keys)
//!         .build(crypto)?;
//!
//!     // submit
//!     let tx_hash = TxSubmitter::new(gateway)
//!         .submit(sender_address, &secret_keys.view, &signed)
//!         .await
//!         .into_result()?;
//!     Ok(tx_hash)
//! }
//! ```
//!
//! note: unlike [TransactionInitiator](super::initiator::TransactionInitiator)
//! this sequence does not re-check the fee against the signed size.

pub mod decoy_acquirer;
pub mod input_selector;
pub mod transaction_builder;
pub mod transaction_details_builder;
