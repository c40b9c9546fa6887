//! provides an easy-to-use `TransactionSender` with a single send_funds()
//! method.
//!
//! This is the highest-level API. It fetches the sender's outputs and the
//! live fee rate from the gateway, drops outputs already spent, then runs
//! both [initiator](super::initiator) operations.
//!
//! Example:
//!
//! ```no_run
//! use std::sync::Arc;
//! use xmr_light_send::api::tx_initiation::initiator::SendRequest;
//! use xmr_light_send::api::tx_initiation::initiator::SenderAccount;
//! use xmr_light_send::api::tx_initiation::initiator::TransactionInitiator;
//! use xmr_light_send::api::tx_initiation::send::TransactionSender;
//! use xmr_light_send::api::tx_initiation::status::Status;
//! use xmr_light_send::config_models::send_config::SendConfig;
//! use xmr_light_send::crypto::TxCryptography;
//! use xmr_light_send::gateway::light_wallet_client::LightWalletClient;
//! use xmr_light_send::gateway::light_wallet_client::DEFAULT_TIMEOUT;
//! use xmr_light_send::models::transaction::SentTransaction;
//! use xmr_light_send::protocol::amount::Amount;
//!
//! async fn pay(
//!     crypto: Arc<dyn TxCryptography>,
//!     sender: SenderAccount,
//!     recipient: &str,
//!     amount: Amount,
//! ) -> anyhow::Result<SentTransaction> {
//!     let gateway = LightWalletClient::new("https://api.mymonero.com:8443", DEFAULT_TIMEOUT)?;
//!     let sender = TransactionSender::from(TransactionInitiator::new(
//!         Arc::new(gateway),
//!         crypto,
//!         SendConfig::default(),
//!         sender,
//!     ));
//!
//!     let status = |s: Status| println!("{s}");
//!     let sent = sender
//!         .send_funds(&SendRequest::new(recipient, amount), &status)
//!         .await?;
//!     Ok(sent)
//! }
//! ```
use num_traits::Zero;

use super::error::CreateTxError;
use super::error::SendError;
use super::initiator::report_outcome;
use super::initiator::SendRequest;
use super::initiator::TransactionInitiator;
use crate::api::tx_initiation::status::Status;
use crate::api::tx_initiation::status::StatusSink;
use crate::gateway::GatewayOutput;
use crate::models::transaction::SentTransaction;
use crate::models::unspent_output::UnspentOutput;
use crate::protocol::amount::Amount;

/// provides a send_funds() method to send a transaction in one call.
#[derive(Debug)]
pub struct TransactionSender {
    initiator: TransactionInitiator,
}

impl From<TransactionInitiator> for TransactionSender {
    fn from(initiator: TransactionInitiator) -> Self {
        Self { initiator }
    }
}

impl TransactionSender {
    pub fn initiator(&self) -> &TransactionInitiator {
        &self.initiator
    }

    /// fetch outputs, select, construct and submit.
    ///
    /// fires [Status::Accepted] on success and [Status::Failed] before any
    /// error is returned.
    pub async fn send_funds(
        &self,
        request: &SendRequest,
        status: &dyn StatusSink,
    ) -> Result<SentTransaction, SendError> {
        let result = self.fetch_and_send(request, status).await;
        report_outcome(result, status, true)
    }

    async fn fetch_and_send(
        &self,
        request: &SendRequest,
        status: &dyn StatusSink,
    ) -> Result<SentTransaction, SendError> {
        let initiator = &self.initiator;
        let config = initiator.config();
        let sender = initiator.sender();

        status.report(Status::FetchingLatestBalance);
        let unspent = initiator
            .gateway()
            .unspent_outputs(
                &sender.address,
                &sender.secret_keys.view,
                config.mixin,
                config.dust_threshold,
            )
            .await?;
        tracing::debug!(
            outputs = unspent.outputs.len(),
            per_kb_fee = %unspent.per_kb_fee,
            "fetched unspent outputs"
        );

        let unused_outs = self.unspent_only(unspent.outputs)?;
        let fund_targets = initiator.select_fund_targets(
            request,
            unused_outs.clone(),
            unspent.per_kb_fee,
            Amount::zero(),
            status,
        )?;

        initiator
            .construct_and_send(request, fund_targets, unused_outs, status)
            .await
    }

    /// outputs whose key image the gateway has not seen spent.
    fn unspent_only(&self, outputs: Vec<GatewayOutput>) -> Result<Vec<UnspentOutput>, CreateTxError> {
        let sender = self.initiator.sender();
        let mut unused = Vec::with_capacity(outputs.len());
        for GatewayOutput {
            output,
            spend_key_images,
        } in outputs
        {
            if spend_key_images.is_empty() {
                unused.push(output);
                continue;
            }
            let key_image = self
                .initiator
                .crypto()
                .generate_key_image(&output, &sender.public_keys, &sender.secret_keys)
                .map_err(|e| CreateTxError::ConstructionInconsistency(e.to_string()))?;
            if spend_key_images.contains(&key_image) {
                tracing::trace!(output = %output.id(), "output already spent");
            } else {
                unused.push(output);
            }
        }
        Ok(unused)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::Arc;

    use macro_rules_attr::apply;
    use tracing_test::traced_test;

    use super::*;
    use crate::api::tx_initiation::initiator::SenderAccount;
    use crate::api::tx_initiation::status::StatusLog;
    use crate::config_models::send_config::SendConfig;
    use crate::crypto::TxCryptography;
    use crate::gateway::memory::GatewayCall;
    use crate::gateway::memory::MemoryGateway;
    use crate::protocol::keys::KeyImage;
    use crate::protocol::mixin::Mixin;
    use crate::tests::shared::decoys;
    use crate::tests::shared::fee_per_kb;
    use crate::tests::shared::rct_output;
    use crate::tests::shared::sender_public_keys;
    use crate::tests::shared::sender_secret_keys;
    use crate::tests::shared::FakeCrypto;
    use crate::tests::shared::DESTINATION_ADDRESS;
    use crate::tests::shared::SENDER_ADDRESS;
    use crate::tests::shared_tokio_runtime;

    fn sender_for(gateway: Arc<MemoryGateway>) -> TransactionSender {
        TransactionInitiator::new(
            gateway,
            Arc::new(FakeCrypto::default()),
            SendConfig::default().with_mixin(Mixin::new(3)),
            SenderAccount {
                address: SENDER_ADDRESS.to_owned(),
                public_keys: sender_public_keys(),
                secret_keys: sender_secret_keys(),
            },
        )
        .into()
    }

    fn key_image_of(output: &UnspentOutput) -> KeyImage {
        FakeCrypto::default()
            .generate_key_image(output, &sender_public_keys(), &sender_secret_keys())
            .unwrap()
    }

    #[traced_test]
    #[apply(shared_tokio_runtime)]
    async fn spent_outputs_are_not_selected() {
        let spent = rct_output(Amount::coins(5), 1);
        let unspent = rct_output(Amount::coins(2), 2);
        let gateway = Arc::new(
            MemoryGateway::new()
                .with_per_kb_fee(fee_per_kb())
                .with_outputs(vec![spent.clone(), unspent.clone()])
                .with_spent_key_images(vec![key_image_of(&spent)])
                .with_decoys("0", decoys(8, 100, true)),
        );

        let status = StatusLog::new();
        let sent = sender_for(gateway.clone())
            .send_funds(&SendRequest::new(DESTINATION_ADDRESS, Amount::coins(1)), &status)
            .await
            .unwrap();

        assert_eq!(vec![unspent.id()], sent.spent_outputs);
        assert_eq!(Some(Status::FetchingLatestBalance), status.markers().first().copied());
        assert_eq!(Some(Status::Accepted), status.last());
        assert!(matches!(
            gateway.calls().first(),
            Some(GatewayCall::UnspentOutputs { .. })
        ));
    }

    #[apply(shared_tokio_runtime)]
    async fn only_spent_outputs_means_no_funds() {
        let spent = rct_output(Amount::coins(5), 1);
        let gateway = Arc::new(
            MemoryGateway::new()
                .with_per_kb_fee(fee_per_kb())
                .with_outputs(vec![spent.clone()])
                .with_spent_key_images(vec![key_image_of(&spent)]),
        );

        let status = StatusLog::new();
        let error = sender_for(gateway.clone())
            .send_funds(&SendRequest::new(DESTINATION_ADDRESS, Amount::coins(1)), &status)
            .await
            .unwrap_err();

        assert_eq!(SendError::Tx(CreateTxError::NoSpendableOutputs), error);
        assert_eq!(Some(Status::Failed), status.last());
        assert_eq!(1, gateway.calls().len());
    }

    #[apply(shared_tokio_runtime)]
    async fn unrelated_key_images_do_not_hide_outputs() {
        let output = rct_output(Amount::coins(2), 1);
        let gateway = Arc::new(
            MemoryGateway::new()
                .with_per_kb_fee(fee_per_kb())
                .with_outputs(vec![output.clone()])
                .with_spent_key_images(vec![KeyImage([9; 32])])
                .with_decoys("0", decoys(8, 100, true)),
        );

        let sent = sender_for(gateway)
            .send_funds(&SendRequest::sweep(DESTINATION_ADDRESS), &())
            .await
            .unwrap();
        assert_eq!(vec![output.id()], sent.spent_outputs);
        assert_eq!(Amount::coins(2), sent.sent_amount + sent.fee);
    }
}
