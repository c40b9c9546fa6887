//! provides the two pipeline operations for creating and sending a
//! transaction.
//!
//! [TransactionInitiator] wraps the [builder](super::builder) API:
//!
//! 1. [get_fund_targets_and_fee()](TransactionInitiator::get_fund_targets_and_fee())
//!    decodes the destination and selects outputs.
//! 2. [create_tx_and_attempt_to_send()](TransactionInitiator::create_tx_and_attempt_to_send())
//!    fetches decoys, assembles, signs and submits.
//!
//! The fee used during selection is an estimate. Once the transaction is
//! signed its real size is known; if that size calls for a higher fee the
//! outputs are selected again with the higher fee as a floor. This repeats at
//! most [max_fee_attempts](crate::config_models::send_config::SendConfig::max_fee_attempts)
//! times.
//!
//! Every failure reports [Status::Failed] before the error is returned.
//!
//! see [tx_initiation](super) for other APIs.
use std::sync::Arc;

use num_traits::Zero;

use super::error::CreateTxError;
use super::error::SendError;
use crate::api::tx_initiation::builder::decoy_acquirer::DecoyAcquirer;
use crate::api::tx_initiation::builder::input_selector::InputSelector;
use crate::api::tx_initiation::builder::transaction_builder::TransactionBuilder;
use crate::api::tx_initiation::builder::transaction_details_builder::TransactionDetailsBuilder;
use crate::api::tx_initiation::status::Status;
use crate::api::tx_initiation::status::StatusSink;
use crate::api::tx_initiation::submit::TxSubmitter;
use crate::config_models::send_config::SendConfig;
use crate::crypto::DecodedAddress;
use crate::crypto::TxCryptography;
use crate::gateway::RemoteGateway;
use crate::models::fund_targets::FundTargets;
use crate::models::fund_targets::ParsedTarget;
use crate::models::transaction::SentTransaction;
use crate::models::unspent_output::UnspentOutput;
use crate::protocol::amount::Amount;
use crate::protocol::fee::compute_fee;
use crate::protocol::keys::SecretViewSendKeys;
use crate::protocol::keys::ViewSendKeys;
use crate::protocol::payment_id::PaymentId;

/// the account funds are sent from. change returns to it.
#[derive(Debug, Clone)]
pub struct SenderAccount {
    pub address: String,
    pub public_keys: ViewSendKeys,
    pub secret_keys: SecretViewSendKeys,
}

/// what to send and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRequest {
    pub target_address: String,

    /// ignored when sweeping.
    pub target_amount: Amount,
    pub is_sweeping: bool,
    pub payment_id: Option<PaymentId>,
    pub encrypt_payment_id: bool,
}

impl SendRequest {
    /// send `amount` to `address`.
    pub fn new(address: impl Into<String>, amount: Amount) -> Self {
        Self {
            target_address: address.into(),
            target_amount: amount,
            is_sweeping: false,
            payment_id: None,
            encrypt_payment_id: true,
        }
    }

    /// send everything spendable to `address`.
    pub fn sweep(address: impl Into<String>) -> Self {
        Self {
            is_sweeping: true,
            ..Self::new(address, Amount::zero())
        }
    }

    pub fn with_payment_id(mut self, payment_id: PaymentId) -> Self {
        self.payment_id = Some(payment_id);
        self
    }

    pub fn with_encrypt_payment_id(mut self, encrypt: bool) -> Self {
        self.encrypt_payment_id = encrypt;
        self
    }
}

/// provides an API for building and sending transactions.
pub struct TransactionInitiator {
    gateway: Arc<dyn RemoteGateway>,
    crypto: Arc<dyn TxCryptography>,
    config: SendConfig,
    sender: SenderAccount,
}

impl std::fmt::Debug for TransactionInitiator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionInitiator")
            .field("config", &self.config)
            .field("sender", &self.sender.address)
            .finish_non_exhaustive()
    }
}

impl TransactionInitiator {
    pub fn new(
        gateway: Arc<dyn RemoteGateway>,
        crypto: Arc<dyn TxCryptography>,
        config: SendConfig,
        sender: SenderAccount,
    ) -> Self {
        Self {
            gateway,
            crypto,
            config,
            sender,
        }
    }

    pub fn config(&self) -> &SendConfig {
        &self.config
    }

    pub fn sender(&self) -> &SenderAccount {
        &self.sender
    }

    pub(crate) fn gateway(&self) -> &dyn RemoteGateway {
        self.gateway.as_ref()
    }

    pub(crate) fn crypto(&self) -> &dyn TxCryptography {
        self.crypto.as_ref()
    }

    /// choose outputs from `unused_outs` covering the request plus fee.
    ///
    /// `fee_per_kb` is the live rate reported by the gateway. Performs no
    /// I/O.
    pub fn get_fund_targets_and_fee(
        &self,
        request: &SendRequest,
        unused_outs: Vec<UnspentOutput>,
        fee_per_kb: Amount,
        status: &dyn StatusSink,
    ) -> Result<FundTargets, CreateTxError> {
        let result = self.select_fund_targets(request, unused_outs, fee_per_kb, Amount::zero(), status);
        report_outcome(result, status, false)
    }

    /// fetch decoys, assemble, sign and submit a transaction spending the
    /// outputs in `fund_targets`.
    ///
    /// `unused_outs` is the full candidate set, needed if the signed
    /// transaction turns out to require a higher fee and outputs must be
    /// selected again.
    pub async fn create_tx_and_attempt_to_send(
        &self,
        request: &SendRequest,
        fund_targets: FundTargets,
        unused_outs: Vec<UnspentOutput>,
        status: &dyn StatusSink,
    ) -> Result<SentTransaction, SendError> {
        let result = self
            .construct_and_send(request, fund_targets, unused_outs, status)
            .await;
        report_outcome(result, status, true)
    }

    pub(crate) fn select_fund_targets(
        &self,
        request: &SendRequest,
        unused_outs: Vec<UnspentOutput>,
        fee_per_kb: Amount,
        minimum_fee: Amount,
        status: &dyn StatusSink,
    ) -> Result<FundTargets, CreateTxError> {
        let destination = self
            .crypto
            .decode_address(&request.target_address, self.config.network)
            .map_err(|e| {
                tracing::warn!(address = %request.target_address, "cannot decode destination: {e}");
                CreateTxError::MalformedDestination(request.target_address.clone())
            })?;

        let selection = InputSelector::new()
            .candidates(unused_outs)
            .policy(self.config.input_selection_policy())
            .spend_amount(request.target_amount)
            .sweeping(request.is_sweeping)
            .ringct(self.config.ringct)
            .mixin(self.config.mixin)
            .fee_priority(self.config.fee_priority, self.config.fee_multipliers.clone())
            .fee_per_kb(fee_per_kb)
            .minimum_fee(minimum_fee)
            .build(status)?;

        let mut fund_targets = vec![ParsedTarget {
            address: request.target_address.clone(),
            keys: destination,
            amount: selection.sending_amount,
            is_change: false,
        }];
        if !request.is_sweeping && selection.change_amount.is_positive() {
            fund_targets.push(self.change_target(selection.change_amount));
        }

        Ok(FundTargets {
            fund_targets,
            final_fee: selection.fee.network_fee,
            using_outs: selection.selected,
            sending_amount: selection.sending_amount,
            change_amount: selection.change_amount,
            fee_quote: selection.fee,
            is_sweeping: request.is_sweeping,
        })
    }

    fn change_target(&self, amount: Amount) -> ParsedTarget {
        ParsedTarget {
            address: self.sender.address.clone(),
            keys: DecodedAddress {
                keys: self.sender.public_keys,
                is_subaddress: false,
                integrated_payment_id: None,
            },
            amount,
            is_change: true,
        }
    }

    pub(crate) async fn construct_and_send(
        &self,
        request: &SendRequest,
        mut fund_targets: FundTargets,
        unused_outs: Vec<UnspentOutput>,
        status: &dyn StatusSink,
    ) -> Result<SentTransaction, SendError> {
        let max_attempts = self.config.max_fee_attempts.max(1);
        let mut attempt = 1;

        let signed = loop {
            status.report(Status::FetchingDecoyOutputs);
            let decoys = DecoyAcquirer::new(self.gateway.as_ref())
                .fetch(&fund_targets.using_outs, self.config.mixin)
                .await?;

            status.report(Status::ConstructingTransaction);
            let unsigned = TransactionDetailsBuilder::new()
                .fund_targets(&fund_targets)
                .decoys(&decoys)
                .payment_id(request.payment_id)
                .encrypt_payment_id(request.encrypt_payment_id)
                .mixin(self.config.mixin)
                .ringct(self.config.ringct)
                .build(self.crypto.as_ref())?;

            let signed = TransactionBuilder::new()
                .unsigned_transaction(&unsigned)
                .secret_keys(&self.sender.secret_keys)
                .build(self.crypto.as_ref())?;

            let required = compute_fee(
                self.config.fee_priority,
                signed.size(),
                fund_targets.fee_quote.fee_per_kb,
                &self.config.fee_multipliers,
            )
            .map_err(CreateTxError::from)?;

            if required <= fund_targets.final_fee {
                break signed;
            }
            if attempt >= max_attempts {
                tracing::error!(attempt, %required, "fee did not converge");
                return Err(CreateTxError::FeeDidNotConverge {
                    attempts: attempt,
                    required,
                }
                .into());
            }

            tracing::info!(
                attempt,
                used = %fund_targets.final_fee,
                %required,
                size = signed.size(),
                "signed transaction needs a higher fee. selecting again"
            );
            attempt += 1;
            fund_targets = self.select_fund_targets(
                request,
                unused_outs.clone(),
                fund_targets.fee_quote.fee_per_kb,
                required,
                status,
            )?;
        };

        status.report(Status::SubmittingTransaction);
        let tx_hash = TxSubmitter::new(self.gateway.as_ref())
            .submit(&self.sender.address, &self.sender.secret_keys.view, &signed)
            .await
            .into_result()?;

        let payment_id = request.payment_id.or_else(|| {
            fund_targets
                .destination()
                .and_then(|d| d.keys.integrated_payment_id)
                .map(PaymentId::Short)
        });

        Ok(SentTransaction {
            target_address: request.target_address.clone(),
            sent_amount: fund_targets.sending_amount,
            fee: fund_targets.final_fee,
            change_amount: fund_targets.change_amount,
            tx_hash,
            tx_key: signed.tx_key.clone(),
            serialized_size: signed.size(),
            payment_id,
            mixin: self.config.mixin,
            spent_outputs: fund_targets.using_outs.iter().map(|o| o.id()).collect(),
        })
    }
}

/// fires `Failed` on error, and `Accepted` on success when `accepted_on_ok`.
pub(crate) fn report_outcome<T, E: std::fmt::Display>(
    result: Result<T, E>,
    status: &dyn StatusSink,
    accepted_on_ok: bool,
) -> Result<T, E> {
    match &result {
        Ok(_) if accepted_on_ok => status.report(Status::Accepted),
        Ok(_) => {}
        Err(e) => {
            tracing::warn!("send failed: {e}");
            status.report(Status::Failed);
        }
    }
    result
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use macro_rules_attr::apply;
    use tracing_test::traced_test;

    use super::*;
    use crate::api::tx_initiation::error::ErrorKind;
    use crate::api::tx_initiation::status::StatusLog;
    use crate::gateway::memory::GatewayCall;
    use crate::gateway::memory::MemoryGateway;
    use crate::gateway::GatewayError;
    use crate::protocol::mixin::Mixin;
    use crate::tests::shared::decoys;
    use crate::tests::shared::fee_per_kb;
    use crate::tests::shared::rct_output;
    use crate::tests::shared::sender_public_keys;
    use crate::tests::shared::sender_secret_keys;
    use crate::tests::shared_tokio_runtime;
    use crate::tests::shared::FakeCrypto;
    use crate::tests::shared::DESTINATION_ADDRESS;
    use crate::tests::shared::SENDER_ADDRESS;

    fn sender() -> SenderAccount {
        SenderAccount {
            address: SENDER_ADDRESS.to_owned(),
            public_keys: sender_public_keys(),
            secret_keys: sender_secret_keys(),
        }
    }

    fn initiator(gateway: Arc<MemoryGateway>, crypto: Arc<FakeCrypto>, mixin: u32) -> TransactionInitiator {
        TransactionInitiator::new(
            gateway,
            crypto,
            SendConfig::default().with_mixin(Mixin::new(mixin)),
            sender(),
        )
    }

    #[test]
    fn change_returns_to_sender() {
        let initiator = initiator(Arc::new(MemoryGateway::new()), Arc::new(FakeCrypto::default()), 5);
        let request = SendRequest::new(DESTINATION_ADDRESS, Amount::coins(1));
        let fund_targets = initiator
            .get_fund_targets_and_fee(&request, vec![rct_output(Amount::coins(3), 1)], fee_per_kb(), &())
            .unwrap();

        let change = fund_targets.change().unwrap();
        assert_eq!(SENDER_ADDRESS, change.address);
        assert_eq!(sender_public_keys(), change.keys.keys);
        assert_eq!(
            Amount::coins(3),
            fund_targets.sending_amount + fund_targets.change_amount + fund_targets.final_fee
        );
    }

    #[test]
    fn malformed_destination_fails_before_selection() {
        let initiator = initiator(Arc::new(MemoryGateway::new()), Arc::new(FakeCrypto::default()), 5);
        let status = StatusLog::new();
        let result = initiator.get_fund_targets_and_fee(
            &SendRequest::new("9TestnetAddress", Amount::coins(1)),
            vec![rct_output(Amount::coins(3), 1)],
            fee_per_kb(),
            &status,
        );
        assert!(matches!(result, Err(CreateTxError::MalformedDestination(_))));
        assert_eq!(vec![Status::Failed], status.markers());
    }

    #[traced_test]
    #[apply(shared_tokio_runtime)]
    async fn higher_signed_fee_triggers_reselection() {
        let gateway = Arc::new(MemoryGateway::new().with_decoys("0", decoys(10, 100, true)));
        // the first signature is 2 kB larger than estimated.
        let crypto = Arc::new(FakeCrypto {
            extra_signed_bytes: 2048,
            ..Default::default()
        });
        let initiator = initiator(gateway.clone(), crypto.clone(), 5);
        let request = SendRequest::new(DESTINATION_ADDRESS, Amount::coins(1));
        let outs = vec![rct_output(Amount::coins(2), 1)];

        let fund_targets = initiator
            .get_fund_targets_and_fee(&request, outs.clone(), fee_per_kb(), &())
            .unwrap();
        let estimated_fee = fund_targets.final_fee;

        let status = StatusLog::new();
        let sent = initiator
            .create_tx_and_attempt_to_send(&request, fund_targets, outs, &status)
            .await
            .unwrap();

        assert!(sent.fee > estimated_fee);
        assert_eq!(2, crypto.signatures());
        assert_eq!(1, gateway.submitted().len());
        assert_eq!(Some(Status::Accepted), status.last());
        assert!(logs_contain("selecting again"));
    }

    #[apply(shared_tokio_runtime)]
    async fn fee_that_never_settles_gives_up() {
        let gateway = Arc::new(MemoryGateway::new().with_decoys("0", decoys(10, 100, true)));
        // every signature grows by more than the previous fee paid for.
        let crypto = Arc::new(FakeCrypto {
            growth_per_signature: 4096,
            extra_signed_bytes: 1024,
            ..Default::default()
        });
        let initiator = TransactionInitiator::new(
            gateway.clone(),
            crypto.clone(),
            SendConfig::default()
                .with_mixin(Mixin::new(5))
                .with_max_fee_attempts(3),
            sender(),
        );
        let request = SendRequest::new(DESTINATION_ADDRESS, Amount::coins(1));
        let outs = vec![rct_output(Amount::coins(2), 1)];
        let fund_targets = initiator
            .get_fund_targets_and_fee(&request, outs.clone(), fee_per_kb(), &())
            .unwrap();

        let status = StatusLog::new();
        let error = initiator
            .create_tx_and_attempt_to_send(&request, fund_targets, outs, &status)
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            SendError::Tx(CreateTxError::FeeDidNotConverge { attempts: 3, .. })
        ));
        assert_eq!(ErrorKind::ConstructionInconsistency, error.kind());
        assert_eq!(3, crypto.signatures());
        assert!(gateway.submitted().is_empty());
        assert_eq!(Some(Status::Failed), status.last());
    }

    #[apply(shared_tokio_runtime)]
    async fn decoy_transport_failure_is_gateway_error() {
        let gateway = Arc::new(MemoryGateway::new());
        gateway.fail_random_outputs_with(GatewayError::Transport("refused".into()));
        let initiator = initiator(gateway.clone(), Arc::new(FakeCrypto::default()), 5);
        let request = SendRequest::new(DESTINATION_ADDRESS, Amount::coins(1));
        let outs = vec![rct_output(Amount::coins(2), 1)];
        let fund_targets = initiator
            .get_fund_targets_and_fee(&request, outs.clone(), fee_per_kb(), &())
            .unwrap();

        let status = StatusLog::new();
        let error = initiator
            .create_tx_and_attempt_to_send(&request, fund_targets, outs, &status)
            .await
            .unwrap_err();

        assert_eq!(ErrorKind::Gateway, error.kind());
        assert_eq!(Some(Status::Failed), status.last());
        assert!(!gateway
            .calls()
            .iter()
            .any(|c| matches!(c, GatewayCall::SubmitRawTx { .. })));
    }

    #[apply(shared_tokio_runtime)]
    async fn integrated_payment_id_is_reported() {
        let gateway = Arc::new(MemoryGateway::new().with_decoys("0", decoys(10, 100, true)));
        let initiator = initiator(gateway, Arc::new(FakeCrypto::default()), 5);
        let address = format!("{DESTINATION_ADDRESS}+0102030405060708");
        let request = SendRequest::new(address.as_str(), Amount::coins(1));
        let outs = vec![rct_output(Amount::coins(2), 1)];
        let fund_targets = initiator
            .get_fund_targets_and_fee(&request, outs.clone(), fee_per_kb(), &())
            .unwrap();

        let sent = initiator
            .create_tx_and_attempt_to_send(&request, fund_targets, outs, &())
            .await
            .unwrap();
        assert_eq!(Some(PaymentId::Short([1, 2, 3, 4, 5, 6, 7, 8])), sent.payment_id);
        assert_eq!(address, sent.target_address);
    }
}
