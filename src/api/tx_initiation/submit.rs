//! hands a signed transaction to the gateway and classifies the outcome.
//!
//! ```text
//!   Built -> Submitting -+-> Accepted
//!                        +-> Rejected        gateway refused the tx
//!                        +-> UnknownFailure  anything else
//! ```
//!
//! `UnknownFailure` is deliberately ambiguous: the transaction may or may not
//! have reached the network. Nothing here retries.
use serde::Deserialize;
use serde::Serialize;

use crate::api::tx_initiation::error::SendError;
use crate::gateway::GatewayError;
use crate::gateway::RemoteGateway;
use crate::models::transaction::SignedTransaction;
use crate::protocol::keys::SecretKey;
use crate::protocol::keys::TxHash;

/// outcome of one submit call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxSubmissionResult {
    Accepted { tx_hash: TxHash },
    Rejected { reason: String },
    Unknown { reason: String },
}

impl TxSubmissionResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    pub fn into_result(self) -> Result<TxHash, SendError> {
        match self {
            Self::Accepted { tx_hash } => Ok(tx_hash),
            Self::Rejected { reason } => Err(SendError::SubmissionRejected { reason }),
            Self::Unknown { reason } => Err(SendError::SubmissionUnknown { reason }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
enum SubmissionState {
    Built,
    Submitting,
    Accepted,
    Rejected,
    UnknownFailure,
}

pub struct TxSubmitter<'a> {
    gateway: &'a dyn RemoteGateway,
}

impl<'a> TxSubmitter<'a> {
    pub fn new(gateway: &'a dyn RemoteGateway) -> Self {
        Self { gateway }
    }

    pub async fn submit(
        &self,
        address: &str,
        view_key: &SecretKey,
        signed: &SignedTransaction,
    ) -> TxSubmissionResult {
        let tx_hash = signed.tx_hash;
        let mut state = SubmissionState::Built;
        tracing::debug!(%tx_hash, %state, size = signed.size(), "submission");

        state = SubmissionState::Submitting;
        tracing::debug!(%tx_hash, %state, "submission");
        let response = self
            .gateway
            .submit_raw_tx(address, view_key, &signed.serialized_hex())
            .await;

        match response {
            Ok(_) => {
                state = SubmissionState::Accepted;
                tracing::info!(%tx_hash, %state, "transaction accepted");
                TxSubmissionResult::Accepted { tx_hash }
            }
            Err(GatewayError::Rejected { reason }) => {
                state = SubmissionState::Rejected;
                tracing::warn!(%tx_hash, %state, %reason, "transaction rejected");
                TxSubmissionResult::Rejected { reason }
            }
            Err(e) => {
                state = SubmissionState::UnknownFailure;
                tracing::warn!(
                    %tx_hash,
                    %state,
                    "submission outcome unknown: {e}. check transaction history before retrying"
                );
                TxSubmissionResult::Unknown {
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use macro_rules_attr::apply;
    use tracing_test::traced_test;

    use super::*;
    use crate::gateway::memory::MemoryGateway;
    use crate::tests::shared_tokio_runtime;

    fn signed() -> SignedTransaction {
        SignedTransaction {
            tx_hash: TxHash([7; 32]),
            tx_key: SecretKey::new([8; 32]),
            serialized: vec![1, 2, 3],
        }
    }

    async fn submit_with(failure: Option<GatewayError>) -> (TxSubmissionResult, MemoryGateway) {
        let gateway = MemoryGateway::new();
        if let Some(e) = failure {
            gateway.fail_submit_with(e);
        }
        let result = TxSubmitter::new(&gateway)
            .submit("4abc", &SecretKey::new([1; 32]), &signed())
            .await;
        (result, gateway)
    }

    #[traced_test]
    #[apply(shared_tokio_runtime)]
    async fn accepted() {
        let (result, gateway) = submit_with(None).await;
        assert_eq!(TxSubmissionResult::Accepted { tx_hash: TxHash([7; 32]) }, result);
        assert_eq!(vec!["010203".to_owned()], gateway.submitted());
        assert!(logs_contain("transaction accepted"));
    }

    #[apply(shared_tokio_runtime)]
    async fn explicit_rejection() {
        let (result, _) = submit_with(Some(GatewayError::Rejected {
            reason: "double spend".into(),
        }))
        .await;
        assert_eq!(
            Err(SendError::SubmissionRejected {
                reason: "double spend".into()
            }),
            result.into_result()
        );
    }

    #[apply(shared_tokio_runtime)]
    async fn transport_failure_is_unknown_and_not_retried() {
        let (result, gateway) = submit_with(Some(GatewayError::Transport("reset".into()))).await;
        assert!(matches!(result, TxSubmissionResult::Unknown { .. }));
        assert!(matches!(
            result.into_result(),
            Err(SendError::SubmissionUnknown { .. })
        ));
        assert_eq!(1, gateway.submit_attempts());
    }

    #[apply(shared_tokio_runtime)]
    async fn http_error_is_unknown() {
        let (result, _) = submit_with(Some(GatewayError::Status {
            status: 503,
            body: String::new(),
        }))
        .await;
        assert!(matches!(result, TxSubmissionResult::Unknown { .. }));
    }
}
