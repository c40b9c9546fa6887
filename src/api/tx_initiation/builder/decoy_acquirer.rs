//! fetches decoy outputs for every real input from the gateway.
//!
//! For each selected output `mixin + 1` candidates are requested, so that
//! the real output can be dropped if the gateway happens to return it. A ring
//! is never allowed to shrink: fewer usable candidates than `mixin` is an
//! [InsufficientAnonymitySet](CreateTxError::InsufficientAnonymitySet) error.
use std::collections::BTreeMap;

use itertools::Itertools;

use crate::api::tx_initiation::error::CreateTxError;
use crate::api::tx_initiation::error::SendError;
use crate::gateway::AmountOutputs;
use crate::gateway::RemoteGateway;
use crate::models::decoy_set::DecoySet;
use crate::models::fund_targets::SelectedOutputSet;
use crate::models::unspent_output::OutputId;
use crate::models::unspent_output::UnspentOutput;
use crate::protocol::mixin::Mixin;

/// decoys keyed by the real output they accompany.
pub type DecoyMap = BTreeMap<OutputId, DecoySet>;

pub struct DecoyAcquirer<'a> {
    gateway: &'a dyn RemoteGateway,
}

impl<'a> DecoyAcquirer<'a> {
    pub fn new(gateway: &'a dyn RemoteGateway) -> Self {
        Self { gateway }
    }

    /// fetch decoys for all of `selected`.
    ///
    /// with a mixin of zero no request is made and every set is empty.
    pub async fn fetch(&self, selected: &SelectedOutputSet, mixin: Mixin) -> Result<DecoyMap, SendError> {
        if mixin.decoys() == 0 || selected.is_empty() {
            return Ok(selected.iter().map(|o| (o.id(), DecoySet::default())).collect());
        }

        let amounts = selected.iter().map(|o| o.decoy_amount_key()).collect_vec();
        let count = mixin.request_count();
        tracing::debug!(outputs = amounts.len(), count, "requesting decoys");

        let response = self.gateway.random_outputs(amounts, count).await?;
        let mut entries = response.into_iter();

        let mut decoys = DecoyMap::new();
        for output in selected {
            let set = decoys_for(output, entries.next(), mixin)?;
            decoys.insert(output.id(), set);
        }
        Ok(decoys)
    }
}

fn decoys_for(
    output: &UnspentOutput,
    entry: Option<AmountOutputs>,
    mixin: Mixin,
) -> Result<DecoySet, CreateTxError> {
    let requested = mixin.request_count() as usize;
    let insufficient = |needed: usize, received: usize| {
        tracing::warn!(
            global_index = output.global_index,
            needed,
            received,
            "gateway returned too few decoys"
        );
        CreateTxError::InsufficientAnonymitySet {
            global_index: output.global_index,
            needed,
            received,
        }
    };

    let Some(entry) = entry else {
        return Err(insufficient(requested, 0));
    };

    if !output.is_ringct() && entry.amount != output.decoy_amount_key() {
        tracing::error!(
            requested = %output.decoy_amount_key(),
            returned = %entry.amount,
            "decoy amount mismatch"
        );
        return Err(CreateTxError::ConstructionInconsistency(format!(
            "decoys for amount {} were returned for amount {}",
            output.decoy_amount_key(),
            entry.amount
        )));
    }

    if entry.outputs.len() < requested {
        return Err(insufficient(requested, entry.outputs.len()));
    }

    let members = entry
        .outputs
        .into_iter()
        .filter(|m| m.global_index != output.global_index)
        .unique_by(|m| m.global_index)
        .take(mixin.decoys())
        .collect_vec();

    if members.len() < mixin.decoys() {
        return Err(insufficient(mixin.decoys(), members.len()));
    }

    Ok(DecoySet::new(members))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use macro_rules_attr::apply;
    use tracing_test::traced_test;

    use super::*;
    use crate::gateway::memory::GatewayCall;
    use crate::gateway::memory::MemoryGateway;
    use crate::gateway::GatewayError;
    use crate::models::decoy_set::RingMember;
    use crate::protocol::amount::Amount;
    use crate::tests::shared::decoys;
    use crate::tests::shared::legacy_output;
    use crate::tests::shared::rct_output;
    use crate::tests::shared_tokio_runtime;

    fn selected(outputs: Vec<UnspentOutput>) -> SelectedOutputSet {
        outputs.into()
    }

    #[apply(shared_tokio_runtime)]
    async fn requests_mixin_plus_one_with_amount_keys() {
        let legacy_amount = Amount::from_piconero(5_000_000_000_000);
        let gateway = MemoryGateway::new()
            .with_decoys("0", decoys(6, 100, true))
            .with_decoys("5000000000000", decoys(6, 200, false));
        let set = selected(vec![rct_output(Amount::coins(1), 1), legacy_output(legacy_amount, 2)]);

        let decoys = DecoyAcquirer::new(&gateway).fetch(&set, Mixin::new(5)).await.unwrap();

        assert_eq!(2, decoys.len());
        assert!(decoys.values().all(|d| d.len() == 5));
        assert_eq!(
            vec![GatewayCall::RandomOutputs {
                amounts: vec!["0".into(), "5000000000000".into()],
                count: 6
            }],
            gateway.calls()
        );
    }

    #[apply(shared_tokio_runtime)]
    async fn real_output_is_dropped_from_candidates() {
        let real = rct_output(Amount::coins(1), 103);
        let gateway = MemoryGateway::new().with_decoys("0", decoys(6, 100, true));

        let decoys = DecoyAcquirer::new(&gateway)
            .fetch(&selected(vec![real.clone()]), Mixin::new(5))
            .await
            .unwrap();

        let set = &decoys[&real.id()];
        assert_eq!(5, set.len());
        assert!(!set.contains_global_index(103));
    }

    #[traced_test]
    #[apply(shared_tokio_runtime)]
    async fn too_few_candidates_fail() {
        let gateway = MemoryGateway::new().with_decoys("0", decoys(3, 100, true));

        let result = DecoyAcquirer::new(&gateway)
            .fetch(&selected(vec![rct_output(Amount::coins(1), 1)]), Mixin::new(5))
            .await;

        assert_eq!(
            Err(SendError::Tx(CreateTxError::InsufficientAnonymitySet {
                global_index: 1,
                needed: 6,
                received: 3
            })),
            result
        );
        assert!(logs_contain("too few decoys"));
    }

    #[apply(shared_tokio_runtime)]
    async fn duplicates_cannot_fill_a_ring() {
        let duplicate = decoys(1, 100, true).remove(0);
        let pool: Vec<RingMember> = vec![duplicate; 6];
        let gateway = MemoryGateway::new().with_decoys("0", pool);

        let result = DecoyAcquirer::new(&gateway)
            .fetch(&selected(vec![rct_output(Amount::coins(1), 1)]), Mixin::new(5))
            .await;
        assert!(matches!(
            result,
            Err(SendError::Tx(CreateTxError::InsufficientAnonymitySet { needed: 5, received: 1, .. }))
        ));
    }

    #[apply(shared_tokio_runtime)]
    async fn missing_entry_fails() {
        let gateway = MemoryGateway::new().with_decoys("0", decoys(6, 100, true));
        let legacy = legacy_output(Amount::coins(1), 1);

        // no pool for the legacy amount: the gateway returns an empty entry.
        let result = DecoyAcquirer::new(&gateway)
            .fetch(&selected(vec![legacy]), Mixin::new(5))
            .await;
        assert!(matches!(
            result,
            Err(SendError::Tx(CreateTxError::InsufficientAnonymitySet { received: 0, .. }))
        ));
    }

    #[test]
    fn mismatched_amount_is_inconsistent() {
        let legacy = legacy_output(Amount::coins(1), 1);
        let entry = AmountOutputs {
            amount: "42".into(),
            outputs: decoys(6, 100, false),
        };
        assert!(matches!(
            decoys_for(&legacy, Some(entry), Mixin::new(5)),
            Err(CreateTxError::ConstructionInconsistency(_))
        ));
    }

    #[apply(shared_tokio_runtime)]
    async fn gateway_failure_is_propagated() {
        let gateway = MemoryGateway::new();
        gateway.fail_random_outputs_with(GatewayError::Transport("down".into()));

        let result = DecoyAcquirer::new(&gateway)
            .fetch(&selected(vec![rct_output(Amount::coins(1), 1)]), Mixin::new(5))
            .await;
        assert_eq!(Err(SendError::Gateway(GatewayError::Transport("down".into()))), result);
    }

    #[apply(shared_tokio_runtime)]
    async fn mixin_zero_makes_no_request() {
        let gateway = MemoryGateway::new();
        let decoys = DecoyAcquirer::new(&gateway)
            .fetch(&selected(vec![rct_output(Amount::coins(1), 1)]), Mixin::new(0))
            .await
            .unwrap();
        assert_eq!(1, decoys.len());
        assert!(decoys.values().all(|d| d.is_empty()));
        assert!(gateway.calls().is_empty());
    }
}
