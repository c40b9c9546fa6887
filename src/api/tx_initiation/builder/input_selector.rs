//! provides a builder and related types for selecting which outputs to spend
//! in a transaction in order to cover the target amount plus the fee.
//!
//! The fee depends on the size of the transaction, which depends on the
//! number of inputs, which depends on the fee. [InputSelector::build()]
//! resolves this with a bounded fixed-point loop:
//!
//! ```text
//!   Selecting ---- total >= amount + fee ----> Recomputing
//!       |  ^                                       |
//!       |  +------- fee grew with inputs ----------+
//!       |                                          |
//!   out of outputs                          fee unchanged
//!       v                                          v
//!   Exhausted                                  Converged
//! ```
//!
//! Each pass through `Selecting` either adds an output or ends in
//! `Exhausted`, so the loop terminates after at most one pass per candidate.
//!
//! Sweeps select every eligible output and compute the fee once.
//!
//! see [builder](super) for examples of using the builders together.
use itertools::Itertools;
use num_traits::CheckedAdd;
use num_traits::CheckedSub;
use num_traits::Zero;
use rand::rng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde::Serialize;

use crate::api::tx_initiation::error::CreateTxError;
use crate::api::tx_initiation::status::Status;
use crate::api::tx_initiation::status::StatusSink;
use crate::config_models::fee_priority::FeePriorityTable;
use crate::models::fund_targets::SelectedOutputSet;
use crate::models::unspent_output::total_amount;
use crate::models::unspent_output::UnspentOutput;
use crate::protocol::amount::Amount;
use crate::protocol::fee::estimate_fee;
use crate::protocol::fee::FeeQuote;
use crate::protocol::fee::OUTPUTS_SWEEP;
use crate::protocol::fee::OUTPUTS_WITH_CHANGE;
use crate::protocol::mixin::Mixin;

/// default dust threshold in piconero.
pub const DEFAULT_DUST_THRESHOLD: Amount = Amount::from_piconero(2_000_000_000);

/// defines sort ordering: ascending or descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    /// ascending order
    Ascending,
    /// descending order
    Descending,
}

/// Defines a strategy for prioritizing some outputs over others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum InputSelectionPriority {
    /// choose outputs at random
    #[default]
    Random,

    /// Use the order in which the outputs are given to the algorithm.
    ByProvidedOrder,

    /// choose outputs by amount in specified sort order.
    ByAmount(SortOrder),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSelectionPolicy {
    priority: InputSelectionPriority,

    /// non-RingCT outputs below this amount are dust.
    dust_threshold: Amount,

    /// whether a sweep also spends dust.
    include_dust_when_sweeping: bool,
}

impl Default for InputSelectionPolicy {
    fn default() -> Self {
        Self {
            priority: Default::default(),
            dust_threshold: DEFAULT_DUST_THRESHOLD,
            include_dust_when_sweeping: true,
        }
    }
}

impl From<InputSelectionPriority> for InputSelectionPolicy {
    fn from(priority: InputSelectionPriority) -> Self {
        Self {
            priority,
            ..Default::default()
        }
    }
}

impl InputSelectionPolicy {
    pub fn prioritize(mut self, priority: InputSelectionPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn dust_threshold(mut self, dust_threshold: Amount) -> Self {
        self.dust_threshold = dust_threshold;
        self
    }

    pub fn include_dust_when_sweeping(mut self, include: bool) -> Self {
        self.include_dust_when_sweeping = include;
        self
    }
}

/// outcome of a successful selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSelection {
    pub selected: SelectedOutputSet,
    pub fee: FeeQuote,

    /// amount paid to the destination.
    pub sending_amount: Amount,

    /// amount returned to the sender. always zero for sweeps.
    pub change_amount: Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectionState {
    Selecting,
    Recomputing,
    Converged,
    Exhausted,
}

/// a builder to select transaction inputs from the sender's unspent outputs
/// based on an [InputSelectionPolicy].
#[derive(Debug)]
pub struct InputSelector {
    // note: all fields intentionally private
    candidates: Vec<UnspentOutput>,
    policy: InputSelectionPolicy,
    spend_amount: Amount,
    sweeping: bool,
    ringct: bool,
    mixin: Mixin,
    fee_priority: u32,
    fee_per_kb: Amount,
    fee_table: FeePriorityTable,
    minimum_fee: Amount,
}

impl Default for InputSelector {
    fn default() -> Self {
        Self {
            candidates: vec![],
            policy: Default::default(),
            spend_amount: Amount::zero(),
            sweeping: false,
            ringct: true,
            mixin: Default::default(),
            fee_priority: 1,
            fee_per_kb: Amount::zero(),
            fee_table: Default::default(),
            minimum_fee: Amount::zero(),
        }
    }
}

impl InputSelector {
    /// instantiate
    pub fn new() -> Self {
        Default::default()
    }

    /// set the sender's unspent outputs
    pub fn candidates(mut self, outputs: Vec<UnspentOutput>) -> Self {
        self.candidates = outputs;
        self
    }

    /// set an input selection policy
    pub fn policy<IntoPolicy>(mut self, policy: IntoPolicy) -> Self
    where
        InputSelectionPolicy: From<IntoPolicy>,
    {
        self.policy = policy.into();
        self
    }

    /// set the amount to send, excluding fee. ignored when sweeping.
    pub fn spend_amount(mut self, spend_amount: Amount) -> Self {
        self.spend_amount = spend_amount;
        self
    }

    pub fn sweeping(mut self, sweeping: bool) -> Self {
        self.sweeping = sweeping;
        self
    }

    /// whether the transaction is RingCT. defaults to true.
    pub fn ringct(mut self, ringct: bool) -> Self {
        self.ringct = ringct;
        self
    }

    pub fn mixin(mut self, mixin: Mixin) -> Self {
        self.mixin = mixin;
        self
    }

    /// set fee priority (1-based) and the table mapping it to a multiplier.
    pub fn fee_priority(mut self, priority: u32, table: FeePriorityTable) -> Self {
        self.fee_priority = priority;
        self.fee_table = table;
        self
    }

    /// set the live fee rate.
    pub fn fee_per_kb(mut self, fee_per_kb: Amount) -> Self {
        self.fee_per_kb = fee_per_kb;
        self
    }

    /// the fee never drops below this floor.
    pub fn minimum_fee(mut self, minimum_fee: Amount) -> Self {
        self.minimum_fee = minimum_fee;
        self
    }

    fn spendable_by_tx_type<'a>(&'a self) -> impl Iterator<Item = &'a UnspentOutput> {
        // a non-RingCT transaction cannot spend RingCT outputs.
        self.candidates
            .iter()
            .filter(move |o| self.ringct || !o.is_ringct())
    }

    fn is_dust(&self, output: &UnspentOutput) -> bool {
        output.is_dust(self.policy.dust_threshold)
    }

    fn prioritize<'a, OutputIter>(&'a self, outputs: OutputIter) -> Vec<&'a UnspentOutput>
    where
        OutputIter: IntoIterator<Item = &'a UnspentOutput>,
    {
        match self.policy.priority {
            InputSelectionPriority::Random => {
                let mut outputs = outputs.into_iter().collect_vec();
                outputs.shuffle(&mut rng());
                outputs
            }
            InputSelectionPriority::ByProvidedOrder => outputs.into_iter().collect_vec(),
            InputSelectionPriority::ByAmount(order) => outputs
                .into_iter()
                .sorted_by(|a, b| sort(order, &a.amount, &b.amount))
                .collect_vec(),
        }
    }

    fn fee_for(&self, num_inputs: usize, num_outputs: usize) -> Result<Amount, CreateTxError> {
        let estimate = estimate_fee(
            self.fee_priority,
            num_inputs.max(1),
            self.mixin,
            num_outputs,
            self.ringct,
            self.fee_per_kb,
            &self.fee_table,
        )?;
        Ok(estimate.max(self.minimum_fee))
    }

    /// select outputs, firing [Status::CalculatingFee] on entry and
    /// [Status::OutputsSelected] on success.
    pub fn build(self, status: &dyn StatusSink) -> Result<InputSelection, CreateTxError> {
        status.report(Status::CalculatingFee);
        let selection = if self.sweeping {
            self.select_all()
        } else {
            self.select_until_covered()
        }?;
        status.report(Status::OutputsSelected);
        Ok(selection)
    }

    fn select_all(&self) -> Result<InputSelection, CreateTxError> {
        let (eligible, excluded): (Vec<_>, Vec<_>) = self
            .spendable_by_tx_type()
            .partition(|o| self.policy.include_dust_when_sweeping || !self.is_dust(o));
        let dust = total_amount(excluded).ok_or(CreateTxError::AmountOverflow)?;

        if eligible.is_empty() {
            return Err(CreateTxError::NoSpendableOutputs);
        }

        let selected: SelectedOutputSet = self
            .prioritize(eligible)
            .into_iter()
            .cloned()
            .collect_vec()
            .into();
        let total = selected.total().ok_or(CreateTxError::AmountOverflow)?;

        // all inputs are known, so the fee is final.
        let fee = self.fee_for(selected.len(), OUTPUTS_SWEEP)?;

        let sending_amount = match total.checked_sub(&fee) {
            Some(sending) if sending.is_positive() => sending,
            _ => {
                tracing::warn!(%total, %fee, "sweep total does not cover the fee");
                return Err(CreateTxError::InsufficientFunds {
                    requested: fee,
                    spendable: total,
                    dust,
                });
            }
        };

        tracing::debug!(
            inputs = selected.len(),
            %total,
            %fee,
            %sending_amount,
            "selected all outputs for sweep"
        );

        Ok(InputSelection {
            selected,
            fee: FeeQuote {
                fee_per_kb: self.fee_per_kb,
                network_fee: fee,
                feeless_total: sending_amount,
            },
            sending_amount,
            change_amount: Amount::zero(),
        })
    }

    fn select_until_covered(&self) -> Result<InputSelection, CreateTxError> {
        if self.spend_amount.is_zero() {
            return Err(CreateTxError::MissingRequirement(
                "spend amount must be positive".to_owned(),
            ));
        }

        let (eligible, dust_outputs): (Vec<_>, Vec<_>) =
            self.spendable_by_tx_type().partition(|o| !self.is_dust(o));
        let dust = total_amount(dust_outputs).ok_or(CreateTxError::AmountOverflow)?;
        let spendable = total_amount(eligible.iter().copied()).ok_or(CreateTxError::AmountOverflow)?;

        if eligible.is_empty() && dust.is_zero() {
            return Err(CreateTxError::NoSpendableOutputs);
        }

        let mut candidates = self.prioritize(eligible).into_iter();
        let mut selected = SelectedOutputSet::default();
        let mut fee = self.fee_for(selected.len(), OUTPUTS_WITH_CHANGE)?;
        let mut state = SelectionState::Selecting;

        loop {
            state = match state {
                SelectionState::Selecting => {
                    let required = self
                        .spend_amount
                        .checked_add(&fee)
                        .ok_or(CreateTxError::FeeOverflow)?;
                    let total = selected.total().ok_or(CreateTxError::AmountOverflow)?;
                    if total >= required {
                        SelectionState::Recomputing
                    } else {
                        match candidates.next() {
                            Some(output) => {
                                selected.push(output.clone());
                                SelectionState::Selecting
                            }
                            None => SelectionState::Exhausted,
                        }
                    }
                }
                SelectionState::Recomputing => {
                    let recomputed = self.fee_for(selected.len(), OUTPUTS_WITH_CHANGE)?;
                    if recomputed > fee {
                        tracing::trace!(%fee, %recomputed, inputs = selected.len(), "fee grew");
                        fee = recomputed;
                        SelectionState::Selecting
                    } else {
                        SelectionState::Converged
                    }
                }
                SelectionState::Converged => break,
                SelectionState::Exhausted => {
                    let requested = self.spend_amount.checked_add(&fee).unwrap_or(self.spend_amount);
                    tracing::warn!(
                        %requested,
                        %spendable,
                        %dust,
                        "insufficient funds"
                    );
                    return Err(CreateTxError::InsufficientFunds {
                        requested,
                        spendable,
                        dust,
                    });
                }
            }
        }

        let total = selected.total().ok_or(CreateTxError::AmountOverflow)?;
        let change_amount = total
            .checked_sub(&self.spend_amount)
            .and_then(|rest| rest.checked_sub(&fee))
            .ok_or_else(|| {
                CreateTxError::ConstructionInconsistency(
                    "selected outputs do not cover amount and fee".to_owned(),
                )
            })?;

        tracing::debug!(
            inputs = selected.len(),
            %total,
            %fee,
            %change_amount,
            "selected outputs"
        );

        Ok(InputSelection {
            selected,
            fee: FeeQuote {
                fee_per_kb: self.fee_per_kb,
                network_fee: fee,
                feeless_total: self.spend_amount,
            },
            sending_amount: self.spend_amount,
            change_amount,
        })
    }
}

fn sort<O: Ord>(order: SortOrder, a: &O, b: &O) -> std::cmp::Ordering {
    match order {
        SortOrder::Ascending => Ord::cmp(a, b),
        SortOrder::Descending => Ord::cmp(b, a),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use proptest::collection::vec;
    use proptest::prelude::*;
    use test_strategy::proptest;
    use tracing_test::traced_test;

    use super::*;
    use crate::api::tx_initiation::status::StatusLog;
    use crate::tests::shared::fee_per_kb;
    use crate::tests::shared::legacy_output;
    use crate::tests::shared::rct_output;

    fn selector(outputs: Vec<UnspentOutput>) -> InputSelector {
        InputSelector::new()
            .candidates(outputs)
            .policy(InputSelectionPriority::ByProvidedOrder)
            .mixin(Mixin::new(5))
            .fee_per_kb(fee_per_kb())
    }

    fn coins(millis: u64) -> Amount {
        Amount::from_piconero(millis * 1_000_000_000)
    }

    #[traced_test]
    #[test]
    fn single_output_covers_target() {
        let log = StatusLog::new();
        let selection = selector(vec![rct_output(coins(1200), 1)])
            .spend_amount(coins(1000))
            .build(&log)
            .unwrap();

        let expected_fee = estimate_fee(
            1,
            1,
            Mixin::new(5),
            OUTPUTS_WITH_CHANGE,
            true,
            fee_per_kb(),
            &FeePriorityTable::default(),
        )
        .unwrap();

        assert_eq!(1, selection.selected.len());
        assert_eq!(expected_fee, selection.fee.network_fee);
        assert_eq!(coins(1000), selection.sending_amount);
        assert_eq!(coins(1200) - coins(1000) - expected_fee, selection.change_amount);
        assert_eq!(
            vec![Status::CalculatingFee, Status::OutputsSelected],
            log.markers()
        );
    }

    #[test]
    fn adds_outputs_when_fee_grows() {
        // exactly the target, so the fee forces a second input.
        let selection = selector(vec![
            rct_output(coins(1000), 1),
            rct_output(coins(500), 2),
            rct_output(coins(500), 3),
        ])
        .spend_amount(coins(1000))
        .build(&())
        .unwrap();

        assert_eq!(2, selection.selected.len());
        let two_input_fee = estimate_fee(
            1,
            2,
            Mixin::new(5),
            OUTPUTS_WITH_CHANGE,
            true,
            fee_per_kb(),
            &FeePriorityTable::default(),
        )
        .unwrap();
        assert_eq!(two_input_fee, selection.fee.network_fee);
    }

    #[traced_test]
    #[test]
    fn exhausted_outputs_report_insufficient_funds() {
        let log = StatusLog::new();
        let result = selector(vec![rct_output(coins(500), 1)])
            .spend_amount(coins(1000))
            .build(&log);

        assert!(matches!(
            result,
            Err(CreateTxError::InsufficientFunds { spendable, dust, .. })
                if spendable == coins(500) && dust.is_zero()
        ));
        assert!(!log.contains(Status::OutputsSelected));
        assert!(logs_contain("insufficient funds"));
    }

    #[test]
    fn dust_is_reported_but_not_spent() {
        let dust_amount = Amount::from_piconero(1_000_000_000);
        let result = selector(vec![
            legacy_output(coins(500), 1),
            legacy_output(dust_amount, 2),
        ])
        .ringct(false)
        .spend_amount(coins(500))
        .build(&());

        assert!(matches!(
            result,
            Err(CreateTxError::InsufficientFunds { dust, .. }) if dust == dust_amount
        ));
    }

    #[test]
    fn ringct_dust_is_not_dust() {
        let small = Amount::from_piconero(1_000_000_000);
        let selection = selector(vec![rct_output(small, 1), rct_output(coins(2000), 2)])
            .spend_amount(coins(1000))
            .build(&())
            .unwrap();
        assert_eq!(small, selection.selected.iter().next().unwrap().amount);
    }

    #[test]
    fn non_ringct_tx_skips_ringct_outputs() {
        let result = selector(vec![rct_output(coins(5000), 1)])
            .ringct(false)
            .spend_amount(coins(1000))
            .build(&());
        assert_eq!(Err(CreateTxError::NoSpendableOutputs), result);
    }

    #[test]
    fn no_outputs_at_all() {
        assert_eq!(
            Err(CreateTxError::NoSpendableOutputs),
            selector(vec![]).spend_amount(coins(1)).build(&())
        );
        assert_eq!(
            Err(CreateTxError::NoSpendableOutputs),
            selector(vec![]).sweeping(true).build(&())
        );
    }

    #[test]
    fn sweep_takes_everything_including_dust() {
        let dust_amount = Amount::from_piconero(50_000_000_000);
        let outputs = vec![
            legacy_output(coins(500), 1),
            legacy_output(coins(300), 2),
            legacy_output(dust_amount, 3),
        ];
        let selection = selector(outputs)
            .ringct(false)
            .policy(
                InputSelectionPolicy::from(InputSelectionPriority::ByProvidedOrder)
                    .dust_threshold(Amount::from_piconero(60_000_000_000)),
            )
            .sweeping(true)
            .build(&())
            .unwrap();

        let fee = estimate_fee(
            1,
            3,
            Mixin::new(5),
            OUTPUTS_SWEEP,
            false,
            fee_per_kb(),
            &FeePriorityTable::default(),
        )
        .unwrap();
        assert_eq!(3, selection.selected.len());
        assert_eq!(fee, selection.fee.network_fee);
        assert_eq!(coins(850) - fee, selection.sending_amount);
        assert!(selection.change_amount.is_zero());
    }

    #[test]
    fn sweep_can_leave_dust_behind() {
        let selection = selector(vec![
            legacy_output(coins(500), 1),
            legacy_output(Amount::from_piconero(1), 2),
        ])
        .ringct(false)
        .policy(
            InputSelectionPolicy::from(InputSelectionPriority::ByProvidedOrder)
                .include_dust_when_sweeping(false),
        )
        .sweeping(true)
        .build(&())
        .unwrap();
        assert_eq!(1, selection.selected.len());
    }

    #[test]
    fn sweep_smaller_than_fee_fails() {
        let result = selector(vec![rct_output(Amount::from_piconero(10), 1)])
            .sweeping(true)
            .build(&());
        assert!(matches!(result, Err(CreateTxError::InsufficientFunds { .. })));
    }

    #[test]
    fn minimum_fee_is_a_floor() {
        let floor = coins(100);
        let selection = selector(vec![rct_output(coins(2000), 1)])
            .spend_amount(coins(1000))
            .minimum_fee(floor)
            .build(&())
            .unwrap();
        assert_eq!(floor, selection.fee.network_fee);
    }

    #[test]
    fn unknown_priority_is_rejected() {
        let result = selector(vec![rct_output(coins(2000), 1)])
            .spend_amount(coins(1000))
            .fee_priority(9, FeePriorityTable::default())
            .build(&());
        assert!(matches!(result, Err(CreateTxError::InvalidPriority { priority: 9, .. })));
    }

    #[test]
    fn by_amount_descending_prefers_large_outputs() {
        let selection = selector(vec![
            rct_output(coins(300), 1),
            rct_output(coins(3000), 2),
            rct_output(coins(600), 3),
        ])
        .policy(InputSelectionPriority::ByAmount(SortOrder::Descending))
        .spend_amount(coins(1000))
        .build(&())
        .unwrap();
        assert_eq!(1, selection.selected.len());
        assert_eq!(Some(coins(3000)), selection.selected.total());
    }

    #[test]
    fn oversized_output_amounts_are_an_error() {
        let huge = Amount::from_piconero(u64::MAX / 2 + 1);
        let outputs = vec![rct_output(huge, 1), rct_output(huge, 2)];

        assert_eq!(
            Err(CreateTxError::AmountOverflow),
            selector(outputs.clone()).spend_amount(coins(1000)).build(&())
        );
        assert_eq!(
            Err(CreateTxError::AmountOverflow),
            selector(outputs).sweeping(true).build(&())
        );
    }

    #[proptest]
    fn non_sweep_selection_is_sufficient_and_last_output_needed(
        #[strategy(vec(1u64..5_000, 1..12))] millis: Vec<u64>,
        #[strategy(1u64..10_000)] target_millis: u64,
    ) {
        let outputs = millis
            .iter()
            .enumerate()
            .map(|(i, m)| rct_output(coins(*m), i as u64))
            .collect_vec();
        let result = selector(outputs).spend_amount(coins(target_millis)).build(&());

        match result {
            Ok(selection) => {
                let required = coins(target_millis) + selection.fee.network_fee;
                let total = selection.selected.total().unwrap();
                prop_assert!(total >= required);
                let last = selection.selected.last().unwrap().amount;
                prop_assert!(total - last < required);
                prop_assert_eq!(
                    total,
                    selection.sending_amount + selection.fee.network_fee + selection.change_amount
                );
            }
            Err(CreateTxError::InsufficientFunds { spendable, requested, .. }) => {
                prop_assert!(spendable < requested);
            }
            Err(e) => prop_assert!(false, "unexpected error {e}"),
        }
    }

    #[proptest]
    fn sweep_sends_total_minus_fee(#[strategy(vec(1u64..5_000, 1..12))] millis: Vec<u64>) {
        let outputs = millis
            .iter()
            .enumerate()
            .map(|(i, m)| rct_output(coins(*m), i as u64))
            .collect_vec();
        let total = total_amount(&outputs).unwrap();
        let selection = selector(outputs.clone()).sweeping(true).build(&()).unwrap();

        prop_assert_eq!(outputs.len(), selection.selected.len());
        prop_assert_eq!(total - selection.fee.network_fee, selection.sending_amount);
    }
}
