use serde::Deserialize;
use serde::Serialize;

use crate::crypto::DecodedAddress;
use crate::models::unspent_output::total_amount;
use crate::models::unspent_output::UnspentOutput;
use crate::protocol::amount::Amount;
use crate::protocol::fee::FeeQuote;

/// outputs chosen for spending, in the order they were selected.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectedOutputSet(Vec<UnspentOutput>);

impl SelectedOutputSet {
    /// `None` if the amounts overflow.
    pub fn total(&self) -> Option<Amount> {
        total_amount(&self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UnspentOutput> {
        self.0.iter()
    }

    pub fn last(&self) -> Option<&UnspentOutput> {
        self.0.last()
    }

    pub(crate) fn push(&mut self, output: UnspentOutput) {
        self.0.push(output);
    }
}

impl From<Vec<UnspentOutput>> for SelectedOutputSet {
    fn from(outputs: Vec<UnspentOutput>) -> Self {
        Self(outputs)
    }
}

impl From<SelectedOutputSet> for Vec<UnspentOutput> {
    fn from(set: SelectedOutputSet) -> Self {
        set.0
    }
}

impl<'a> IntoIterator for &'a SelectedOutputSet {
    type Item = &'a UnspentOutput;
    type IntoIter = std::slice::Iter<'a, UnspentOutput>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// a destination amount paired with the destination's public keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTarget {
    pub address: String,
    pub keys: DecodedAddress,
    pub amount: Amount,
    pub is_change: bool,
}

/// result of input selection: what gets spent, where it goes and the fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundTargets {
    /// destination first, then change if any.
    pub fund_targets: Vec<ParsedTarget>,
    pub final_fee: Amount,
    pub using_outs: SelectedOutputSet,
    pub sending_amount: Amount,
    pub change_amount: Amount,
    pub fee_quote: FeeQuote,
    pub is_sweeping: bool,
}

impl FundTargets {
    pub fn destination(&self) -> Option<&ParsedTarget> {
        self.fund_targets.iter().find(|t| !t.is_change)
    }

    pub fn change(&self) -> Option<&ParsedTarget> {
        self.fund_targets.iter().find(|t| t.is_change)
    }
}
