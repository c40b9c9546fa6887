use clap::builder::TypedValueParser;
use clap::ArgAction;
use clap::Parser;
use serde::Deserialize;
use serde::Serialize;

use super::fee_priority::FeePriorityTable;
use super::network::Network;
use crate::api::tx_initiation::builder::input_selector::InputSelectionPolicy;
use crate::api::tx_initiation::builder::input_selector::InputSelectionPriority;
use crate::api::tx_initiation::builder::input_selector::SortOrder;
use crate::protocol::amount::Amount;
use crate::protocol::mixin::Mixin;

/// Settings that shape every send.
///
/// The fee rate is not configured here: it is fetched from the gateway for
/// each send.
#[derive(Parser, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SendConfig {
    /// Network whose address format destinations must use.
    #[clap(long, default_value = "mainnet")]
    pub network: Network,

    /// Number of decoys per real input. The ring size is one more.
    #[clap(long, default_value = "15")]
    pub mixin: Mixin,

    /// Fee priority, 1 (lowest) through the number of configured multipliers.
    #[clap(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub fee_priority: u32,

    /// Fee multiplier for each priority, comma separated.
    #[clap(long, default_value = "1,4,20,166")]
    pub fee_multipliers: FeePriorityTable,

    /// Non-RingCT outputs below this amount (in XMR) are dust.
    #[clap(long, default_value = "0.002")]
    pub dust_threshold: Amount,

    /// Whether a sweep spends dust outputs too.
    #[clap(long, default_value_t = true, action = ArgAction::Set)]
    pub include_dust_when_sweeping: bool,

    /// Order in which outputs are considered.
    ///
    /// One of `random`, `provided-order`, `amount-ascending`,
    /// `amount-descending`.
    #[clap(long, default_value = "random", value_parser = parse_selection_priority)]
    pub input_selection: InputSelectionPriority,

    /// Build RingCT transactions.
    #[clap(long, default_value_t = true, action = ArgAction::Set)]
    pub ringct: bool,

    /// Give up when the signed transaction still needs a higher fee after
    /// this many attempts.
    #[clap(long, default_value = "5", value_parser = clap::value_parser!(u16).range(1..).map(usize::from))]
    pub max_fee_attempts: usize,
}

impl Default for SendConfig {
    fn default() -> Self {
        let empty: Vec<String> = vec![];
        Self::parse_from(empty)
    }
}

fn parse_selection_priority(s: &str) -> Result<InputSelectionPriority, String> {
    match s {
        "random" => Ok(InputSelectionPriority::Random),
        "provided-order" => Ok(InputSelectionPriority::ByProvidedOrder),
        "amount-ascending" => Ok(InputSelectionPriority::ByAmount(SortOrder::Ascending)),
        "amount-descending" => Ok(InputSelectionPriority::ByAmount(SortOrder::Descending)),
        _ => Err(format!("unknown input selection '{s}'")),
    }
}

impl SendConfig {
    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    pub fn with_mixin(mut self, mixin: Mixin) -> Self {
        self.mixin = mixin;
        self
    }

    pub fn with_fee_priority(mut self, fee_priority: u32) -> Self {
        self.fee_priority = fee_priority;
        self
    }

    pub fn with_fee_multipliers(mut self, fee_multipliers: FeePriorityTable) -> Self {
        self.fee_multipliers = fee_multipliers;
        self
    }

    pub fn with_dust_threshold(mut self, dust_threshold: Amount) -> Self {
        self.dust_threshold = dust_threshold;
        self
    }

    pub fn with_include_dust_when_sweeping(mut self, include: bool) -> Self {
        self.include_dust_when_sweeping = include;
        self
    }

    pub fn with_input_selection(mut self, priority: InputSelectionPriority) -> Self {
        self.input_selection = priority;
        self
    }

    pub fn with_ringct(mut self, ringct: bool) -> Self {
        self.ringct = ringct;
        self
    }

    pub fn with_max_fee_attempts(mut self, attempts: usize) -> Self {
        self.max_fee_attempts = attempts;
        self
    }

    /// the input selection policy these settings describe.
    pub fn input_selection_policy(&self) -> InputSelectionPolicy {
        InputSelectionPolicy::from(self.input_selection)
            .dust_threshold(self.dust_threshold)
            .include_dust_when_sweeping(self.include_dust_when_sweeping)
    }
}
