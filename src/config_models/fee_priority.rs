use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use anyhow::ensure;
use itertools::Itertools;
use serde::Deserialize;
use serde::Serialize;

/// default multipliers for priorities 1 (low) through 4 (highest).
pub const DEFAULT_FEE_MULTIPLIERS: [u64; 4] = [1, 4, 20, 166];

/// the priority-to-multiplier policy.
///
/// Priority `n` (1-based) maps to the `n`th multiplier. Multipliers must be
/// non-decreasing so a higher priority never pays less.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u64>", into = "Vec<u64>")]
pub struct FeePriorityTable(Vec<u64>);

impl Default for FeePriorityTable {
    fn default() -> Self {
        Self(DEFAULT_FEE_MULTIPLIERS.to_vec())
    }
}

impl FeePriorityTable {
    pub fn new(multipliers: Vec<u64>) -> anyhow::Result<Self> {
        ensure!(!multipliers.is_empty(), "fee priority table is empty");
        ensure!(
            multipliers.iter().all(|m| *m > 0),
            "fee multipliers must be positive"
        );
        ensure!(
            multipliers.iter().tuple_windows().all(|(a, b)| a <= b),
            "fee multipliers must be non-decreasing: {:?}",
            multipliers
        );
        Ok(Self(multipliers))
    }

    /// multiplier for a 1-based priority, or `None` if out of range.
    pub fn multiplier(&self, priority: u32) -> Option<u64> {
        let index = usize::try_from(priority).ok()?.checked_sub(1)?;
        self.0.get(index).copied()
    }

    pub fn highest_priority(&self) -> u32 {
        u32::try_from(self.0.len()).unwrap_or(u32::MAX)
    }
}

impl TryFrom<Vec<u64>> for FeePriorityTable {
    type Error = anyhow::Error;

    fn try_from(multipliers: Vec<u64>) -> Result<Self, Self::Error> {
        Self::new(multipliers)
    }
}

impl From<FeePriorityTable> for Vec<u64> {
    fn from(table: FeePriorityTable) -> Self {
        table.0
    }
}

impl FromStr for FeePriorityTable {
    type Err = anyhow::Error;

    /// parses a comma separated list such as `1,4,20,166`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let multipliers = s
            .split(',')
            .map(|m| m.trim().parse::<u64>())
            .collect::<Result<Vec<_>, _>>();
        match multipliers {
            Ok(m) => Self::new(m),
            Err(e) => bail!("failed to parse fee priority table {:?}: {}", s, e),
        }
    }
}

impl fmt::Display for FeePriorityTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(","))
    }
}
