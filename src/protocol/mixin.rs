use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

/// number of decoys accompanying each real input. ring size is `mixin + 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Mixin(u32);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid mixin {0:?}: must be an integer >= 0")]
pub struct InvalidMixin(pub String);

impl Mixin {
    pub const fn new(decoys: u32) -> Self {
        Self(decoys)
    }

    pub const fn decoys(self) -> usize {
        self.0 as usize
    }

    pub const fn ring_size(self) -> usize {
        self.0 as usize + 1
    }

    /// decoys requested from the gateway per real output. one more than
    /// needed so the real output can be dropped if it is returned.
    pub const fn request_count(self) -> u32 {
        self.0.saturating_add(1)
    }
}

impl Default for Mixin {
    fn default() -> Self {
        Self(15)
    }
}

impl TryFrom<i64> for Mixin {
    type Error = InvalidMixin;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .ok()
            .filter(|v| *v < u32::MAX)
            .map(Self)
            .ok_or_else(|| InvalidMixin(value.to_string()))
    }
}

impl From<Mixin> for u32 {
    fn from(mixin: Mixin) -> Self {
        mixin.0
    }
}

impl FromStr for Mixin {
    type Err = InvalidMixin;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s.trim().parse().map_err(|_| InvalidMixin(s.to_owned()))?;
        Self::try_from(value)
    }
}

impl fmt::Display for Mixin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
