use std::fmt::Display;
use std::ops::Add;
use std::ops::AddAssign;
use std::ops::Sub;
use std::str::FromStr;
use std::sync::LazyLock;

use num_traits::CheckedAdd;
use num_traits::CheckedSub;
use num_traits::Zero;
use regex::Regex;
use serde::Deserialize;
use serde::Serialize;

/// Number of decimal places of one whole coin.
pub const DISPLAY_DECIMALS: u32 = 12;

const PICONERO_PER_COIN: u64 = 10u64.pow(DISPLAY_DECIMALS);

static AMOUNT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<whole>[0-9]+)(\.(?P<frac>[0-9]{0,12}))?$").expect("amount regex is valid")
});

/// Records an amount of coins in atomic units (piconero).
///
/// 1 coin = 10^12 piconero. Amounts are never negative; arithmetic that could
/// leave the `u64` range goes through [CheckedAdd] and [CheckedSub].
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub const fn from_piconero(piconero: u64) -> Self {
        Self(piconero)
    }

    pub const fn to_piconero(self) -> u64 {
        self.0
    }

    /// Create an amount of the given number of whole coins.
    ///
    /// # Panics
    ///
    /// Panics on overflow; only meant for constants and tests.
    pub const fn coins(num_whole_coins: u32) -> Self {
        Self(num_whole_coins as u64 * PICONERO_PER_COIN)
    }

    /// Multiply by a non-negative factor, `None` on overflow.
    pub fn checked_scalar_mul(self, factor: u64) -> Option<Self> {
        self.0.checked_mul(factor).map(Self)
    }

    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Sum of `amounts`, `None` if it does not fit in a `u64`.
    pub fn checked_sum(amounts: impl IntoIterator<Item = Self>) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Self::zero(), |acc, x| acc.checked_add(&x))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let whole = self.0 / PICONERO_PER_COIN;
        let frac = self.0 % PICONERO_PER_COIN;
        if frac == 0 {
            return write!(f, "{whole}");
        }
        let frac = format!("{:0width$}", frac, width = DISPLAY_DECIMALS as usize);
        write!(f, "{whole}.{}", frac.trim_end_matches('0'))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseAmountError {
    #[error("not a decimal amount with at most {DISPLAY_DECIMALS} fractional digits: {0:?}")]
    Format(String),

    #[error("amount out of range: {0}")]
    Overflow(String),
}

impl FromStr for Amount {
    type Err = ParseAmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let captures = AMOUNT_REGEX
            .captures(s)
            .ok_or_else(|| ParseAmountError::Format(s.to_owned()))?;

        let overflow = || ParseAmountError::Overflow(s.to_owned());

        let whole: u64 = captures["whole"].parse().map_err(|_| overflow())?;
        let frac = captures.name("frac").map_or("", |m| m.as_str());
        let frac_piconero = if frac.is_empty() {
            0
        } else {
            let padding = DISPLAY_DECIMALS - frac.len() as u32;
            frac.parse::<u64>().map_err(|_| overflow())? * 10u64.pow(padding)
        };

        whole
            .checked_mul(PICONERO_PER_COIN)
            .and_then(|w| w.checked_add(frac_piconero))
            .map(Self)
            .ok_or_else(overflow)
    }
}

impl From<u64> for Amount {
    fn from(piconero: u64) -> Self {
        Self(piconero)
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Amount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl CheckedAdd for Amount {
    fn checked_add(&self, v: &Self) -> Option<Self> {
        self.0.checked_add(v.0).map(Self)
    }
}

impl CheckedSub for Amount {
    fn checked_sub(&self, v: &Self) -> Option<Self> {
        self.0.checked_sub(v.0).map(Self)
    }
}

impl Zero for Amount {
    fn zero() -> Self {
        Self(0)
    }

    fn is_zero(&self) -> bool {
        self.0 == 0
    }
}
