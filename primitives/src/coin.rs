use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use thiserror::Error;

#[cfg(feature = "serde-derive")]
use serde::{Deserialize, Serialize};

/// Non-negative integer quanta of the base coin.
///
/// Mirrors the teacher's `nimiq_primitives::coin::Coin`: a `u64` newtype
/// with checked, non-wrapping arithmetic so that an overflowing sum of
/// pending amounts is a catchable error rather than silent wraparound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde-derive", derive(Serialize, Deserialize))]
pub struct Coin(u64);

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CoinError {
    #[error("coin arithmetic overflowed")]
    Overflow,
    #[error("coin arithmetic underflowed")]
    Underflow,
}

impl Coin {
    pub const ZERO: Coin = Coin(0);

    pub const fn from_u64(value: u64) -> Self {
        Coin(value)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }

    pub fn checked_add(self, other: Coin) -> Result<Coin, CoinError> {
        self.0
            .checked_add(other.0)
            .map(Coin)
            .ok_or(CoinError::Overflow)
    }

    pub fn checked_sub(self, other: Coin) -> Result<Coin, CoinError> {
        self.0
            .checked_sub(other.0)
            .map(Coin)
            .ok_or(CoinError::Underflow)
    }
}

impl Add for Coin {
    type Output = Coin;

    fn add(self, rhs: Coin) -> Coin {
        self.checked_add(rhs).expect("coin addition overflowed")
    }
}

impl AddAssign for Coin {
    fn add_assign(&mut self, rhs: Coin) {
        *self = *self + rhs;
    }
}

impl Sub for Coin {
    type Output = Coin;

    fn sub(self, rhs: Coin) -> Coin {
        self.checked_sub(rhs).expect("coin subtraction underflowed")
    }
}

impl SubAssign for Coin {
    fn sub_assign(&mut self, rhs: Coin) {
        *self = *self - rhs;
    }
}

impl Sum for Coin {
    fn sum<I: Iterator<Item = Coin>>(iter: I) -> Self {
        iter.fold(Coin::ZERO, |acc, c| acc + c)
    }
}

impl From<u64> for Coin {
    fn from(value: u64) -> Self {
        Coin(value)
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_add_overflows() {
        let max = Coin::from_u64(u64::MAX);
        assert_eq!(max.checked_add(Coin::from_u64(1)), Err(CoinError::Overflow));
    }

    #[test]
    fn checked_sub_underflows() {
        assert_eq!(
            Coin::ZERO.checked_sub(Coin::from_u64(1)),
            Err(CoinError::Underflow)
        );
    }

    #[test]
    fn sum_adds_up() {
        let coins = vec![Coin::from_u64(1), Coin::from_u64(2), Coin::from_u64(3)];
        assert_eq!(coins.into_iter().sum::<Coin>(), Coin::from_u64(6));
    }
}
