//! Money amounts and VAT rates.
//!
//! Amounts are integer minor units (cents). VAT rates are basis points, so 20% is
//! `VatRate::from_basis_points(2000)`. All arithmetic stays in integers; rounding
//! only happens when a rate is applied.

use core::iter::Sum;
use core::ops::{Add, AddAssign, Sub};

use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// Amount in minor currency units.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Whole currency units (e.g. `from_major(10)` is 10.00).
    pub fn from_major(major: i64) -> Self {
        Self(major.saturating_mul(100))
    }

    pub fn minor(&self) -> i64 {
        self.0
    }

    /// Line total: unit price times quantity.
    pub fn times(self, quantity: i64) -> Self {
        Self(self.0.saturating_mul(quantity))
    }

    /// Share of this amount at `rate`, rounded half away from zero.
    pub fn at_rate(self, rate: VatRate) -> Self {
        let scaled = i128::from(self.0) * i128::from(rate.basis_points());
        let half = if scaled >= 0 { 5_000 } else { -5_000 };
        let rounded = (scaled + half) / 10_000;
        Self(i64::try_from(rounded).unwrap_or(if rounded > 0 { i64::MAX } else { i64::MIN }))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl ValueObject for Money {}

/// VAT rate in basis points (1/100 of a percent).
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct VatRate(u32);

impl VatRate {
    pub const ZERO: VatRate = VatRate(0);

    pub fn from_basis_points(bp: u32) -> Self {
        Self(bp)
    }

    pub fn from_percent(percent: u32) -> Self {
        Self(percent.saturating_mul(100))
    }

    pub fn basis_points(&self) -> u32 {
        self.0
    }
}

impl ValueObject for VatRate {}
