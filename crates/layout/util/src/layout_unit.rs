//! Sub-pixel lengths as 1/64px fixed-point values.
//!
//! Column balancing repeatedly divides content spans by column counts and
//! compares the results; doing that in `f32` accumulates error and makes
//! "did the height actually change" checks unreliable. All offsets and
//! heights in the layout crates are therefore `LayoutUnit`s: an `i64` raw
//! value with 6 fractional bits.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};

/// A length in 1/64px units.
///
/// `LayoutUnit::MAX` doubles as the "no value recorded" sentinel for
/// space-shortage bookkeeping; arithmetic that could run past it saturates
/// instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct LayoutUnit(i64);

impl LayoutUnit {
    /// Number of fractional bits (1/64px precision).
    pub const FRACTIONAL_BITS: u32 = 6;

    /// Scale factor between raw units and whole pixels.
    pub const SCALE: i64 = 1 << Self::FRACTIONAL_BITS;

    /// Zero length.
    pub const ZERO: Self = Self(0);

    /// One pixel.
    pub const ONE_PX: Self = Self(Self::SCALE);

    /// Largest representable length; used as the "unset" sentinel.
    pub const MAX: Self = Self(i64::MAX);

    /// Build from a raw 1/64px value.
    #[inline]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Build from fractional pixels, rounding to the nearest 1/64px.
    #[inline]
    pub fn from_px(pixels: f64) -> Self {
        Self((pixels * Self::SCALE as f64).round() as i64)
    }

    /// Build from whole pixels.
    #[inline]
    pub const fn from_px_i64(pixels: i64) -> Self {
        Self(pixels * Self::SCALE)
    }

    /// Raw 1/64px value.
    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Convert to fractional pixels.
    #[inline]
    pub const fn to_px(self) -> f64 {
        self.0 as f64 / Self::SCALE as f64
    }

    /// Convert to whole pixels, rounding down.
    #[inline]
    pub const fn to_px_floor(self) -> i64 {
        self.0 >> Self::FRACTIONAL_BITS
    }

    /// Convert to whole pixels, rounding up.
    #[inline]
    pub const fn to_px_ceil(self) -> i64 {
        (self.0 + Self::SCALE - 1) >> Self::FRACTIONAL_BITS
    }

    /// True if this is the `MAX` sentinel.
    #[inline]
    pub const fn is_max(self) -> bool {
        self.0 == i64::MAX
    }

    /// Divide by a positive count, rounding toward +infinity.
    ///
    /// This is the "height of each of N columns covering this span"
    /// operation; rounding down instead would make the N columns fall
    /// short of the span by up to N raw units.
    #[inline]
    pub const fn div_ceil_by(self, count: u32) -> Self {
        let divisor = count as i64;
        if divisor <= 0 {
            return self;
        }
        Self(self.0.div_euclid(divisor) + if self.0.rem_euclid(divisor) > 0 { 1 } else { 0 })
    }

    /// Number of times `unit` fits in this length, rounded up and floored
    /// at the given minimum. Zero or negative `unit` yields the minimum.
    #[inline]
    pub const fn count_units_ceil(self, unit: Self, minimum: u32) -> u32 {
        if unit.0 <= 0 {
            return minimum;
        }
        let quotient = self.0.div_euclid(unit.0);
        let count = quotient + if self.0.rem_euclid(unit.0) > 0 { 1 } else { 0 };
        if count < minimum as i64 { minimum } else { count as u32 }
    }

    /// Addition that pins at `MAX` rather than wrapping.
    #[inline]
    #[must_use]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Add for LayoutUnit {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for LayoutUnit {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for LayoutUnit {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for LayoutUnit {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Mul<i64> for LayoutUnit {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: i64) -> Self {
        Self(self.0 * rhs)
    }
}

impl Mul<u32> for LayoutUnit {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: u32) -> Self {
        Self(self.0 * i64::from(rhs))
    }
}

impl Div<i64> for LayoutUnit {
    type Output = Self;

    #[inline]
    fn div(self, rhs: i64) -> Self {
        Self(self.0.div_euclid(rhs))
    }
}

impl Div<u32> for LayoutUnit {
    type Output = Self;

    #[inline]
    fn div(self, rhs: u32) -> Self {
        Self(self.0.div_euclid(i64::from(rhs)))
    }
}

impl Sum for LayoutUnit {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for LayoutUnit {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_max() {
            return write!(formatter, "max");
        }
        write!(formatter, "{}px", self.to_px())
    }
}
