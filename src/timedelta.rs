use std::{
    fmt,
    ops::{Add, AddAssign, Mul},
};

use thiserror::Error;
use uom::si::{
    f64::Time,
    time::{day, second},
};

use crate::{
    numeric::{Numeric, SECONDS_PER_DAY},
    tree::{TreeError, TreeNode},
};

/// A time duration stored as days and seconds.
///
/// Like `datetime` deltas, the seconds component is always normalized into
/// `[0, 86_400)`, with overflow and underflow carried into the days
/// component using floor-division semantics. The fields are private so the
/// invariant holds on every construction and arithmetic path:
///
/// ```
/// use cirrus_core::Timedelta;
///
/// let td = Timedelta::<i64>::new(0, -1);
/// assert_eq!(td, Timedelta::new(-1, 86_399));
/// ```
///
/// Using integer leaves is recommended to avoid loss of precision; with
/// `i64` days a `Timedelta` exactly represents durations far beyond any
/// simulation horizon. Array leaf types hold one duration per element for
/// batched computation.
///
/// # Supported arithmetic
///
/// - `Timedelta + Timedelta` and `+=` — component-wise sum, renormalized.
/// - `Timedelta * scalar` and `scalar * Timedelta` — both fields scaled,
///   renormalized.
///
/// No other operator combinations exist at the type level. Engines that
/// resolve operands dynamically use [`checked_add`](Self::checked_add) and
/// [`checked_mul`](Self::checked_mul), which signal the unsupported cases
/// with [`UnsupportedOperand`] instead.
///
/// Equality compares the normalized `(days, seconds)` pairs and delegates
/// to the leaf type, which defines its own semantics for array leaves. No
/// ordering is defined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timedelta<N: Numeric = i64> {
    days: N,
    seconds: N,
}

/// An operand whose type is only known at runtime.
///
/// Used by [`Timedelta::checked_add`] and [`Timedelta::checked_mul`] when
/// the calling engine resolves operands dynamically rather than through
/// the operator traits.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand<N: Numeric = i64> {
    Timedelta(Timedelta<N>),
    Number(N),
}

/// An unsupported operand combination, signaled rather than fatal.
///
/// Callers use this to fall back to their own operand-resolution logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UnsupportedOperand {
    #[error("cannot add a plain number to a Timedelta")]
    AddNumber,

    #[error("cannot multiply two Timedelta values")]
    MulTimedelta,
}

impl<N: Numeric> Timedelta<N> {
    /// Constructs a duration from days and seconds, normalizing the seconds
    /// component into `[0, 86_400)`.
    ///
    /// Normalization uses floor division, so negative seconds borrow from
    /// days rather than truncating toward zero.
    pub fn new(days: N, seconds: N) -> Self {
        let day_length = N::from(SECONDS_PER_DAY);
        let carry = seconds.div_euclid(&day_length);
        let seconds = seconds.rem_euclid(&day_length);
        Self {
            days: days + carry,
            seconds,
        }
    }

    /// The whole-day component.
    pub fn days(&self) -> N {
        self.days.clone()
    }

    /// The seconds component, always in `[0, 86_400)`.
    pub fn seconds(&self) -> N {
        self.seconds.clone()
    }

    /// Consumes the duration and returns its normalized `(days, seconds)`.
    #[must_use]
    pub fn into_parts(self) -> (N, N) {
        (self.days, self.seconds)
    }

    /// Adds a dynamically typed operand.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedOperand::AddNumber`] if `rhs` is a plain number;
    /// there is no implicit coercion from numbers to durations.
    pub fn checked_add(&self, rhs: &Operand<N>) -> Result<Self, UnsupportedOperand> {
        match rhs {
            Operand::Timedelta(other) => Ok(self.clone() + other.clone()),
            Operand::Number(_) => Err(UnsupportedOperand::AddNumber),
        }
    }

    /// Multiplies by a dynamically typed operand.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedOperand::MulTimedelta`] if `rhs` is itself a
    /// duration; only scaling by a plain number is defined.
    pub fn checked_mul(&self, rhs: &Operand<N>) -> Result<Self, UnsupportedOperand> {
        match rhs {
            Operand::Number(factor) => Ok(self.clone() * factor.clone()),
            Operand::Timedelta(_) => Err(UnsupportedOperand::MulTimedelta),
        }
    }
}

impl Timedelta<i64> {
    /// Constructs a duration from a total number of seconds.
    #[must_use]
    pub fn from_seconds(total_seconds: i64) -> Self {
        Self::new(0, total_seconds)
    }

    /// Total duration in seconds.
    #[must_use]
    pub fn total_seconds(&self) -> f64 {
        self.days as f64 * f64::from(SECONDS_PER_DAY) + self.seconds as f64
    }

    /// The duration as a unit-safe [`Time`] quantity.
    #[must_use]
    pub fn as_time(&self) -> Time {
        Time::new::<day>(self.days as f64) + Time::new::<second>(self.seconds as f64)
    }
}

impl Timedelta<f64> {
    /// Total duration in seconds.
    #[must_use]
    pub fn total_seconds(&self) -> f64 {
        self.days * f64::from(SECONDS_PER_DAY) + self.seconds
    }

    /// The duration as a unit-safe [`Time`] quantity.
    #[must_use]
    pub fn as_time(&self) -> Time {
        Time::new::<day>(self.days) + Time::new::<second>(self.seconds)
    }
}

impl<N: Numeric> Default for Timedelta<N> {
    fn default() -> Self {
        Self::new(N::from(0), N::from(0))
    }
}

impl<N: Numeric> Add for Timedelta<N> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.days + rhs.days, self.seconds + rhs.seconds)
    }
}

impl<N: Numeric> AddAssign for Timedelta<N> {
    fn add_assign(&mut self, rhs: Self) {
        *self = self.clone() + rhs;
    }
}

impl<N: Numeric> Mul<N> for Timedelta<N> {
    type Output = Self;

    fn mul(self, rhs: N) -> Self {
        Self::new(self.days * rhs.clone(), self.seconds * rhs)
    }
}

impl Mul<Timedelta<i64>> for i64 {
    type Output = Timedelta<i64>;

    fn mul(self, rhs: Timedelta<i64>) -> Timedelta<i64> {
        rhs * self
    }
}

impl Mul<Timedelta<f64>> for f64 {
    type Output = Timedelta<f64>;

    fn mul(self, rhs: Timedelta<f64>) -> Timedelta<f64> {
        rhs * self
    }
}

impl<N: Numeric + fmt::Display> fmt::Display for Timedelta<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d {}s", self.days, self.seconds)
    }
}

/// Leaves are exactly `(days, seconds)`; there is no metadata.
///
/// Reconstruction goes through [`Timedelta::new`], so transformed leaves
/// are renormalized.
impl<N: Numeric> TreeNode<N> for Timedelta<N> {
    type Meta = ();

    fn decompose(self) -> (Vec<N>, ()) {
        (vec![self.days, self.seconds], ())
    }

    fn recompose(_meta: (), leaves: Vec<N>) -> Result<Self, TreeError> {
        let actual = leaves.len();
        let mut iter = leaves.into_iter();
        match (iter.next(), iter.next(), iter.next()) {
            (Some(days), Some(seconds), None) => Ok(Self::new(days, seconds)),
            _ => Err(TreeError::LeafCount {
                expected: 2,
                actual,
            }),
        }
    }
}

/// A duration-like value: an exact [`Timedelta`] or fractional seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timestep {
    Timedelta(Timedelta<i64>),
    Seconds(f64),
}

impl Timestep {
    /// Total duration in seconds.
    #[must_use]
    pub fn total_seconds(&self) -> f64 {
        match self {
            Self::Timedelta(delta) => delta.total_seconds(),
            Self::Seconds(seconds) => *seconds,
        }
    }

    /// The step as a unit-safe [`Time`] quantity.
    #[must_use]
    pub fn as_time(&self) -> Time {
        Time::new::<second>(self.total_seconds())
    }
}

impl From<Timedelta<i64>> for Timestep {
    fn from(delta: Timedelta<i64>) -> Self {
        Self::Timedelta(delta)
    }
}

impl From<f64> for Timestep {
    fn from(seconds: f64) -> Self {
        Self::Seconds(seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn default_is_zero() {
        assert_eq!(Timedelta::<i64>::default(), Timedelta::new(0, 0));
    }

    #[test]
    fn normalizes_positive_overflow() {
        assert_eq!(Timedelta::<i64>::new(0, 86_400), Timedelta::new(1, 0));
        assert_eq!(Timedelta::<i64>::new(0, 2 * 86_400 + 90), Timedelta::new(2, 90));
    }

    #[test]
    fn normalizes_negative_seconds() {
        assert_eq!(Timedelta::<i64>::new(0, -1), Timedelta::new(-1, 86_399));
        assert_eq!(Timedelta::<i64>::new(0, -86_400), Timedelta::new(-1, 0));
        assert_eq!(Timedelta::<i64>::new(0, -86_401), Timedelta::new(-2, 86_399));
    }

    #[test]
    fn normalization_uses_floor_division() {
        for total in [-200_000_i64, -86_400, -1, 0, 1, 86_399, 86_400, 200_000] {
            let td = Timedelta::from_seconds(total);
            assert!(td.seconds() >= 0 && td.seconds() < 86_400);
            assert_eq!(td.days(), total.div_euclid(86_400));
            assert_eq!(td.days() * 86_400 + td.seconds(), total);
        }
    }

    #[test]
    fn addition_renormalizes() {
        let d = Timedelta::<i64>::new(1, 43_200);
        assert_eq!(d + d, Timedelta::new(3, 0));
    }

    #[test]
    fn add_assign_accumulates() {
        let mut total = Timedelta::<i64>::default();
        total += Timedelta::new(0, 43_200);
        total += Timedelta::new(0, 43_200);
        assert_eq!(total, Timedelta::new(1, 0));
    }

    #[test]
    fn scalar_multiplication_commutes() {
        let d = Timedelta::<i64>::new(1, 43_200);
        assert_eq!(d * 2, Timedelta::new(3, 0));
        assert_eq!(2 * d, Timedelta::new(3, 0));
    }

    #[test]
    fn checked_add_rejects_numbers() {
        let d = Timedelta::<i64>::new(1, 43_200);
        assert_eq!(
            d.checked_add(&Operand::Number(60)),
            Err(UnsupportedOperand::AddNumber)
        );
        assert_eq!(
            d.checked_add(&Operand::Timedelta(d)),
            Ok(Timedelta::new(3, 0))
        );
    }

    #[test]
    fn checked_mul_rejects_timedeltas() {
        let d = Timedelta::<i64>::new(1, 43_200);
        assert_eq!(
            d.checked_mul(&Operand::Timedelta(d)),
            Err(UnsupportedOperand::MulTimedelta)
        );
        assert_eq!(d.checked_mul(&Operand::Number(2)), Ok(Timedelta::new(3, 0)));
    }

    #[test]
    fn float_leaves_normalize() {
        let td = Timedelta::<f64>::new(0.0, 90_000.0);
        assert_relative_eq!(td.days(), 1.0);
        assert_relative_eq!(td.seconds(), 3_600.0);

        let td = Timedelta::<f64>::new(0.0, -3_600.0);
        assert_relative_eq!(td.days(), -1.0);
        assert_relative_eq!(td.seconds(), 82_800.0);
    }

    #[test]
    fn leaf_transform_matches_direct_arithmetic() {
        let d = Timedelta::<i64>::new(1, 43_200);
        let doubled = d.map_leaves(|leaf| 2 * leaf).unwrap();
        assert_eq!(doubled, d * 2);
    }

    #[test]
    fn decomposes_into_days_and_seconds() {
        let (leaves, ()) = Timedelta::<i64>::new(1, 43_200).decompose();
        assert_eq!(leaves, vec![1, 43_200]);
    }

    #[test]
    fn recompose_requires_two_leaves() {
        assert_eq!(
            Timedelta::<i64>::recompose((), vec![1]),
            Err(TreeError::LeafCount {
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(
            Timedelta::<i64>::recompose((), vec![0, 86_400]),
            Ok(Timedelta::new(1, 0))
        );
    }

    #[test]
    fn converts_to_unit_safe_time() {
        let d = Timedelta::<i64>::new(1, 43_200);
        assert_relative_eq!(d.total_seconds(), 129_600.0);
        assert_relative_eq!(d.as_time().get::<second>(), 129_600.0);
        assert_relative_eq!(d.as_time().get::<day>(), 1.5);
    }

    #[test]
    fn timestep_conversions_agree() {
        let step = Timestep::from(Timedelta::from_seconds(90));
        assert_relative_eq!(step.total_seconds(), 90.0);

        let step = Timestep::from(45.5);
        assert_relative_eq!(step.total_seconds(), 45.5);
        assert_relative_eq!(step.as_time().get::<second>(), 45.5);
    }

    #[test]
    fn displays_days_and_seconds() {
        assert_eq!(Timedelta::<i64>::new(3, 0).to_string(), "3d 0s");
    }
}
