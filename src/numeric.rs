use std::{
    fmt,
    ops::{Add, Mul, Sub},
};

use num_traits::Euclid;

/// Number of seconds in a day, the normalization modulus for [`Timedelta`].
///
/// [`Timedelta`]: crate::Timedelta
pub const SECONDS_PER_DAY: u32 = 86_400;

/// A scalar number or numeric array usable as a leaf value.
///
/// The framework's value types are generic over their leaves so the same
/// `Timedelta` or `ModelState` can hold a single scalar or a batched array
/// from the host numeric engine. A leaf type must support closed `+`, `-`,
/// and `*`, floor division via [`num_traits::Euclid`] (so negative seconds
/// normalize correctly), and lossless lifting of small constants through
/// `From<u32>`.
///
/// `i64` and `f64` satisfy these bounds out of the box; `i64` is recommended
/// for durations since it is exact. An array type participates in batched
/// computation by implementing the same operators elementwise.
///
/// This trait is blanket-implemented; there is nothing to implement directly.
pub trait Numeric:
    Clone
    + PartialEq
    + fmt::Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Euclid
    + From<u32>
{
}

impl<T> Numeric for T where
    T: Clone
        + PartialEq
        + fmt::Debug
        + Add<Output = T>
        + Sub<Output = T>
        + Mul<Output = T>
        + Euclid
        + From<u32>
{
}
