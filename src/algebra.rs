//! Abstract algebraic capabilities the verifier is generic over.
//!
//! The verification equations only need a prime-order group and its scalar
//! field. Both are captured as traits so the verifier can be instantiated
//! over any curve library that satisfies them; [`crate::ristretto`] provides
//! the ristretto255 instantiation.
use core::fmt::Debug;
use core::ops::{Add, Mul, Neg, Sub};

use rand::{CryptoRng, RngCore};

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

#[cfg(feature = "std")]
use std::vec::Vec;

/// An element of the group's scalar field.
///
/// Values are plain `Copy` data; all arithmetic is modular in the field and
/// equality is exact. `decode` must reject any non-canonical encoding, so a
/// value of this type is always a reduced field element.
pub trait Scalar:
    Copy
    + Clone
    + Debug
    + PartialEq
    + Eq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
{
    /// Width of the canonical fixed-length encoding, in bytes.
    const ENCODED_LEN: usize;

    fn zero() -> Self;

    fn one() -> Self;

    fn from_u64(v: u64) -> Self;

    /// Sample a uniformly random field element.
    fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self;

    /// Reduce 64 uniformly random bytes into the field. Used to turn
    /// transcript challenges into unbiased scalars.
    fn from_wide_bytes(bytes: &[u8; 64]) -> Self;

    fn is_zero(&self) -> bool;

    /// Append the canonical `ENCODED_LEN`-byte encoding to `out`.
    fn encode_to(&self, out: &mut Vec<u8>);

    /// Decode a canonical encoding. Returns `None` for any byte string that
    /// is not the canonical form of a field element.
    fn decode(bytes: &[u8]) -> Option<Self>;
}

/// A point in a prime-order group.
pub trait Point:
    Copy
    + Clone
    + Debug
    + PartialEq
    + Eq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + Mul<<Self as Point>::Scalar, Output = Self>
{
    /// The group's scalar field.
    type Scalar: Scalar;

    /// Width of the canonical fixed-length encoding, in bytes.
    const ENCODED_LEN: usize;

    fn identity() -> Self;

    fn is_identity(&self) -> bool;

    /// Whether the point is a valid group member. Encodings that cannot
    /// represent a group member must already be rejected by `decode`; this
    /// exists for group models where invalid points are representable.
    fn is_member(&self) -> bool;

    fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self;

    /// Append the canonical `ENCODED_LEN`-byte encoding to `out`.
    fn encode_to(&self, out: &mut Vec<u8>);

    /// Decode a canonical encoding. Returns `None` for any byte string that
    /// does not encode a group member.
    fn decode(bytes: &[u8]) -> Option<Self>;

    /// Compute `sum(scalars[i] * points[i])` as a single operation.
    ///
    /// Verification only ever multiplies public data, so implementations are
    /// free to use variable-time algorithms.
    fn multiscalar_mul(scalars: &[Self::Scalar], points: &[Self]) -> Self;
}
