//! ristretto255 instantiation of the algebra traits.
//!
//! The group is curve25519-dalek's ristretto255 with its canonical 32-byte
//! encodings. Auxiliary generators are derived by a hash chain from the
//! basepoint, so no party knows a discrete logarithm relation between them.
use crate::algebra;
use crate::errors::{ProofError, ProofResult};
use crate::proofs::SigmaPlusVerifier;

use curve25519_dalek::constants;
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::{Identity, IsIdentity, VartimeMultiscalarMul};
use rand::{CryptoRng, RngCore};
use sha3::Sha3_512;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

#[cfg(feature = "std")]
use std::vec::Vec;

impl algebra::Scalar for Scalar {
    const ENCODED_LEN: usize = 32;

    fn zero() -> Self {
        Scalar::zero()
    }

    fn one() -> Self {
        Scalar::one()
    }

    fn from_u64(v: u64) -> Self {
        Scalar::from(v)
    }

    fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Scalar::random(rng)
    }

    fn from_wide_bytes(bytes: &[u8; 64]) -> Self {
        Scalar::from_bytes_mod_order_wide(bytes)
    }

    fn is_zero(&self) -> bool {
        *self == Scalar::zero()
    }

    fn encode_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.as_bytes());
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != Self::ENCODED_LEN {
            return None;
        }
        let mut buf = [0u8; 32];
        buf.copy_from_slice(bytes);
        Scalar::from_canonical_bytes(buf)
    }
}

impl algebra::Point for RistrettoPoint {
    type Scalar = Scalar;

    const ENCODED_LEN: usize = 32;

    fn identity() -> Self {
        Identity::identity()
    }

    fn is_identity(&self) -> bool {
        IsIdentity::is_identity(self)
    }

    fn is_member(&self) -> bool {
        // Decompression only admits canonical encodings of group members, so
        // every representable value is a member.
        true
    }

    fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        RistrettoPoint::random(rng)
    }

    fn encode_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.compress().as_bytes());
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != Self::ENCODED_LEN {
            return None;
        }
        CompressedRistretto::from_slice(bytes).decompress()
    }

    fn multiscalar_mul(scalars: &[Scalar], points: &[Self]) -> Self {
        RistrettoPoint::vartime_multiscalar_mul(scalars.iter(), points.iter())
    }
}

/// Derive `count` generator points by chained hashing from the basepoint:
///
/// ```text
/// H[0] = hash(G)
/// H[1] = hash(H[0])
///  .        .
///  .        .
/// ```
///
/// No discrete logarithm relation between any of these points is known.
pub fn derive_generators(count: usize) -> Vec<RistrettoPoint> {
    let mut h = Vec::with_capacity(count);
    let mut prev = constants::RISTRETTO_BASEPOINT_POINT;
    for _ in 0..count {
        prev = RistrettoPoint::hash_from_bytes::<Sha3_512>(prev.compress().as_bytes());
        h.push(prev);
    }
    h
}

/// Build a [`SigmaPlusVerifier`] over ristretto255 for digit base `n` and
/// digit count `m`, with the basepoint as `g` and hash-derived auxiliary
/// generators.
///
/// ```
/// # use sigma_plus_proofs::ristretto::ristretto_verifier;
/// let verifier = ristretto_verifier(4, 3).unwrap();
/// assert_eq!(verifier.max_set_size(), 64);
/// ```
pub fn ristretto_verifier(n: usize, m: usize) -> ProofResult<SigmaPlusVerifier<RistrettoPoint>> {
    let count = n.checked_mul(m).ok_or(ProofError::CapacityOverflow)?;
    SigmaPlusVerifier::new(
        constants::RISTRETTO_BASEPOINT_POINT,
        derive_generators(count),
        n,
        m,
    )
}
