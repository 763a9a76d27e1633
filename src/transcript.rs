//! Defines a `TranscriptProtocol` trait for using a Merlin transcript.
use crate::algebra::{Point, Scalar};

use merlin::Transcript;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

#[cfg(feature = "std")]
use std::vec::Vec;

pub trait TranscriptProtocol {
    /// Append a domain separator for a sigma membership proof with digit
    /// base `n` and digit count `m`.
    fn sigma_plus_domain_sep(&mut self, n: u64, m: u64);

    /// Append a domain separator for deriving `count` batch weights.
    fn batch_weight_domain_sep(&mut self, count: u64);

    /// Append a `scalar` with the given `label`.
    fn append_scalar<S: Scalar>(&mut self, label: &'static [u8], scalar: &S);

    /// Append a `point` with the given `label`.
    fn append_point<P: Point>(&mut self, label: &'static [u8], point: &P);

    /// Compute a `label`ed challenge variable.
    fn challenge_scalar<S: Scalar>(&mut self, label: &'static [u8]) -> S;
}

impl TranscriptProtocol for Transcript {
    fn sigma_plus_domain_sep(&mut self, n: u64, m: u64) {
        self.append_message(b"dom-sep", b"sigma-plus proof v1");
        self.append_u64(b"n", n);
        self.append_u64(b"m", m);
    }

    fn batch_weight_domain_sep(&mut self, count: u64) {
        self.append_message(b"dom-sep", b"sigma-plus batch weights v1");
        self.append_u64(b"count", count);
    }

    fn append_scalar<S: Scalar>(&mut self, label: &'static [u8], scalar: &S) {
        let mut buf = Vec::with_capacity(S::ENCODED_LEN);
        scalar.encode_to(&mut buf);
        self.append_message(label, &buf);
    }

    fn append_point<P: Point>(&mut self, label: &'static [u8], point: &P) {
        let mut buf = Vec::with_capacity(P::ENCODED_LEN);
        point.encode_to(&mut buf);
        self.append_message(label, &buf);
    }

    fn challenge_scalar<S: Scalar>(&mut self, label: &'static [u8]) -> S {
        let mut buf = [0u8; 64];
        self.challenge_bytes(label, &mut buf);

        S::from_wide_bytes(&buf)
    }
}
