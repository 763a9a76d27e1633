//! Errors which may be returned by this crate.
//!
//! The public `verify` and `batch_verify` methods collapse every failure to
//! a plain `false`, so consensus code never branches on error kinds. The
//! kinds below are reachable through [`SigmaPlusVerifier::check`] for
//! diagnostics and tests.
//!
//! [`SigmaPlusVerifier::check`]: crate::proofs::SigmaPlusVerifier::check
use core::fmt;

/// Result of a proof check or parameter computation.
pub type ProofResult<T> = Result<T, ProofError>;

/// Reasons a proof, a proof encoding, or a verifier configuration may be
/// rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofError {
    /// The digit radix `n` must be at least 2
    RadixTooSmall,
    /// The digit count `m` must be at least 1
    TooFewDigits,
    /// `n^m` overflows the platform word size
    CapacityOverflow,
    /// Fewer than `n*m` generator points were supplied
    TooFewGenerators,
    /// A proof field length does not match the verifier's `n` and `m`
    InvalidProofSize,
    /// A group element is not a valid group member, or is the identity
    InvalidPoint,
    /// A scalar is not canonical, or is zero where zero is forbidden
    InvalidScalar,
    /// A digit response collides with the challenge value
    DegenerateResponse,
    /// The A/B/C/D commitment identity does not hold
    ConsistencyCheckFailed,
    /// The aggregate verification equation does not hold
    VerificationFailed,
    /// An index is outside the supported set capacity
    IndexOutOfBounds,
    /// The commitment set is empty
    SetIsTooSmall,
    /// The commitment set exceeds the `n^m` capacity
    SetIsTooLarge,
    /// The serial and proof slices differ in length
    SerialCountMismatch,
    /// The weight and proof slices differ in length, or a weight is zero
    InvalidWeight,
    /// A byte string could not be decoded into a proof
    DecodingFailed,
}

impl fmt::Display for ProofError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ProofError::RadixTooSmall => "digit radix is too small",
            ProofError::TooFewDigits => "digit count is too small",
            ProofError::CapacityOverflow => "set capacity overflows",
            ProofError::TooFewGenerators => "not enough generator points",
            ProofError::InvalidProofSize => "proof field lengths are invalid",
            ProofError::InvalidPoint => "invalid group element",
            ProofError::InvalidScalar => "invalid scalar",
            ProofError::DegenerateResponse => "digit response equals the challenge",
            ProofError::ConsistencyCheckFailed => "commitment consistency check failed",
            ProofError::VerificationFailed => "verification equation failed",
            ProofError::IndexOutOfBounds => "index exceeds the set capacity",
            ProofError::SetIsTooSmall => "commitment set is empty",
            ProofError::SetIsTooLarge => "commitment set exceeds capacity",
            ProofError::SerialCountMismatch => "serial count does not match proof count",
            ProofError::InvalidWeight => "batch weights are missing or zero",
            ProofError::DecodingFailed => "proof bytes could not be decoded",
        };
        write!(f, "{}", msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ProofError {}
