//! Verification of [Sigma/Lelantus](https://eprint.iacr.org/2019/373)
//! one-out-of-many zero knowledge membership proofs.
//!
//! A spender proves that a hidden coin commitment belongs to a public
//! anonymity set of up to `n^m` commitments, without revealing which member
//! it is or what it opens to. This crate implements the verifier side only:
//! the digit-decomposition membership logic, the per-proof verification
//! equations, and a batched verification that amortizes many proofs against
//! one shared challenge into a single multi-exponentiation.
//!
//! The verifier is generic over the [`algebra`] traits; [`ristretto`]
//! instantiates them for curve25519-dalek's ristretto255 group.
//!
//! # Examples
//! Decode and verify a proof received over the wire. `n` and `m` are
//! protocol parameters agreed out of band, so the verifier is constructed
//! with them before any proof can be parsed:
//! ```
//! # use rand::rngs::OsRng; // You should use a more secure RNG
//! # use sigma_plus_proofs::ristretto::ristretto_verifier;
//! # use curve25519_dalek::ristretto::RistrettoPoint;
//! // Protocol parameters n = 4, m = 3: anonymity sets of up to 64 coins
//! let verifier = ristretto_verifier(4, 3).unwrap();
//!
//! // The caller's snapshot of the anonymity set
//! let set = (0..verifier.max_set_size())
//!     .map(|_| RistrettoPoint::random(&mut OsRng))
//!     .collect::<Vec<RistrettoPoint>>();
//!
//! // A byte string claiming to be a proof; decoding checks every field
//! let bytes = vec![0u8; verifier.proof_size()];
//! let proof = verifier.decode_proof(&bytes).unwrap();
//!
//! // Every verification failure is a plain `false`
//! assert!(!verifier.verify(&set, &proof));
//! ```
//! Batched verification shares one challenge and one anonymity-set snapshot
//! across many proofs. On consensus-critical paths use the deterministic
//! variant, so every validating node computes the identical verdict:
//! ```
//! # use rand::rngs::OsRng;
//! # use sigma_plus_proofs::ristretto::ristretto_verifier;
//! # use curve25519_dalek::ristretto::RistrettoPoint;
//! # use curve25519_dalek::scalar::Scalar;
//! # let verifier = ristretto_verifier(4, 3).unwrap();
//! # let set = (0..verifier.max_set_size())
//! #     .map(|_| RistrettoPoint::random(&mut OsRng))
//! #     .collect::<Vec<RistrettoPoint>>();
//! # let proof = verifier.decode_proof(&vec![0u8; verifier.proof_size()]).unwrap();
//! let x = Scalar::random(&mut OsRng); // challenge fixed by the transaction context
//! let serials = vec![Scalar::random(&mut OsRng)];
//! let proofs = vec![proof];
//! assert!(!verifier.batch_verify_deterministic(&set, &x, &serials, &proofs));
//! ```
//!
//! # Performance
//! Verification cost is dominated by curve operations on
//! [curve25519-dalek](https://docs.rs/curve25519-dalek); both verification
//! paths reduce the per-set work to multi-scalar multiplications, and
//! batching folds `M` proofs over one set into a single one.
//!
//! Benchmarks are run using [criterion.rs](https://docs.rs/criterion):
//! ```bash
//! cargo bench --features fixtures
//! ```
//!
//! # References
//! * [One-out-of-Many Proofs: Or How to Leak a Secret and Spend a Coin](https://eprint.iacr.org/2014/764)
//! * [Lelantus: Towards Confidentiality and Anonymity of Blockchain Transactions From Standard Assumptions](https://eprint.iacr.org/2019/373)

#![no_std]

#[cfg(not(feature = "std"))]
#[macro_use]
extern crate alloc;

#[cfg(feature = "std")]
#[macro_use]
extern crate std;

//-----------------------------------------------------------------------------
// Public modules
//-----------------------------------------------------------------------------
pub mod algebra;
pub mod errors;
pub mod proofs;
pub mod ristretto;

/// Reference prover for tests and benchmarks; not part of the supported
/// verification surface.
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

//-----------------------------------------------------------------------------
// Internal modules
//-----------------------------------------------------------------------------
pub(crate) mod digits;
pub(crate) mod transcript;
