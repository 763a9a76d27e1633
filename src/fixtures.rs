#![allow(non_snake_case)]
//! Reference prover over ristretto255, used by tests and benchmarks.
//!
//! Proof generation is not part of the supported surface of this crate; this
//! module exists so the verifier can be exercised against honest proofs. It
//! compiles only under `cfg(test)` or the off-by-default `fixtures` feature.
//!
//! A coin is a commitment `s*g + v*h[0] + r*h[1]` to a serial `s`, a value
//! `v` and a blinding factor `r`. A spend proof ranges over the set with the
//! claimed serial stripped from every member, so the spent coin becomes a
//! commitment under the auxiliary generators alone:
//!
//! ```
//! # use rand::rngs::OsRng;
//! # use curve25519_dalek::scalar::Scalar;
//! # use sigma_plus_proofs::ristretto::ristretto_verifier;
//! # use sigma_plus_proofs::fixtures::{mint, prove, shift_by_serial};
//! let verifier = ristretto_verifier(2, 3).unwrap();
//!
//! // Mint a full set of coins; we know the opening of the one at index 3
//! let l = 3;
//! let openings = (0..verifier.max_set_size())
//!     .map(|_| {
//!         (
//!             Scalar::random(&mut OsRng),
//!             Scalar::random(&mut OsRng),
//!             Scalar::random(&mut OsRng),
//!         )
//!     })
//!     .collect::<Vec<_>>();
//! let coins = openings
//!     .iter()
//!     .map(|(s, v, r)| mint(&verifier, s, v, r))
//!     .collect::<Vec<_>>();
//!
//! // Spend it: reveal the serial, prove membership over the shifted set
//! let (s, v, r) = openings[l];
//! let set = shift_by_serial(&verifier, &coins, &s);
//! let proof = prove(&verifier, &set, l, &v, &r, &mut OsRng).unwrap();
//! assert!(verifier.verify(&set, &proof));
//! ```
use crate::digits::decompose;
use crate::errors::{ProofError, ProofResult};
use crate::proofs::{SigmaPlusProof, SigmaPlusVerifier};
use core::iter::once;
use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::MultiscalarMul;
use polynomials::Polynomial;
use rand::{CryptoRng, RngCore};

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

#[cfg(feature = "std")]
use std::vec::Vec;

/// A coin commitment `s*g + v*h[0] + r*h[1]`.
pub fn mint(
    verifier: &SigmaPlusVerifier<RistrettoPoint>,
    s: &Scalar,
    v: &Scalar,
    r: &Scalar,
) -> RistrettoPoint {
    let h = verifier.blinding_generators();
    verifier.generator() * s + h[0] * v + h[1] * r
}

/// Strip the claimed serial from every member of the set: `C_i - s*g`.
pub fn shift_by_serial(
    verifier: &SigmaPlusVerifier<RistrettoPoint>,
    set: &[RistrettoPoint],
    s: &Scalar,
) -> Vec<RistrettoPoint> {
    let gs = verifier.generator() * s;
    set.iter().map(|C| C - gs).collect()
}

/// The first move of the sigma protocol: the prover's commitments, together
/// with the secret state needed to answer a challenge.
///
/// Splitting the protocol here lets several proofs answer one shared
/// challenge, as batch verification requires.
pub struct PendingProof {
    pub A: RistrettoPoint,
    pub B: RistrettoPoint,
    pub C: RistrettoPoint,
    pub D: RistrettoPoint,
    pub Gk: Vec<RistrettoPoint>,
    pub Qk: Vec<RistrettoPoint>,
    n: usize,
    m: usize,
    sigma: Vec<Scalar>,
    a: Vec<Scalar>,
    rA: Scalar,
    rB: Scalar,
    rC: Scalar,
    rD: Scalar,
    rho: Vec<Scalar>,
    gamma: Vec<Scalar>,
    tau: Vec<Scalar>,
    v: Scalar,
    r: Scalar,
}

impl PendingProof {
    /// The challenge this proof binds to when no outer context fixes one.
    pub fn challenge(&self, verifier: &SigmaPlusVerifier<RistrettoPoint>) -> Scalar {
        verifier.derive_challenge(&self.A, &self.B, &self.C, &self.D, &self.Gk, &self.Qk)
    }

    /// Answer the challenge `x`, producing the finished proof.
    pub fn respond(&self, x: &Scalar) -> SigmaPlusProof<RistrettoPoint> {
        let (n, m) = (self.n, self.m);

        let mut f = Vec::with_capacity(m * (n - 1));
        for j in 0..m {
            for i in 1..n {
                f.push(self.sigma[j * n + i] * x + self.a[j * n + i]);
            }
        }

        let x_m = (0..m).fold(Scalar::one(), |acc, _| acc * x);
        let mut zV = self.v * x_m;
        let mut zR = self.r * x_m;
        let mut x_k = Scalar::one();
        for k in 0..m {
            zV -= self.gamma[k] * x_k;
            zR -= (self.rho[k] + self.tau[k]) * x_k;
            x_k *= x;
        }

        SigmaPlusProof {
            A: self.A,
            B: self.B,
            C: self.C,
            D: self.D,
            f,
            Gk: self.Gk.clone(),
            Qk: self.Qk.clone(),
            ZA: self.rB * x + self.rA,
            ZC: self.rC * x + self.rD,
            zV,
            zR,
        }
    }
}

/// Run the commitment move for a spend of `set[l]`, which must open to
/// `v*h[0] + r*h[1]`.
///
/// Sets smaller than the verifier's capacity are supported; the proof then
/// verifies member-for-member against the same set.
pub fn commit_phase<R: RngCore + CryptoRng>(
    verifier: &SigmaPlusVerifier<RistrettoPoint>,
    set: &[RistrettoPoint],
    l: usize,
    v: &Scalar,
    r: &Scalar,
    rng: &mut R,
) -> ProofResult<PendingProof> {
    let (n, m) = (verifier.n(), verifier.m());
    if set.is_empty() {
        return Err(ProofError::SetIsTooSmall);
    }
    if set.len() > verifier.max_set_size() {
        return Err(ProofError::SetIsTooLarge);
    }
    if l >= set.len() {
        return Err(ProofError::IndexOutOfBounds);
    }

    let g = *verifier.generator();
    let h = &verifier.blinding_generators()[..n * m];

    // sigma is the indicator tensor of l's digits; a carries the masking
    // noise, with each row summing to zero
    let l_digits = decompose(l, n, m)?;
    let mut sigma = vec![Scalar::zero(); n * m];
    for (j, &d) in l_digits.iter().enumerate() {
        sigma[j * n + d] = Scalar::one();
    }
    let mut a = vec![Scalar::zero(); n * m];
    for j in 0..m {
        let mut sum = Scalar::zero();
        for i in 1..n {
            let noise = Scalar::random(rng);
            sum += noise;
            a[j * n + i] = noise;
        }
        a[j * n] = -sum;
    }

    let rA = Scalar::random(rng);
    let rB = Scalar::random(rng);
    let rC = Scalar::random(rng);
    let rD = Scalar::random(rng);

    let commit = |vals: &[Scalar], blind: &Scalar| {
        RistrettoPoint::multiscalar_mul(once(blind).chain(vals.iter()), once(&g).chain(h.iter()))
    };
    let A = commit(&a, &rA);
    let B = commit(&sigma, &rB);
    let c_vals = sigma
        .iter()
        .zip(a.iter())
        .map(|(s, a)| a * (Scalar::one() - Scalar::from(2u32) * s))
        .collect::<Vec<Scalar>>();
    let C = commit(&c_vals, &rC);
    let d_vals = a.iter().map(|a| -a * a).collect::<Vec<Scalar>>();
    let D = commit(&d_vals, &rD);

    // Low-order coefficients of each member's response polynomial; the
    // leading x^m term belongs to index l alone and is carried by the coin
    // itself in the verification equation
    let mut p = Vec::with_capacity(set.len());
    for i in 0..set.len() {
        p.push(index_poly(i, &l_digits, &a, n, m)?);
    }

    let rho = (0..m).map(|_| Scalar::random(rng)).collect::<Vec<Scalar>>();
    let gamma = (0..m).map(|_| Scalar::random(rng)).collect::<Vec<Scalar>>();
    let tau = (0..m).map(|_| Scalar::random(rng)).collect::<Vec<Scalar>>();
    let mut Gk = Vec::with_capacity(m);
    let mut Qk = Vec::with_capacity(m);
    for k in 0..m {
        let coeffs = p.iter().map(|p_i| p_i[k]).collect::<Vec<Scalar>>();
        Gk.push(RistrettoPoint::multiscalar_mul(
            coeffs.iter().chain(once(&rho[k])),
            set.iter().chain(once(&h[1])),
        ));
        Qk.push(h[0] * gamma[k] + h[1] * tau[k]);
    }

    Ok(PendingProof {
        A,
        B,
        C,
        D,
        Gk,
        Qk,
        n,
        m,
        sigma,
        a,
        rA,
        rB,
        rC,
        rD,
        rho,
        gamma,
        tau,
        v: *v,
        r: *r,
    })
}

/// Produce a finished proof bound to its own Fiat–Shamir challenge, the form
/// [`SigmaPlusVerifier::verify`] expects.
pub fn prove<R: RngCore + CryptoRng>(
    verifier: &SigmaPlusVerifier<RistrettoPoint>,
    set: &[RistrettoPoint],
    l: usize,
    v: &Scalar,
    r: &Scalar,
    rng: &mut R,
) -> ProofResult<SigmaPlusProof<RistrettoPoint>> {
    let pending = commit_phase(verifier, set, l, v, r, rng)?;
    let x = pending.challenge(verifier);
    Ok(pending.respond(&x))
}

// Coefficients 0..m of `prod_j (a[j][i_j] + delta(l_j, i_j) * T)` as a
// polynomial in the challenge T.
fn index_poly(
    i: usize,
    l_digits: &[usize],
    a: &[Scalar],
    n: usize,
    m: usize,
) -> ProofResult<Vec<Scalar>> {
    let i_digits = decompose(i, n, m)?;

    let mut p = Polynomial::from(Vec::with_capacity(m + 1));
    p.push(Scalar::one());
    for j in 0..m {
        let mut factor = Polynomial::new();
        factor.push(a[j * n + i_digits[j]]);
        if l_digits[j] == i_digits[j] {
            factor.push(Scalar::one());
        }
        p *= factor;
    }

    let mut v: Vec<Scalar> = p.into();
    v.resize_with(m, Scalar::zero);
    Ok(v)
}
