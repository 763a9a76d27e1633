#![allow(non_snake_case)]
use crate::algebra::{Point, Scalar};
use crate::digits::decompose;
use crate::errors::{ProofError, ProofResult};
use crate::transcript::TranscriptProtocol;
use core::iter::Iterator;
use merlin::Transcript;
use rand::{CryptoRng, RngCore};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

#[cfg(feature = "std")]
use std::vec::Vec;

/// A one-out-of-many membership proof. A spender can convince a verifier
/// that one commitment in a public set opens under the auxiliary generators,
/// without revealing which one or what it opens to.
///
/// Proofs are produced once by a prover, then serialized, transmitted and
/// verified; they are never mutated. `n` and `m` are protocol parameters
/// agreed out of band and are not carried in the proof itself.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(
        serialize = "P: Serialize, P::Scalar: Serialize",
        deserialize = "P: Deserialize<'de>, P::Scalar: Deserialize<'de>"
    ))
)]
pub struct SigmaPlusProof<P: Point> {
    pub A: P,
    pub B: P,
    pub C: P,
    pub D: P,
    /// Per-digit responses, `n - 1` per digit position; the first response of
    /// each position is reconstructed from the challenge during verification.
    pub f: Vec<P::Scalar>,
    pub Gk: Vec<P>,
    pub Qk: Vec<P>,
    pub ZA: P::Scalar,
    pub ZC: P::Scalar,
    pub zV: P::Scalar,
    pub zR: P::Scalar,
}

impl<P: Point> SigmaPlusProof<P> {
    /// Size in bytes of a proof for digit base `n` and digit count `m`.
    pub fn serialized_size(n: usize, m: usize) -> usize {
        (4 + 2 * m) * P::ENCODED_LEN + (m * (n - 1) + 4) * <P::Scalar as Scalar>::ENCODED_LEN
    }

    /// Canonical wire encoding: the fixed-width fields in the order
    /// `A ‖ B ‖ C ‖ D ‖ f ‖ Gk ‖ Qk ‖ ZA ‖ ZC ‖ zV ‖ zR`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let len = (4 + self.Gk.len() + self.Qk.len()) * P::ENCODED_LEN
            + (self.f.len() + 4) * <P::Scalar as Scalar>::ENCODED_LEN;
        let mut buf = Vec::with_capacity(len);
        self.A.encode_to(&mut buf);
        self.B.encode_to(&mut buf);
        self.C.encode_to(&mut buf);
        self.D.encode_to(&mut buf);
        for f in &self.f {
            f.encode_to(&mut buf);
        }
        for G in &self.Gk {
            G.encode_to(&mut buf);
        }
        for Q in &self.Qk {
            Q.encode_to(&mut buf);
        }
        self.ZA.encode_to(&mut buf);
        self.ZC.encode_to(&mut buf);
        self.zV.encode_to(&mut buf);
        self.zR.encode_to(&mut buf);
        buf
    }

    /// Decode a proof from its canonical wire encoding. The expected `n` and
    /// `m` must be supplied by the caller; the encoding does not carry them.
    ///
    /// Any length mismatch, non-canonical scalar or invalid point encoding
    /// is rejected.
    pub fn from_bytes(bytes: &[u8], n: usize, m: usize) -> ProofResult<Self> {
        if n < 2 {
            return Err(ProofError::RadixTooSmall);
        }
        if m < 1 {
            return Err(ProofError::TooFewDigits);
        }
        if bytes.len() != Self::serialized_size(n, m) {
            return Err(ProofError::DecodingFailed);
        }

        let mut r = FieldReader { buf: bytes, pos: 0 };
        let A = r.point()?;
        let B = r.point()?;
        let C = r.point()?;
        let D = r.point()?;
        let mut f = Vec::with_capacity(m * (n - 1));
        for _ in 0..m * (n - 1) {
            f.push(r.scalar::<P::Scalar>()?);
        }
        let mut Gk = Vec::with_capacity(m);
        for _ in 0..m {
            Gk.push(r.point()?);
        }
        let mut Qk = Vec::with_capacity(m);
        for _ in 0..m {
            Qk.push(r.point()?);
        }
        let ZA = r.scalar()?;
        let ZC = r.scalar()?;
        let zV = r.scalar()?;
        let zR = r.scalar()?;

        Ok(SigmaPlusProof {
            A,
            B,
            C,
            D,
            f,
            Gk,
            Qk,
            ZA,
            ZC,
            zV,
            zR,
        })
    }
}

/// Cursor over a proof encoding.
struct FieldReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    fn point<P: Point>(&mut self) -> ProofResult<P> {
        let end = self.pos + P::ENCODED_LEN;
        let p = P::decode(&self.buf[self.pos..end]).ok_or(ProofError::DecodingFailed)?;
        self.pos = end;
        Ok(p)
    }

    fn scalar<S: Scalar>(&mut self) -> ProofResult<S> {
        let end = self.pos + S::ENCODED_LEN;
        let s = S::decode(&self.buf[self.pos..end]).ok_or(ProofError::DecodingFailed)?;
        self.pos = end;
        Ok(s)
    }
}

/// The stateless verification engine for [`SigmaPlusProof`]s.
///
/// A verifier holds only immutable configuration: the commitment base `g`,
/// the auxiliary generator vector `h` (whose first two elements are the
/// double-commitment bases), and the digit parameters `n` and `m` giving an
/// anonymity-set capacity of `n^m`. Verification calls are pure functions of
/// their arguments, so one verifier may be shared freely across threads.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(serialize = "P: Serialize", deserialize = "P: Deserialize<'de>"))
)]
pub struct SigmaPlusVerifier<P: Point> {
    g: P,
    h: Vec<P>,
    n: usize,
    m: usize,
}

impl<P: Point> SigmaPlusVerifier<P> {
    /// Create a verifier for digit base `n` and digit count `m`.
    ///
    /// `h` must hold at least `n * m` generators; `h[0]` and `h[1]` double as
    /// the bases of the final double commitment. No discrete logarithm
    /// relation may be known between `g` and any element of `h`.
    pub fn new(g: P, h: Vec<P>, n: usize, m: usize) -> ProofResult<Self> {
        if n < 2 {
            return Err(ProofError::RadixTooSmall);
        }
        if m < 1 {
            return Err(ProofError::TooFewDigits);
        }
        n.checked_pow(m as u32)
            .ok_or(ProofError::CapacityOverflow)?;
        if h.len() < n * m {
            return Err(ProofError::TooFewGenerators);
        }
        Ok(SigmaPlusVerifier { g, h, n, m })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn m(&self) -> usize {
        self.m
    }

    /// The commitment base `g`.
    pub fn generator(&self) -> &P {
        &self.g
    }

    /// The auxiliary generator vector `h`.
    pub fn blinding_generators(&self) -> &[P] {
        &self.h
    }

    /// The largest anonymity set a proof can range over, `n^m`.
    pub fn max_set_size(&self) -> usize {
        self.n.checked_pow(self.m as u32).unwrap()
    }

    /// Size in bytes of a proof encoding under this verifier's parameters.
    pub fn proof_size(&self) -> usize {
        SigmaPlusProof::<P>::serialized_size(self.n, self.m)
    }

    /// Decode a proof from its canonical wire encoding, using this
    /// verifier's `n` and `m`.
    pub fn decode_proof(&self, bytes: &[u8]) -> ProofResult<SigmaPlusProof<P>> {
        SigmaPlusProof::from_bytes(bytes, self.n, self.m)
    }

    /// The Fiat–Shamir challenge a proof binds to: a transcript over
    /// `A, B, C, D, Gk, Qk` in that fixed order.
    ///
    /// [`verify`] re-derives this internally. Callers that bind the
    /// challenge to additional context (a transaction hash, a whole batch)
    /// derive their own and use [`verify_with_challenge`] instead.
    ///
    /// [`verify`]: SigmaPlusVerifier::verify
    /// [`verify_with_challenge`]: SigmaPlusVerifier::verify_with_challenge
    pub fn challenge(&self, proof: &SigmaPlusProof<P>) -> P::Scalar {
        self.derive_challenge(&proof.A, &proof.B, &proof.C, &proof.D, &proof.Gk, &proof.Qk)
    }

    pub(crate) fn derive_challenge(
        &self,
        A: &P,
        B: &P,
        C: &P,
        D: &P,
        Gk: &[P],
        Qk: &[P],
    ) -> P::Scalar {
        let mut t = Transcript::new(b"sigma-plus-proof");
        t.sigma_plus_domain_sep(self.n as u64, self.m as u64);
        t.append_point(b"A", A);
        t.append_point(b"B", B);
        t.append_point(b"C", C);
        t.append_point(b"D", D);
        for G in Gk {
            t.append_point(b"Gk", G);
        }
        for Q in Qk {
            t.append_point(b"Qk", Q);
        }
        t.challenge_scalar(b"x")
    }

    /// Verify a single proof against the anonymity set `commits`, re-deriving
    /// the challenge from the proof itself.
    ///
    /// Every failure collapses to `false`; [`check`] reports the reason.
    ///
    /// [`check`]: SigmaPlusVerifier::check
    pub fn verify(&self, commits: &[P], proof: &SigmaPlusProof<P>) -> bool {
        let x = self.challenge(proof);
        self.check(commits, &x, proof).is_ok()
    }

    /// Verify a single proof against a caller-supplied challenge.
    pub fn verify_with_challenge(
        &self,
        commits: &[P],
        x: &P::Scalar,
        proof: &SigmaPlusProof<P>,
    ) -> bool {
        self.check(commits, x, proof).is_ok()
    }

    /// The single-proof verification pipeline, reporting which stage failed.
    ///
    /// The error kinds are diagnostic only; protocol behavior is the boolean
    /// contract of [`verify`] and [`verify_with_challenge`].
    ///
    /// [`verify`]: SigmaPlusVerifier::verify
    /// [`verify_with_challenge`]: SigmaPlusVerifier::verify_with_challenge
    pub fn check(
        &self,
        commits: &[P],
        x: &P::Scalar,
        proof: &SigmaPlusProof<P>,
    ) -> ProofResult<()> {
        if commits.is_empty() {
            return Err(ProofError::SetIsTooSmall);
        }
        if commits.len() > self.max_set_size() {
            return Err(ProofError::SetIsTooLarge);
        }
        self.shape_checks(proof)?;
        self.membership_checks(proof)?;
        let f = self.compute_fs(proof, x)?;
        self.abcd_checks(proof, x, &f)?;

        // t1: each set member scaled by its digit-response product
        let coeffs = SetCoefficients::new(&f, self.n, self.m)
            .take(commits.len())
            .collect::<Vec<P::Scalar>>();
        let t1 = P::multiscalar_mul(&coeffs, commits);

        // t2: Gk and Qk folded against powers of the challenge
        let mut t2 = P::identity();
        let mut x_k = P::Scalar::one();
        for k in 0..self.m {
            t2 = t2 + (proof.Gk[k] + proof.Qk[k]) * -x_k;
            x_k = x_k * *x;
        }

        if t1 + t2 != self.h[0] * proof.zV + self.h[1] * proof.zR {
            return Err(ProofError::VerificationFailed);
        }
        Ok(())
    }

    /// Verify `proofs` against one shared anonymity set and one shared
    /// challenge, at amortized cost close to a single verification.
    ///
    /// `serials[t]` is the one-time tag of proof `t`'s claimed spend; the
    /// commitment list holds the raw coins, serial components included, and
    /// the aggregate equation reconstructs each proof's serial shift. Each
    /// proof is weighted by a fresh random nonzero scalar drawn from
    /// `thread_rng`, so a batch containing any false proof passes only with
    /// negligible probability over the weights. Use
    /// [`batch_verify_deterministic`] on any path whose verdict must be
    /// bit-identical across nodes.
    ///
    /// Proofs over sets smaller than `n^m` must have been produced with the
    /// set padded by repetition of its last member; the aggregate assigns
    /// the last member the whole coefficient tail.
    ///
    /// [`batch_verify_deterministic`]: SigmaPlusVerifier::batch_verify_deterministic
    #[cfg(feature = "std")]
    pub fn batch_verify(
        &self,
        commits: &[P],
        x: &P::Scalar,
        serials: &[P::Scalar],
        proofs: &[SigmaPlusProof<P>],
    ) -> bool {
        self.batch_verify_with_rng(commits, x, serials, proofs, &mut rand::thread_rng())
    }

    /// [`batch_verify`] with an explicit weight source. The rng must be
    /// cryptographically secure and weights must never be reused across
    /// calls; both are soundness requirements, not hygiene.
    ///
    /// [`batch_verify`]: SigmaPlusVerifier::batch_verify
    pub fn batch_verify_with_rng<R: RngCore + CryptoRng>(
        &self,
        commits: &[P],
        x: &P::Scalar,
        serials: &[P::Scalar],
        proofs: &[SigmaPlusProof<P>],
        rng: &mut R,
    ) -> bool {
        let weights = random_weights::<P::Scalar, R>(proofs.len(), rng);
        self.batch_check(commits, x, serials, proofs, &weights)
            .is_ok()
    }

    /// Batch verification with weights derived deterministically from a
    /// transcript over the challenge, the serials and every proof encoding.
    ///
    /// All honest nodes compute identical weights and an identical verdict,
    /// which makes this variant safe on consensus-critical paths. The
    /// transcript binds every input, so the weights are fixed only once the
    /// prover has committed to its proofs.
    pub fn batch_verify_deterministic(
        &self,
        commits: &[P],
        x: &P::Scalar,
        serials: &[P::Scalar],
        proofs: &[SigmaPlusProof<P>],
    ) -> bool {
        let weights = self.derive_batch_weights(x, serials, proofs);
        self.batch_check(commits, x, serials, proofs, &weights)
            .is_ok()
    }

    fn derive_batch_weights(
        &self,
        x: &P::Scalar,
        serials: &[P::Scalar],
        proofs: &[SigmaPlusProof<P>],
    ) -> Vec<P::Scalar> {
        let mut t = Transcript::new(b"sigma-plus-batch");
        t.batch_weight_domain_sep(proofs.len() as u64);
        t.append_scalar(b"x", x);
        for s in serials {
            t.append_scalar(b"serial", s);
        }
        for p in proofs {
            t.append_message(b"proof", &p.to_bytes());
        }
        (0..proofs.len())
            .map(|_| loop {
                let y: P::Scalar = t.challenge_scalar(b"y");
                if !y.is_zero() {
                    break y;
                }
            })
            .collect()
    }

    /// The batch verification pipeline, reporting which stage failed.
    ///
    /// `weights` must hold one nonzero scalar per proof; the soundness of
    /// the aggregate check rests entirely on the weights being unpredictable
    /// to the prover.
    pub fn batch_check(
        &self,
        commits: &[P],
        x: &P::Scalar,
        serials: &[P::Scalar],
        proofs: &[SigmaPlusProof<P>],
        weights: &[P::Scalar],
    ) -> ProofResult<()> {
        if commits.is_empty() {
            return Err(ProofError::SetIsTooSmall);
        }
        if commits.len() > self.max_set_size() {
            return Err(ProofError::SetIsTooLarge);
        }
        if serials.len() != proofs.len() {
            return Err(ProofError::SerialCountMismatch);
        }
        if weights.len() != proofs.len() || weights.iter().any(|y| y.is_zero()) {
            return Err(ProofError::InvalidWeight);
        }

        let mut tables = Vec::with_capacity(proofs.len());
        for proof in proofs {
            self.shape_checks(proof)?;
            self.membership_checks(proof)?;
            let f = self.compute_fs(proof, x)?;
            self.abcd_checks(proof, x, &f)?;
            tables.push(f);
        }

        let n = self.n;
        let m = self.m;
        let N = commits.len();
        let last_digits = decompose(N - 1, n, m)?;

        let mut coeffs = vec![P::Scalar::zero(); N];
        let mut right = P::identity();
        let mut exp = P::Scalar::zero();
        for (t, proof) in proofs.iter().enumerate() {
            let f = &tables[t];
            let y = weights[t];
            right = right + (self.h[0] * proof.zV + self.h[1] * proof.zR) * y;

            let mut e = P::Scalar::zero();
            for (i, f_i) in SetCoefficients::new(f, n, m).take(N - 1).enumerate() {
                coeffs[i] = coeffs[i] + f_i * y;
                e = e + f_i;
            }

            // The last member's coefficient is the whole tail
            // `sum_{i=N-1}^{n^m - 1} prod_j f[j*n + i_j]`, folded without
            // enumerating the padded indices: each digit position's row sums
            // to `x`, so the sum over the low digit positions telescopes
            // into powers of `x`.
            let mut pow = P::Scalar::one();
            let mut partials = Vec::with_capacity(m);
            for j in (0..m).rev() {
                partials.push(pow);
                pow = pow * f[j * n + last_digits[j]];
            }
            let mut x_j = P::Scalar::one();
            for j in 0..m {
                let mut row_tail = P::Scalar::zero();
                for i in last_digits[j] + 1..n {
                    row_tail = row_tail + f[j * n + i];
                }
                pow = pow + row_tail * x_j * partials[m - j - 1];
                x_j = x_j * *x;
            }
            coeffs[N - 1] = coeffs[N - 1] + pow * y;
            e = e + pow;

            exp = exp + e * serials[t] * y;
        }

        let t1 = P::multiscalar_mul(&coeffs, commits);

        let mut t2 = P::identity();
        for (t, proof) in proofs.iter().enumerate() {
            let mut term = P::identity();
            let mut x_k = P::Scalar::one();
            for k in 0..m {
                term = term + (proof.Gk[k] + proof.Qk[k]) * -x_k;
                x_k = x_k * *x;
            }
            t2 = t2 + term * weights[t];
        }

        right = right + self.g * exp;
        if t1 + t2 != right {
            return Err(ProofError::VerificationFailed);
        }
        Ok(())
    }

    fn shape_checks(&self, proof: &SigmaPlusProof<P>) -> ProofResult<()> {
        if proof.f.len() != self.m * (self.n - 1)
            || proof.Gk.len() != self.m
            || proof.Qk.len() != self.m
        {
            return Err(ProofError::InvalidProofSize);
        }
        Ok(())
    }

    fn membership_checks(&self, proof: &SigmaPlusProof<P>) -> ProofResult<()> {
        for p in &[proof.A, proof.B, proof.C, proof.D] {
            if !p.is_member() || p.is_identity() {
                return Err(ProofError::InvalidPoint);
            }
        }
        for f in &proof.f {
            if f.is_zero() {
                return Err(ProofError::InvalidScalar);
            }
        }
        for p in proof.Gk.iter().chain(proof.Qk.iter()) {
            if !p.is_member() || p.is_identity() {
                return Err(ProofError::InvalidPoint);
            }
        }
        for s in &[proof.ZA, proof.ZC, proof.zV, proof.zR] {
            if s.is_zero() {
                return Err(ProofError::InvalidScalar);
            }
        }
        Ok(())
    }

    /// Reconstruct the full `m x n` response table from the `m * (n - 1)`
    /// stored responses: the first response of each digit position is the
    /// challenge minus the rest of its row, so every row sums to `x`.
    ///
    /// A stored response equal to the challenge is rejected outright.
    fn compute_fs(&self, proof: &SigmaPlusProof<P>, x: &P::Scalar) -> ProofResult<Vec<P::Scalar>> {
        for f in &proof.f {
            if *f == *x {
                return Err(ProofError::DegenerateResponse);
            }
        }

        let k = self.n - 1;
        let mut full = Vec::with_capacity(self.n * self.m);
        for j in 0..self.m {
            full.push(P::Scalar::zero());
            let mut row_sum = P::Scalar::zero();
            for i in 0..k {
                let f = proof.f[j * k + i];
                row_sum = row_sum + f;
                full.push(f);
            }
            full[j * self.n] = *x - row_sum;
        }
        Ok(full)
    }

    /// The commitment identity binding `A, B, C, D` to the responses:
    /// `B*x + A + C*x + D` must be a commitment to `f + f*(x - f)` entrywise
    /// over `h`, blinded by `ZA + ZC` under `g`.
    fn abcd_checks(
        &self,
        proof: &SigmaPlusProof<P>,
        x: &P::Scalar,
        f: &[P::Scalar],
    ) -> ProofResult<()> {
        let mut exps = Vec::with_capacity(1 + f.len());
        exps.push(proof.ZA + proof.ZC);
        for f_i in f {
            exps.push(*f_i + *f_i * (*x - *f_i));
        }
        let mut bases = Vec::with_capacity(1 + f.len());
        bases.push(self.g);
        bases.extend_from_slice(&self.h[..self.n * self.m]);

        if proof.B * *x + proof.A + proof.C * *x + proof.D != P::multiscalar_mul(&exps, &bases) {
            return Err(ProofError::ConsistencyCheckFailed);
        }
        Ok(())
    }
}

/// Streams the per-index coefficient `prod_j f[j*n + i_j]` for set indices
/// `i = 0, 1, ..` by running a digit odometer over the response table.
struct SetCoefficients<'a, S: Scalar> {
    f: &'a [S],
    digits: Vec<usize>,
    n: usize,
    i: usize,
    max: usize,
}

impl<'a, S: Scalar> SetCoefficients<'a, S> {
    fn new(f: &'a [S], n: usize, m: usize) -> SetCoefficients<'a, S> {
        SetCoefficients {
            f,
            digits: vec![0; m],
            n,
            i: 0,
            max: n.checked_pow(m as u32).unwrap(),
        }
    }
}

impl<'a, S: Scalar> Iterator for SetCoefficients<'a, S> {
    type Item = S;

    #[inline]
    fn next(&mut self) -> Option<S> {
        if self.i >= self.max {
            return None;
        }
        let n = self.n;
        let f = self.f;
        let coeff = self
            .digits
            .iter()
            .enumerate()
            .fold(S::one(), |acc, (j, &d)| acc * f[j * n + d]);

        // Advance the least significant digit first, carrying upward
        for d in self.digits.iter_mut() {
            *d += 1;
            if *d < n {
                break;
            }
            *d = 0;
        }
        self.i += 1;
        Some(coeff)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.max - self.i;
        (left, Some(left))
    }
}

fn random_weights<S: Scalar, R: RngCore + CryptoRng>(count: usize, rng: &mut R) -> Vec<S> {
    (0..count)
        .map(|_| loop {
            let y = S::random(rng);
            if !y.is_zero() {
                break y;
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::errors::*;
    use crate::fixtures::{commit_phase, mint, prove, shift_by_serial};
    use crate::proofs::*;
    use crate::ristretto::ristretto_verifier;
    use curve25519_dalek::ristretto::RistrettoPoint;
    use curve25519_dalek::scalar::Scalar;
    use curve25519_dalek::traits::Identity;
    use rand::rngs::{OsRng, StdRng};
    use rand::SeedableRng;

    // A set whose member at index `l` opens to `v*h[0] + r*h[1]`
    fn random_set<R: rand::RngCore + rand::CryptoRng>(
        verifier: &SigmaPlusVerifier<RistrettoPoint>,
        size: usize,
        l: usize,
        v: &Scalar,
        r: &Scalar,
        rng: &mut R,
    ) -> Vec<RistrettoPoint> {
        let h = verifier.blinding_generators();
        let mut set = (1..size)
            .map(|_| RistrettoPoint::random(rng))
            .collect::<Vec<RistrettoPoint>>();
        set.insert(l, h[0] * v + h[1] * r);
        set
    }

    #[test]
    fn verify_every_index() {
        let verifier = ristretto_verifier(2, 3).unwrap();
        for l in 0..verifier.max_set_size() {
            let v = Scalar::random(&mut OsRng);
            let r = Scalar::random(&mut OsRng);
            let set = random_set(&verifier, verifier.max_set_size(), l, &v, &r, &mut OsRng);
            let proof = prove(&verifier, &set, l, &v, &r, &mut OsRng).unwrap();
            assert!(verifier.verify(&set, &proof));
        }
    }

    #[test]
    fn verify_nary_digits() {
        // Exercises rows with more than one stored response per digit
        let verifier = ristretto_verifier(3, 2).unwrap();
        for l in 0..verifier.max_set_size() {
            let v = Scalar::random(&mut OsRng);
            let r = Scalar::random(&mut OsRng);
            let set = random_set(&verifier, verifier.max_set_size(), l, &v, &r, &mut OsRng);
            let proof = prove(&verifier, &set, l, &v, &r, &mut OsRng).unwrap();
            assert!(verifier.verify(&set, &proof));
        }
    }

    #[test]
    fn verify_partial_set() {
        let verifier = ristretto_verifier(2, 3).unwrap();
        let l = 2;
        let v = Scalar::random(&mut OsRng);
        let r = Scalar::random(&mut OsRng);
        let set = random_set(&verifier, 5, l, &v, &r, &mut OsRng);
        let proof = prove(&verifier, &set, l, &v, &r, &mut OsRng).unwrap();
        assert!(verifier.verify(&set, &proof));

        // Any change to the set breaks the proof
        let mut modified = set.clone();
        modified[4] = RistrettoPoint::random(&mut OsRng);
        assert!(!verifier.verify(&modified, &proof));
    }

    #[test]
    fn spend_scenario() {
        // n = 2, m = 3: eight coins, spend the one at index 3
        let mut rng = StdRng::seed_from_u64(42);
        let verifier = ristretto_verifier(2, 3).unwrap();
        let l = 3;
        let openings = (0..8)
            .map(|_| {
                (
                    Scalar::random(&mut rng),
                    Scalar::random(&mut rng),
                    Scalar::random(&mut rng),
                )
            })
            .collect::<Vec<_>>();
        let coins = openings
            .iter()
            .map(|(s, v, r)| mint(&verifier, s, v, r))
            .collect::<Vec<RistrettoPoint>>();

        let (s, v, r) = openings[l];
        let set = shift_by_serial(&verifier, &coins, &s);
        let proof = prove(&verifier, &set, l, &v, &r, &mut rng).unwrap();
        assert!(verifier.verify(&set, &proof));

        // Corrupting one byte of zV must be fatal
        let mut bytes = proof.to_bytes();
        let zv_offset = verifier.proof_size() - 64;
        bytes[zv_offset] ^= 1;
        let corrupted = verifier.decode_proof(&bytes).unwrap();
        assert!(!verifier.verify(&set, &corrupted));
    }

    #[test]
    fn bit_flips_are_fatal() {
        let mut rng = StdRng::seed_from_u64(7);
        let verifier = ristretto_verifier(2, 3).unwrap();
        let l = 5;
        let v = Scalar::random(&mut rng);
        let r = Scalar::random(&mut rng);
        let set = random_set(&verifier, verifier.max_set_size(), l, &v, &r, &mut rng);
        let proof = prove(&verifier, &set, l, &v, &r, &mut rng).unwrap();
        let bytes = proof.to_bytes();

        // One flip at the start of every field region
        for &offset in &[0, 32, 64, 96, 128, 224, 320, 416, 448, 480, 512] {
            for bit in &[0x01u8, 0x80u8] {
                let mut tampered = bytes.clone();
                tampered[offset] ^= bit;
                match verifier.decode_proof(&tampered) {
                    Ok(p) => assert!(!verifier.verify(&set, &p)),
                    Err(e) => assert_eq!(e, ProofError::DecodingFailed),
                }
            }
        }
    }

    #[test]
    fn challenge_binds_commitments() {
        let verifier = ristretto_verifier(2, 3).unwrap();
        let v = Scalar::random(&mut OsRng);
        let r = Scalar::random(&mut OsRng);
        let set = random_set(&verifier, 8, 1, &v, &r, &mut OsRng);
        let proof = prove(&verifier, &set, 1, &v, &r, &mut OsRng).unwrap();

        let x = verifier.challenge(&proof);
        assert_eq!(x, verifier.challenge(&proof.clone()));

        let mut other = proof.clone();
        other.A = RistrettoPoint::random(&mut OsRng);
        assert_ne!(x, verifier.challenge(&other));

        let mut other = proof.clone();
        other.Gk[0] = RistrettoPoint::random(&mut OsRng);
        assert_ne!(x, verifier.challenge(&other));
    }

    #[test]
    fn degenerate_response_rejected() {
        let verifier = ristretto_verifier(2, 3).unwrap();
        let v = Scalar::random(&mut OsRng);
        let r = Scalar::random(&mut OsRng);
        let set = random_set(&verifier, 8, 0, &v, &r, &mut OsRng);
        let mut proof = prove(&verifier, &set, 0, &v, &r, &mut OsRng).unwrap();

        let x = verifier.challenge(&proof);
        proof.f[0] = x;
        assert_eq!(
            verifier.check(&set, &x, &proof).unwrap_err(),
            ProofError::DegenerateResponse
        );
        assert!(!verifier.verify(&set, &proof));
    }

    #[test]
    fn membership_rejections() {
        let verifier = ristretto_verifier(2, 3).unwrap();
        let v = Scalar::random(&mut OsRng);
        let r = Scalar::random(&mut OsRng);
        let set = random_set(&verifier, 8, 4, &v, &r, &mut OsRng);
        let proof = prove(&verifier, &set, 4, &v, &r, &mut OsRng).unwrap();
        let x = verifier.challenge(&proof);
        assert!(verifier.check(&set, &x, &proof).is_ok());

        let mut p = proof.clone();
        p.A = Identity::identity();
        assert_eq!(
            verifier.check(&set, &x, &p).unwrap_err(),
            ProofError::InvalidPoint
        );

        let mut p = proof.clone();
        p.Qk[2] = Identity::identity();
        assert_eq!(
            verifier.check(&set, &x, &p).unwrap_err(),
            ProofError::InvalidPoint
        );

        let mut p = proof.clone();
        p.ZA = Scalar::zero();
        assert_eq!(
            verifier.check(&set, &x, &p).unwrap_err(),
            ProofError::InvalidScalar
        );

        let mut p = proof.clone();
        p.f[1] = Scalar::zero();
        assert_eq!(
            verifier.check(&set, &x, &p).unwrap_err(),
            ProofError::InvalidScalar
        );
    }

    #[test]
    fn shape_rejections() {
        let verifier = ristretto_verifier(2, 3).unwrap();
        let v = Scalar::random(&mut OsRng);
        let r = Scalar::random(&mut OsRng);
        let set = random_set(&verifier, 8, 0, &v, &r, &mut OsRng);
        let proof = prove(&verifier, &set, 0, &v, &r, &mut OsRng).unwrap();
        let x = verifier.challenge(&proof);

        let mut p = proof.clone();
        p.f.pop();
        assert_eq!(
            verifier.check(&set, &x, &p).unwrap_err(),
            ProofError::InvalidProofSize
        );

        let mut p = proof.clone();
        p.Gk.pop();
        assert_eq!(
            verifier.check(&set, &x, &p).unwrap_err(),
            ProofError::InvalidProofSize
        );

        assert_eq!(
            verifier.check(&[], &x, &proof).unwrap_err(),
            ProofError::SetIsTooSmall
        );

        let mut oversized = set.clone();
        oversized.push(RistrettoPoint::random(&mut OsRng));
        assert_eq!(
            verifier.check(&oversized, &x, &proof).unwrap_err(),
            ProofError::SetIsTooLarge
        );
    }

    #[test]
    fn failure_stages_are_distinguishable() {
        let verifier = ristretto_verifier(2, 3).unwrap();
        let v = Scalar::random(&mut OsRng);
        let r = Scalar::random(&mut OsRng);
        let set = random_set(&verifier, 8, 6, &v, &r, &mut OsRng);
        let proof = prove(&verifier, &set, 6, &v, &r, &mut OsRng).unwrap();
        let x = verifier.challenge(&proof);

        // A response or ZA/ZC tamper trips the commitment identity
        let mut p = proof.clone();
        p.ZA = p.ZA + Scalar::one();
        assert_eq!(
            verifier.check(&set, &x, &p).unwrap_err(),
            ProofError::ConsistencyCheckFailed
        );
        let mut p = proof.clone();
        p.f[0] = p.f[0] + Scalar::one();
        assert_eq!(
            verifier.check(&set, &x, &p).unwrap_err(),
            ProofError::ConsistencyCheckFailed
        );

        // zV and zR only appear in the final equation
        let mut p = proof.clone();
        p.zV = p.zV + Scalar::one();
        assert_eq!(
            verifier.check(&set, &x, &p).unwrap_err(),
            ProofError::VerificationFailed
        );
        let mut p = proof.clone();
        p.zR = p.zR + Scalar::one();
        assert_eq!(
            verifier.check(&set, &x, &p).unwrap_err(),
            ProofError::VerificationFailed
        );
    }

    #[test]
    fn wire_round_trip() {
        let verifier = ristretto_verifier(3, 2).unwrap();
        let v = Scalar::random(&mut OsRng);
        let r = Scalar::random(&mut OsRng);
        let set = random_set(&verifier, 9, 5, &v, &r, &mut OsRng);
        let proof = prove(&verifier, &set, 5, &v, &r, &mut OsRng).unwrap();

        let bytes = proof.to_bytes();
        assert_eq!(bytes.len(), verifier.proof_size());
        assert_eq!(verifier.decode_proof(&bytes).unwrap(), proof);

        assert_eq!(
            verifier.decode_proof(&bytes[..bytes.len() - 1]).unwrap_err(),
            ProofError::DecodingFailed
        );

        // A non-canonical scalar encoding is rejected
        let mut bad = bytes.clone();
        let zr_offset = bad.len() - 32;
        for b in &mut bad[zr_offset..] {
            *b = 0xff;
        }
        assert_eq!(
            verifier.decode_proof(&bad).unwrap_err(),
            ProofError::DecodingFailed
        );

        assert_eq!(
            SigmaPlusProof::<RistrettoPoint>::from_bytes(&bytes, 1, 2).unwrap_err(),
            ProofError::RadixTooSmall
        );
        assert_eq!(
            SigmaPlusProof::<RistrettoPoint>::from_bytes(&bytes, 3, 0).unwrap_err(),
            ProofError::TooFewDigits
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde() {
        let verifier = ristretto_verifier(2, 3).unwrap();
        let v = Scalar::random(&mut OsRng);
        let r = Scalar::random(&mut OsRng);
        let set = random_set(&verifier, 8, 2, &v, &r, &mut OsRng);
        let proof = prove(&verifier, &set, 2, &v, &r, &mut OsRng).unwrap();

        let serialized = serde_cbor::to_vec(&proof).unwrap();
        let proof: SigmaPlusProof<RistrettoPoint> =
            serde_cbor::from_slice(&serialized[..]).unwrap();
        assert!(verifier.verify(&set, &proof));
    }

    #[test]
    fn batch_verify_spends() {
        let mut rng = StdRng::seed_from_u64(99);
        let verifier = ristretto_verifier(2, 3).unwrap();
        let openings = (0..8)
            .map(|_| {
                (
                    Scalar::random(&mut rng),
                    Scalar::random(&mut rng),
                    Scalar::random(&mut rng),
                )
            })
            .collect::<Vec<_>>();
        let coins = openings
            .iter()
            .map(|(s, v, r)| mint(&verifier, s, v, r))
            .collect::<Vec<RistrettoPoint>>();

        // Three spends answer one challenge fixed by the outer context
        let spenders = [1usize, 4, 6];
        let pending = spenders
            .iter()
            .map(|&l| {
                let (s, v, r) = openings[l];
                let set = shift_by_serial(&verifier, &coins, &s);
                commit_phase(&verifier, &set, l, &v, &r, &mut rng).unwrap()
            })
            .collect::<Vec<_>>();
        let x = Scalar::random(&mut rng);
        let proofs = pending.iter().map(|p| p.respond(&x)).collect::<Vec<_>>();
        let serials = spenders
            .iter()
            .map(|&l| openings[l].0)
            .collect::<Vec<Scalar>>();

        assert!(verifier.batch_verify_with_rng(&coins, &x, &serials, &proofs, &mut rng));
        assert!(verifier.batch_verify_deterministic(&coins, &x, &serials, &proofs));

        // A wrong serial unbinds its proof from the claimed spend
        let mut swapped = serials.clone();
        swapped.swap(0, 1);
        assert!(!verifier.batch_verify_with_rng(&coins, &x, &swapped, &proofs, &mut rng));
        assert!(!verifier.batch_verify_deterministic(&coins, &x, &swapped, &proofs));

        // One bad proof fails the whole batch
        let mut tampered = proofs.clone();
        tampered[2].zR = tampered[2].zR + Scalar::one();
        assert!(!verifier.batch_verify_with_rng(&coins, &x, &serials, &tampered, &mut rng));
        assert_eq!(
            verifier
                .batch_check(
                    &coins,
                    &x,
                    &serials,
                    &tampered,
                    &[Scalar::one(), Scalar::one(), Scalar::one()]
                )
                .unwrap_err(),
            ProofError::VerificationFailed
        );
    }

    #[test]
    fn batch_of_one_matches_single() {
        let mut rng = StdRng::seed_from_u64(3);
        let verifier = ristretto_verifier(2, 3).unwrap();
        let v = Scalar::random(&mut rng);
        let r = Scalar::random(&mut rng);
        let set = random_set(&verifier, verifier.max_set_size(), 5, &v, &r, &mut rng);
        let pending = commit_phase(&verifier, &set, 5, &v, &r, &mut rng).unwrap();
        let x = pending.challenge(&verifier);
        let proof = pending.respond(&x);
        let serial = [Scalar::zero()];

        assert!(verifier.verify_with_challenge(&set, &x, &proof));
        assert!(verifier.batch_verify_with_rng(
            &set,
            &x,
            &serial,
            core::slice::from_ref(&proof),
            &mut rng
        ));

        let mut bad = proof.clone();
        bad.zV = bad.zV + Scalar::one();
        assert!(!verifier.verify_with_challenge(&set, &x, &bad));
        assert!(!verifier.batch_verify_with_rng(
            &set,
            &x,
            &serial,
            core::slice::from_ref(&bad),
            &mut rng
        ));
    }

    #[test]
    fn batch_partial_set_padded_by_last_member() {
        // The prover pads a 6-coin set to full capacity by repeating the
        // last coin; the aggregate's tail coefficient folds the padding back
        let mut rng = StdRng::seed_from_u64(11);
        let verifier = ristretto_verifier(2, 3).unwrap();
        let openings = (0..6)
            .map(|_| {
                (
                    Scalar::random(&mut rng),
                    Scalar::random(&mut rng),
                    Scalar::random(&mut rng),
                )
            })
            .collect::<Vec<_>>();
        let coins = openings
            .iter()
            .map(|(s, v, r)| mint(&verifier, s, v, r))
            .collect::<Vec<RistrettoPoint>>();

        let l = 2;
        let (s, v, r) = openings[l];
        let mut padded = coins.clone();
        while padded.len() < verifier.max_set_size() {
            padded.push(coins[coins.len() - 1]);
        }
        let set = shift_by_serial(&verifier, &padded, &s);
        let pending = commit_phase(&verifier, &set, l, &v, &r, &mut rng).unwrap();
        let x = Scalar::random(&mut rng);
        let proof = pending.respond(&x);

        assert!(verifier.batch_verify_with_rng(
            &coins,
            &x,
            &[s],
            core::slice::from_ref(&proof),
            &mut rng
        ));
    }

    #[test]
    fn batch_input_rejections() {
        let mut rng = StdRng::seed_from_u64(5);
        let verifier = ristretto_verifier(2, 3).unwrap();
        let v = Scalar::random(&mut rng);
        let r = Scalar::random(&mut rng);
        let set = random_set(&verifier, verifier.max_set_size(), 0, &v, &r, &mut rng);
        let pending = commit_phase(&verifier, &set, 0, &v, &r, &mut rng).unwrap();
        let x = pending.challenge(&verifier);
        let proofs = [pending.respond(&x)];
        let serials = [Scalar::zero()];

        // Empty anonymity set
        assert!(!verifier.batch_verify_with_rng(&[], &x, &serials, &proofs, &mut rng));
        assert_eq!(
            verifier
                .batch_check(&[], &x, &serials, &proofs, &[Scalar::one()])
                .unwrap_err(),
            ProofError::SetIsTooSmall
        );

        // Serial count must match the proof count
        assert!(!verifier.batch_verify_with_rng(&set, &x, &[], &proofs, &mut rng));
        assert_eq!(
            verifier
                .batch_check(&set, &x, &[], &proofs, &[Scalar::one()])
                .unwrap_err(),
            ProofError::SerialCountMismatch
        );

        // Weights must be present and nonzero
        assert_eq!(
            verifier
                .batch_check(&set, &x, &serials, &proofs, &[])
                .unwrap_err(),
            ProofError::InvalidWeight
        );
        assert_eq!(
            verifier
                .batch_check(&set, &x, &serials, &proofs, &[Scalar::zero()])
                .unwrap_err(),
            ProofError::InvalidWeight
        );
    }

    #[test]
    fn verifier_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SigmaPlusVerifier<RistrettoPoint>>();
        assert_send_sync::<SigmaPlusProof<RistrettoPoint>>();
    }
}
