//! Lucas-sequence exponentiation.
//!
//! Computing x^k in ℤ/nℤ[x]/(x² - b·x - c) does not need full polynomial
//! arithmetic: writing x^k = U_k·x + c·U_{k-1} in terms of the Lucas
//! sequences U, V of (b, -c) turns each exponent bit into a handful of
//! scalar multiplications, roughly halving the work of generic
//! square-and-multiply on ring elements. The same doubling/chain-addition
//! discipline over (U, V, Qᵏ) also drives the strong Lucas stage of
//! Baillie-PSW.

use crate::ring::{Modulus, RingElement};
use crate::traits::{ModInt, PrimalityBase, PrimalityRefBase};

/// The inverse of 2 modulo the odd n, i.e. (n + 1) / 2, computed without
/// forming n + 1 so the fixed-width back end cannot overflow.
fn half_mod<T: PrimalityBase>(n: &T) -> T
where
    for<'r> &'r T: PrimalityRefBase<T>,
{
    debug_assert!(n.is_odd());
    (n >> 1) + T::one()
}

/// Compute x^k as a [RingElement], for the modulus triple (n, b, c).
///
/// Walks the bits of k from the second-most-significant bit down, carrying
/// the accumulator (A, B, C) = (V_j, U_j, c^j) seeded at j = 1. A doubling
/// step costs three scalar squarings; when the current bit is set, a
/// chain-addition step advances j by one using two divisions by 2 (done as
/// multiplications by the precomputed inverse of 2). The parity of j decides
/// the sign in V_{2j} = V_j² - 2(-c)^j, so it is tracked alongside.
pub fn power_of_x<T: PrimalityBase>(m: &Modulus<T>, k: &T) -> RingElement<T>
where
    for<'r> &'r T: PrimalityRefBase<T>,
{
    let n = &m.n;
    if k.is_zero() {
        return m.one();
    }

    let half = half_mod(n);
    let disc = m.discriminant();

    // j = 1: (A, B, C) = (V₁, U₁, c¹) = (b, 1, c)
    let mut a = m.b.clone();
    let mut u = T::one();
    let mut q = m.c.clone();
    let mut j_even = false;

    for i in (0..k.bits() - 1).rev() {
        // (A, B, C) ← (A² ∓ 2C, A·B, C²), sign by the parity of j
        let aa = (&a).mulm(&a, n);
        let two_q = (&q).addm(&q, n);
        let doubled = if j_even {
            (&aa).subm(&two_q, n)
        } else {
            (&aa).addm(&two_q, n)
        };
        u = (&a).mulm(&u, n);
        q = (&q).mulm(&q, n);
        a = doubled;
        j_even = true;

        if k.bit(i) {
            // (A, B, C) ← ((D·B + b·A)/2, (b·B + A)/2, c·C)
            let next_u = (&m.b).mulm(&u, n).addm(&a, n).mulm(&half, n);
            let next_a = (&disc).mulm(&u, n).addm(&(&m.b).mulm(&a, n), n).mulm(&half, n);
            q = (&m.c).mulm(&q, n);
            a = next_a;
            u = next_u;
            j_even = false;
        }
    }

    // x^k = U_k·x + c·U_{k-1} and 2c·U_{k-1} = V_k - b·U_k
    let e = (&a).subm(&(&m.b).mulm(&u, n), n).mulm(&half, n);
    RingElement { d: u, e }
}

/// Compute (U_k, V_k, Q^k) modulo n for the Lucas sequences of (p, q),
/// with k ≥ 1.
///
/// Same bit-driven doubling/chain-addition walk as [power_of_x], carried
/// over (U, V, Qᵏ): doubling maps (U, V) to (U·V, V² - 2Qᵏ) and a set bit
/// advances by one index through ((p·U + V)/2, (D·U + p·V)/2) with
/// D = p² - 4q.
pub(crate) fn lucas_uv<T: PrimalityBase>(n: &T, p: &T, q: &T, k: &T) -> (T, T, T)
where
    for<'r> &'r T: PrimalityRefBase<T>,
{
    debug_assert!(!k.is_zero());

    let half = half_mod(n);
    let four = T::from_u8(4).unwrap();
    let d = p.mulm(p, n).subm(&(&four).mulm(q, n), n);
    let qm = q % n;

    // k's top bit: (U₁, V₁, Q¹)
    let mut u = T::one();
    let mut v = p % n;
    let mut qk = qm.clone();

    for i in (0..k.bits() - 1).rev() {
        let uv = (&u).mulm(&v, n);
        v = (&v).mulm(&v, n).subm(&(&qk).addm(&qk, n), n);
        u = uv;
        qk = (&qk).mulm(&qk, n);

        if k.bit(i) {
            let next_u = p.mulm(&u, n).addm(&v, n).mulm(&half, n);
            let next_v = (&d).mulm(&u, n).addm(&p.mulm(&v, n), n).mulm(&half, n);
            qk = (&qk).mulm(&qm, n);
            u = next_u;
            v = next_v;
        }
    }

    (u, v, qk)
}
