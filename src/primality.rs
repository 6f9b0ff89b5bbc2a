//! Classical probabilistic primality tests.
//!
//! Miller-Rabin and Baillie-PSW share the deterministic [screen] with the
//! Frobenius test; the surrounding test suite uses them to cross-validate
//! RQFT verdicts. Their internals are conventional.

use crate::frobenius::{screen, split_odd, split_odd_plus_one};
use crate::lucas::lucas_uv;
use crate::traits::{ModInt, Primality, PrimalityBase, PrimalityRefBase};
use rand::{thread_rng, Rng};

/// Strong-probable-prime test with k random bases, using the process-wide
/// PRNG.
pub fn miller_rabin<T: PrimalityBase>(n: &T, k: usize) -> Primality
where
    for<'r> &'r T: PrimalityRefBase<T>,
{
    miller_rabin_with_rng(n, k, &mut thread_rng())
}

/// [miller_rabin] with a caller-owned PRNG.
pub fn miller_rabin_with_rng<T: PrimalityBase, R: Rng>(n: &T, k: usize, rng: &mut R) -> Primality
where
    for<'r> &'r T: PrimalityRefBase<T>,
{
    let result = screen(n);
    if result != Primality::ProbablyPrime {
        return result;
    }

    let one = T::one();
    let two = &one + &one;
    let hi = n - &two;
    let nm1 = n - &one;
    let (s, d) = split_odd(n - &one);

    for _ in 0..k {
        let base = T::random_range(rng, &two, &hi);
        if miller_rabin_base(n, &base, s, &d, &nm1) == Primality::Composite {
            return Primality::Composite;
        }
    }
    Primality::ProbablyPrime
}

/// One strong-probable-prime round for a fixed base, given
/// n - 1 = 2^s·d with d odd.
fn miller_rabin_base<T: PrimalityBase>(n: &T, base: &T, s: usize, d: &T, nm1: &T) -> Primality
where
    for<'r> &'r T: PrimalityRefBase<T>,
{
    let mut x = base.powm(d, n);
    if x.is_one() || &x == nm1 {
        return Primality::ProbablyPrime;
    }
    for _ in 1..s {
        x = (&x).mulm(&x, n);
        if x.is_one() {
            // a non-trivial square root of 1
            return Primality::Composite;
        }
        if &x == nm1 {
            return Primality::ProbablyPrime;
        }
    }
    Primality::Composite
}

enum SelfridgeSearch<T> {
    Found(T, T),
    Composite,
    GaveUp,
}

/// Selfridge's method A: try D = 5, -7, 9, -11, ... until (D | n) = -1 and
/// return P = 1, Q = (1 - D)/4 as residues mod n. A zero symbol means a
/// shared factor with the screened n, hence composite. The search is capped
/// like the original's; a non-square n hitting the cap is treated optimistically.
fn selfridge_params<T: PrimalityBase>(n: &T) -> SelfridgeSearch<T>
where
    for<'r> &'r T: PrimalityRefBase<T>,
{
    let mut d = 5i64;
    while d.abs() < 0xff_ffff {
        let d_mod = if d >= 0 {
            T::from_i64(d).unwrap() % n
        } else {
            (&(T::from_i64(-d).unwrap() % n)).negm(n)
        };
        match (&d_mod).jacobi(n) {
            0 => return SelfridgeSearch::Composite,
            -1 => {
                let q = (1 - d) / 4;
                let q_mod = if q >= 0 {
                    T::from_i64(q).unwrap() % n
                } else {
                    (&(T::from_i64(-q).unwrap() % n)).negm(n)
                };
                return SelfridgeSearch::Found(T::one(), q_mod);
            }
            _ => {}
        }
        d = if d > 0 { -(d + 2) } else { -(d - 2) };
    }
    SelfridgeSearch::GaveUp
}

/// Strong Lucas test for parameters with (D | n) = -1, so that the Lucas
/// sequences have period dividing n + 1 when n is prime.
fn strong_lucas<T: PrimalityBase>(n: &T, p: &T, q: &T) -> Primality
where
    for<'r> &'r T: PrimalityRefBase<T>,
{
    let one = T::one();

    // P = 1 and D are coprime to n by construction, but Q might not be
    let g = q.gcd(n);
    if g > one && &g < n {
        return Primality::Composite;
    }

    // n + 1 = 2^r·s, without materializing n + 1
    let (r, s) = split_odd_plus_one(n);
    let (u, mut v, mut qk) = lucas_uv(n, p, q, &s);
    if u.is_zero() || v.is_zero() {
        return Primality::ProbablyPrime;
    }
    for _ in 1..r {
        // V(2k) = V(k)² - 2Q^k
        v = (&v).mulm(&v, n).subm(&(&qk).addm(&qk, n), n);
        qk = (&qk).mulm(&qk, n);
        if v.is_zero() {
            return Primality::ProbablyPrime;
        }
    }
    Primality::Composite
}

/// The Baillie-PSW test: a base-2 strong-probable-prime test followed by a
/// strong Lucas test with Selfridge parameters. No composite below 2^64 is
/// known to pass both stages.
pub fn baillie_psw<T: PrimalityBase>(n: &T) -> Primality
where
    for<'r> &'r T: PrimalityRefBase<T>,
{
    let result = screen(n);
    if result != Primality::ProbablyPrime {
        return result;
    }

    let one = T::one();
    let two = &one + &one;
    let nm1 = n - &one;
    let (s, d) = split_odd(n - &one);
    if miller_rabin_base(n, &two, s, &d, &nm1) == Primality::Composite {
        return Primality::Composite;
    }

    match selfridge_params(n) {
        SelfridgeSearch::Found(p, q) => strong_lucas(n, &p, &q),
        SelfridgeSearch::Composite => Primality::Composite,
        SelfridgeSearch::GaveUp => Primality::ProbablyPrime,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frobenius::rqft_with_rng;
    use rand::SeedableRng;

    const LARGE_PRIMES: [u64; 7] = [
        2147483647,
        2147483659,
        2500000001,
        2500000033,
        2500000039,
        2500000043,
        2500000057,
    ];

    // semiprimes whose factors all exceed the table bound, so every one of
    // them survives the screen and exercises the probabilistic stages
    const LARGE_COMPOSITES: [u64; 4] = [
        46337 * 46349,
        46337 * 46381,
        46349 * 46439,
        46381 * 46447,
    ];

    #[test]
    fn miller_rabin_vectors() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(30);
        for p in LARGE_PRIMES.iter() {
            assert!(miller_rabin_with_rng(p, 5, &mut rng).probably(), "n={}", p);
        }
        for c in LARGE_COMPOSITES.iter() {
            assert_eq!(
                miller_rabin_with_rng(c, 5, &mut rng),
                Primality::Composite,
                "n={}",
                c
            );
        }
        // screened inputs short-circuit
        assert_eq!(miller_rabin(&7u64, 1), Primality::Prime);
        assert_eq!(miller_rabin(&9u64, 1), Primality::Composite);
    }

    #[test]
    fn baillie_psw_vectors() {
        for p in LARGE_PRIMES.iter() {
            assert!(baillie_psw(p).probably(), "n={}", p);
        }
        for c in LARGE_COMPOSITES.iter() {
            assert_eq!(baillie_psw(c), Primality::Composite, "n={}", c);
        }
        assert_eq!(baillie_psw(&131071u64), Primality::Prime);
        assert_eq!(baillie_psw(&(50021u64 * 50021)), Primality::Composite);
    }

    #[test]
    fn tests_cross_validate() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(31);
        for p in LARGE_PRIMES.iter() {
            let frobenius = rqft_with_rng(p, 1, &mut rng);
            let mr = miller_rabin_with_rng(p, 1, &mut rng);
            let bpsw = baillie_psw(p);
            assert!(frobenius.probably() && mr.probably() && bpsw.probably());
        }
        for c in LARGE_COMPOSITES.iter() {
            assert_eq!(rqft_with_rng(c, 2, &mut rng), Primality::Composite);
            assert_eq!(baillie_psw(c), Primality::Composite);
            assert_eq!(
                miller_rabin_with_rng(c, 5, &mut rng),
                Primality::Composite
            );
        }
    }

    #[cfg(feature = "num-bigint")]
    #[test]
    fn baillie_psw_bigint() {
        use num_bigint::BigUint;
        for p in LARGE_PRIMES.iter() {
            assert!(baillie_psw(&BigUint::from(*p)).probably());
        }
        for c in LARGE_COMPOSITES.iter() {
            assert_eq!(baillie_psw(&BigUint::from(*c)), Primality::Composite);
        }
        // product of two 2^31-scale primes
        let n = BigUint::from(2147483659u64) * 2147483693u64;
        assert_eq!(baillie_psw(&n), Primality::Composite);
    }
}
