//! The quadratic Frobenius test (QFT) and its randomized variant (RQFT).
//!
//! The test works in ℤ/nℤ[x]/(x² - b·x - c) for parameters with
//! (b² + 4c | n) = -1 and (-c | n) = 1. For prime n that ring is the field
//! with n² elements, forcing x^((n+1)/2) into ℤ/nℤ with square -c and making
//! n² - 1 = 2^r·s behave like the Miller-Rabin decomposition; a composite n
//! violating any of these is caught. Steps 1-2 ([screen]) are a
//! deterministic pre-filter shared with the classical tests.

use crate::lucas::power_of_x;
use crate::ring::Modulus;
use crate::tables::{SMALL_PRIMES, TRIAL_BOUND};
use crate::traits::{
    BitTest, FrobeniusConfig, ModInt, Primality, PrimalityBase, PrimalityRefBase,
};
use rand::{thread_rng, Rng};

/// Steps 1-2: the deterministic compositeness filter.
///
/// Returns `Composite` when n is divisible by a tabulated prime or is a
/// perfect square, and `Prime` when trial division by every prime up to √n
/// succeeds (possible whenever n is below the square of the table bound).
/// Everything larger gets `ProbablyPrime` and is left to the probabilistic
/// stages. Even n are special-cased: `Prime` iff n = 2.
pub fn screen<T: PrimalityBase>(n: &T) -> Primality
where
    for<'r> &'r T: PrimalityRefBase<T>,
{
    let two = T::one() + T::one();
    if n < &two {
        return Primality::Composite;
    }
    if n.is_even() {
        return if n == &two {
            Primality::Prime
        } else {
            Primality::Composite
        };
    }

    // below the table bound the lookup is already decisive
    if let Some(v) = n.to_u64() {
        if v < TRIAL_BOUND {
            return match SMALL_PRIMES.binary_search(&(v as u16)) {
                Ok(_) => Primality::Prime,
                Err(_) => Primality::Composite,
            };
        }
    }

    if n.is_square() {
        return Primality::Composite;
    }

    let sqrt = n.sqrt();
    for &p in SMALL_PRIMES.iter() {
        let p = T::from_u16(p).unwrap();
        if p > sqrt {
            // no prime divisor up to √n, so none at all
            return Primality::Prime;
        }
        if (n % &p).is_zero() {
            return Primality::Composite;
        }
    }

    // table exhausted; only decisive if it reached √n
    if sqrt < T::from_u64(TRIAL_BOUND).unwrap() {
        Primality::Prime
    } else {
        Primality::ProbablyPrime
    }
}

/// v = 2^r·s with s odd. An even s would mean broken integer primitives,
/// not a property of the tested number, and aborts.
pub(crate) fn split_odd<T: PrimalityBase>(v: T) -> (usize, T)
where
    for<'r> &'r T: PrimalityRefBase<T>,
{
    let r = BitTest::trailing_zeros(&v);
    let s = &v >> r;
    assert!(s.is_odd(), "split produced an even odd part");
    (r, s)
}

/// n + 1 = 2^r·s with s odd, without materializing n + 1, which the
/// fixed-width back end could not represent for the largest n.
pub(crate) fn split_odd_plus_one<T: PrimalityBase>(n: &T) -> (usize, T)
where
    for<'r> &'r T: PrimalityRefBase<T>,
{
    let bits = n.bits();
    let mut r = 0;
    while r < bits && n.bit(r) {
        r += 1;
    }
    // all-ones n means n + 1 = 2^bits
    let s = if r == bits {
        T::one()
    } else {
        (n >> r) + T::one()
    };
    assert!(s.is_odd(), "split produced an even odd part");
    (r, s)
}

enum ParamSearch<T> {
    Found(T, T),
    Composite,
    Exhausted,
}

/// Draw (b, c) uniformly from [2, n-2] until (b² + 4c | n) = -1 and
/// (-c | n) = 1. A non-trivial gcd of b, c or b² + 4c with n is a proper
/// factor and short-circuits to a composite verdict.
fn search_params<T: PrimalityBase, R: Rng>(n: &T, trials: usize, rng: &mut R) -> ParamSearch<T>
where
    for<'r> &'r T: PrimalityRefBase<T>,
{
    let one = T::one();
    let two = &one + &one;
    let four = &two + &two;
    let hi = n - &two;

    for _ in 0..trials {
        let b = T::random_range(rng, &two, &hi);
        let c = T::random_range(rng, &two, &hi);

        let bb4c = (&b).mulm(&b, n).addm(&(&four).mulm(&c, n), n);
        if (&bb4c).jacobi(n) != -1 {
            continue;
        }
        if (&c).negm(n).jacobi(n) != 1 {
            continue;
        }

        let divisors = [bb4c.gcd(n), b.gcd(n), c.gcd(n)];
        if divisors.iter().any(|g| g > &one && g < n) {
            return ParamSearch::Composite;
        }
        return ParamSearch::Found(b, c);
    }
    ParamSearch::Exhausted
}

/// Steps 3-5 for parameters that passed the Jacobi preconditions.
///
/// Only one Lucas-chain exponentiation is spent: with s' the odd part of
/// n ∓ 1 (sign by n mod 4), x^t for t = (s'-1)/2 yields x^s' = (x^t)²·x, and
/// repeated squaring reaches w = x^((n+1)/2). After step 3 certifies that w
/// is a scalar, the step-5 value x^s for n² - 1 = 2^r·s follows from w by a
/// scalar powmod — times the inverse of x^s' when n ≡ 3 (mod 4), where the
/// σ-based [Modulus::invert] either succeeds or exposes a zero divisor,
/// proving n composite.
fn qft_steps_3_5<T: PrimalityBase>(m: &Modulus<T>) -> Primality
where
    for<'r> &'r T: PrimalityRefBase<T>,
{
    let n = &m.n;
    let one = T::one();
    // for odd n, bit 1 distinguishes n ≡ 3 from n ≡ 1 (mod 4)
    let three_mod_four = n.bit(1);

    let (rp, sp) = if three_mod_four {
        split_odd_plus_one(n)
    } else {
        split_odd(n - &one)
    };
    let t = &sp >> 1;

    let xt = power_of_x(m, &t);
    let y = m.mul_by_x(&m.square(&xt)); // x^s'

    let mut w = y.clone();
    for _ in 1..rp {
        w = m.square(&w);
    }
    if !three_mod_four {
        // the chain ran through x^((n-1)/2); one more factor of x
        w = m.mul_by_x(&w);
    }

    // step 3: x^((n+1)/2) must lie in ℤ/nℤ
    if !w.d.is_zero() {
        return Primality::Composite;
    }

    // step 4: x^(n+1) = (x^((n+1)/2))² must be ≡ -c
    if (&w.e).mulm(&w.e, n) != (&m.c).negm(n) {
        return Primality::Composite;
    }

    // step 5: n² - 1 = 2^r·s with r = rp + 1, s = s'·(n ∓ 1)/2, so
    // x^s = w^s'·(x^s')⁻¹ for n ≡ 3 and x^s = w^s' for n ≡ 1 (mod 4)
    let ws = (&w.e).powm(&sp, n);
    let mut f = if three_mod_four {
        match m.invert(&y) {
            Some(y_inv) => m.mul(&m.scalar(ws), &y_inv),
            None => return Primality::Composite,
        }
    } else {
        m.scalar(ws)
    };

    if f == m.one() {
        return Primality::ProbablyPrime;
    }
    let minus_one = m.minus_one();
    for _ in 0..rp {
        // x^(2^j·s) ≡ -1 for some 0 ≤ j ≤ r-2
        if f == minus_one {
            return Primality::ProbablyPrime;
        }
        f = m.square(&f);
    }
    Primality::Composite
}

/// The quadratic Frobenius test with caller-supplied parameters.
///
/// The caller is responsible for (b² + 4c | n) = -1 and (-c | n) = 1; with
/// parameters violating the preconditions the composite verdict is not a
/// proof. [rqft] searches valid parameters itself and should be preferred.
pub fn qft<T: PrimalityBase>(n: &T, b: &T, c: &T) -> Primality
where
    for<'r> &'r T: PrimalityRefBase<T>,
{
    let result = screen(n);
    if result != Primality::ProbablyPrime {
        return result;
    }
    qft_steps_3_5(&Modulus::new(n.clone(), b % n, c % n))
}

/// The randomized quadratic Frobenius test with k rounds, using the
/// process-wide PRNG.
///
/// Screens once, then runs up to k rounds of parameter search plus steps
/// 3-5, stopping at the first compositeness proof. The verdict is monotone:
/// more rounds can only turn `ProbablyPrime` into `Composite`. Each round
/// that reaches steps 3-5 passes a composite n with probability below
/// 1/7710 (Grantham), so k rounds err below 7710^-k.
pub fn rqft<T: PrimalityBase>(n: &T, k: usize) -> Primality
where
    for<'r> &'r T: PrimalityRefBase<T>,
{
    rqft_with_rng(n, k, &mut thread_rng())
}

/// [rqft] with a caller-owned PRNG, for reproducible runs and for parallel
/// scanners that keep one generator per worker.
pub fn rqft_with_rng<T: PrimalityBase, R: Rng>(n: &T, k: usize, rng: &mut R) -> Primality
where
    for<'r> &'r T: PrimalityRefBase<T>,
{
    rqft_with_config(n, k, &FrobeniusConfig::default(), rng)
}

/// [rqft] with explicit configuration.
pub fn rqft_with_config<T: PrimalityBase, R: Rng>(
    n: &T,
    k: usize,
    config: &FrobeniusConfig,
    rng: &mut R,
) -> Primality
where
    for<'r> &'r T: PrimalityRefBase<T>,
{
    let result = screen(n);
    if result != Primality::ProbablyPrime {
        return result;
    }

    for _ in 0..k {
        let (b, c) = match search_params(n, config.param_trials, rng) {
            ParamSearch::Found(b, c) => (b, c),
            ParamSearch::Composite => return Primality::Composite,
            ParamSearch::Exhausted => {
                // reachable with probability < (3/4)^trials on a prime;
                // rejecting a prime would be wrong, so answer optimistically
                tracing::warn!(
                    n = %n,
                    trials = config.param_trials,
                    "no suitable pair (b, c) found; assuming probably prime"
                );
                return Primality::ProbablyPrime;
            }
        };
        if qft_steps_3_5(&Modulus::new(n.clone(), b, c)) == Primality::Composite {
            return Primality::Composite;
        }
    }
    Primality::ProbablyPrime
}
