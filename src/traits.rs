use crate::tables::TRIAL_BOUND;
use num_integer::{Integer, Roots};
use num_traits::{FromPrimitive, NumRef, RefNum, ToPrimitive};
use rand::Rng;
use std::fmt::Display;

/// Verdict of a primality test.
///
/// `Composite` and `Prime` are proofs and are never revised by further
/// rounds; only `ProbablyPrime` may be refined into `Composite` by running
/// more rounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Primality {
    /// A compositeness proof was found (small factor, perfect square,
    /// non-trivial gcd, or a failed ring check).
    Composite,
    /// No evidence of compositeness was found in the executed rounds.
    ProbablyPrime,
    /// Provably prime. Only issued for numbers below the square of the
    /// trial-division bound, where exhaustive trial division is a proof.
    Prime,
}

impl Primality {
    /// Whether the verdict still allows the number to be prime.
    #[inline]
    pub fn probably(self) -> bool {
        !matches!(self, Primality::Composite)
    }
}

/// This trait describes modular arithmetic on an integer; it is the contract
/// the ring arithmetic expects from both numeric back ends.
pub trait ModInt<Rhs = Self, Modulus = Self> {
    type Output;

    /// Return (self + rhs) % m
    fn addm(self, rhs: Rhs, m: Modulus) -> Self::Output;

    /// Return (self - rhs) % m
    fn subm(self, rhs: Rhs, m: Modulus) -> Self::Output;

    /// Return (self * rhs) % m
    fn mulm(self, rhs: Rhs, m: Modulus) -> Self::Output;

    /// Return (self ^ exp) % m
    fn powm(self, exp: Rhs, m: Modulus) -> Self::Output;

    /// Return (-self) % m
    fn negm(self, m: Modulus) -> Self::Output;

    /// Calculate the Jacobi symbol (self | n) for odd n; 0 when
    /// gcd(self, n) != 1
    fn jacobi(self, n: Modulus) -> i8;

    /// Calculate the modular inverse (x such that self * x = 1 mod m), or
    /// None if self is not a unit mod m
    fn invm(self, m: Modulus) -> Option<Self::Output>
    where
        Self: Sized;
}

/// Bit-level access used to drive the exponentiation chains.
pub trait BitTest {
    /// Length of the number in bits, i.e. one plus the position of the
    /// highest set bit.
    fn bits(&self) -> usize;

    /// Test the bit at `position` (0 is the least significant bit).
    fn bit(&self, position: usize) -> bool;

    /// Exponent of the factor 2, usually implemented as trailing_zeros().
    fn trailing_zeros(&self) -> usize;
}

/// Extension on [num_integer::Roots] to support exact square detection.
pub trait ExactRoots: Roots {
    fn sqrt_exact(&self) -> Option<Self>;

    fn is_square(&self) -> bool {
        self.sqrt_exact().is_some()
    }
}

/// Uniform sampling over the closed interval [lo, hi].
pub trait RandomRange: Sized {
    fn random_range<R: Rng>(rng: &mut R, lo: &Self, hi: &Self) -> Self;
}

/// Umbrella trait for the owned-value capabilities the tests need from a
/// numeric back end. Blanket-implemented, so a new back end only has to
/// provide the leaf traits.
pub trait PrimalityBase:
    Integer
    + Roots
    + NumRef
    + Clone
    + FromPrimitive
    + ToPrimitive
    + ExactRoots
    + BitTest
    + RandomRange
    + Display
{
}
impl<T> PrimalityBase for T where
    T: Integer
        + Roots
        + NumRef
        + Clone
        + FromPrimitive
        + ToPrimitive
        + ExactRoots
        + BitTest
        + RandomRange
        + Display
{
}

/// Umbrella trait for the by-reference capabilities of a back end.
pub trait PrimalityRefBase<Base>:
    RefNum<Base>
    + std::ops::Shr<usize, Output = Base>
    + for<'r> ModInt<&'r Base, &'r Base, Output = Base>
{
}
impl<T, Base> PrimalityRefBase<Base> for T where
    T: RefNum<Base>
        + std::ops::Shr<usize, Output = Base>
        + for<'r> ModInt<&'r Base, &'r Base, Output = Base>
{
}

/// Run-time knobs of the randomized Frobenius test.
#[derive(Clone, Copy, Debug)]
pub struct FrobeniusConfig {
    /// Number of random (b, c) pairs drawn before the parameter search gives
    /// up and falls back to `ProbablyPrime`. The probability that the search
    /// fails on a prime input is below (3/4)^param_trials.
    pub param_trials: usize,
}

impl Default for FrobeniusConfig {
    fn default() -> Self {
        FrobeniusConfig {
            param_trials: TRIAL_BOUND as usize,
        }
    }
}
