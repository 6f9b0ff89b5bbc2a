//! Primality testing with the quadratic Frobenius test (QFT) and its
//! randomized variant (RQFT), generic over a fixed-width (`u64`) and an
//! arbitrary-precision (`num_bigint::BigUint`) back end, with Miller-Rabin
//! and Baillie-PSW for cross-validation.

mod frobenius;
mod integer;
mod lucas;
mod primality;
mod ring;
mod tables;
mod traits;

pub use frobenius::{qft, rqft, rqft_with_config, rqft_with_rng, screen};
pub use primality::{baillie_psw, miller_rabin, miller_rabin_with_rng};
pub use traits::{
    BitTest, ExactRoots, FrobeniusConfig, ModInt, Primality, PrimalityBase, PrimalityRefBase,
    RandomRange,
};

pub mod detail {
    pub use super::lucas::power_of_x;
    pub use super::ring::{Modulus, RingElement};
    pub use super::tables::{SMALL_PRIMES, TRIAL_BOUND};
}
