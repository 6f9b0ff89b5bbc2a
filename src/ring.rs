//! Arithmetic in the quotient ring ℤ/nℤ[x]/(x² - b·x - c).
//!
//! Elements are linear polynomials d·x + e with both coefficients reduced
//! modulo n, so every operation below reduces x² to b·x + c and takes the
//! coefficients modulo n. All operations are pure functions of the modulus
//! triple (n, b, c); no state is shared between calls.

use crate::traits::{ModInt, PrimalityBase, PrimalityRefBase};

/// The modulus triple (n, b, c) the ring arithmetic is parameterized by.
///
/// For the Frobenius test, b and c are chosen such that the Jacobi symbols
/// satisfy (b² + 4c | n) = -1 and (-c | n) = 1; the arithmetic itself is
/// valid for any parameters.
#[derive(Clone, Debug)]
pub struct Modulus<T> {
    pub n: T,
    pub b: T,
    pub c: T,
}

/// The linear polynomial d·x + e, an element of ℤ/nℤ[x]/(x² - b·x - c).
///
/// A plain value type; equality is component-wise, which is ring equality
/// because the coefficients are kept reduced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RingElement<T> {
    pub d: T,
    pub e: T,
}

impl<T: PrimalityBase> Modulus<T>
where
    for<'r> &'r T: PrimalityRefBase<T>,
{
    /// Create a modulus triple, reducing b and c modulo the odd n > 1.
    pub fn new(n: T, b: T, c: T) -> Self {
        debug_assert!(n.is_odd());
        debug_assert!(n > T::one());
        let b = b % &n;
        let c = c % &n;
        Modulus { n, b, c }
    }

    /// The generator x, i.e. the element (1, 0).
    pub fn x(&self) -> RingElement<T> {
        RingElement {
            d: T::one(),
            e: T::zero(),
        }
    }

    /// The multiplicative identity (0, 1).
    pub fn one(&self) -> RingElement<T> {
        RingElement {
            d: T::zero(),
            e: T::one(),
        }
    }

    /// The ring's representation of -1, i.e. (0, n-1).
    pub fn minus_one(&self) -> RingElement<T> {
        RingElement {
            d: T::zero(),
            e: &self.n - T::one(),
        }
    }

    /// Embed a scalar into the base subring.
    pub fn scalar(&self, e: T) -> RingElement<T> {
        RingElement {
            d: T::zero(),
            e: e % &self.n,
        }
    }

    /// b² + 4c mod n, the discriminant of x² - b·x - c.
    pub(crate) fn discriminant(&self) -> T {
        let four = T::from_u8(4).unwrap();
        let bb = (&self.b).mulm(&self.b, &self.n);
        bb.addm(&(&four).mulm(&self.c, &self.n), &self.n)
    }

    /// Return f·g. Expands the product, substitutes x² = b·x + c and reduces
    /// the coefficients modulo n. Degenerate (constant) operands take the
    /// scalar-multiplication shortcut.
    pub fn mul(&self, f: &RingElement<T>, g: &RingElement<T>) -> RingElement<T> {
        let n = &self.n;
        if f.d.is_zero() {
            return RingElement {
                d: (&f.e).mulm(&g.d, n),
                e: (&f.e).mulm(&g.e, n),
            };
        }
        if g.d.is_zero() {
            return RingElement {
                d: (&g.e).mulm(&f.d, n),
                e: (&g.e).mulm(&f.e, n),
            };
        }

        // (d·x + e)(f·x + g) = df·x² + (dg + ef)·x + eg
        //                    = (df·b + dg + ef)·x + (df·c + eg)
        let df = (&f.d).mulm(&g.d, n);
        let dg = (&f.d).mulm(&g.e, n);
        let ef = (&f.e).mulm(&g.d, n);
        RingElement {
            d: (&df).mulm(&self.b, n).addm(&dg, n).addm(&ef, n),
            e: (&df).mulm(&self.c, n).addm(&(&f.e).mulm(&g.e, n), n),
        }
    }

    /// Return f², saving one coefficient multiplication over `mul(f, f)`.
    pub fn square(&self, f: &RingElement<T>) -> RingElement<T> {
        let n = &self.n;
        if f.d.is_zero() {
            return RingElement {
                d: T::zero(),
                e: (&f.e).mulm(&f.e, n),
            };
        }

        // (d·x + e)² = (d²·b + 2de)·x + (d²·c + e²)
        let dd = (&f.d).mulm(&f.d, n);
        let de = (&f.d).mulm(&f.e, n);
        RingElement {
            d: (&dd).mulm(&self.b, n).addm(&de, n).addm(&de, n),
            e: (&dd).mulm(&self.c, n).addm(&(&f.e).mulm(&f.e, n), n),
        }
    }

    /// Return x·f, i.e. (b·d + e, c·d).
    pub fn mul_by_x(&self, f: &RingElement<T>) -> RingElement<T> {
        let n = &self.n;
        RingElement {
            d: (&self.b).mulm(&f.d, n).addm(&f.e, n),
            e: (&self.c).mulm(&f.d, n),
        }
    }

    /// Apply the ring homomorphism induced by x ↦ b - x.
    ///
    /// For prime n this is the Frobenius endomorphism f ↦ fⁿ, which makes it
    /// a cheap substitute for an n-th power.
    pub fn sigma(&self, f: &RingElement<T>) -> RingElement<T> {
        let n = &self.n;
        RingElement {
            d: (&f.d).negm(n),
            e: (&f.e).addm(&(&f.d).mulm(&self.b, n), n),
        }
    }

    /// Return f⁻¹, or None when f is not invertible.
    ///
    /// f·σ(f) is always a scalar (the resultant of f and x² - b·x - c), so a
    /// single modular inverse of that scalar suffices. A None from a path
    /// that guarantees invertibility for prime n is a compositeness proof
    /// and must be surfaced as such by the caller.
    pub fn invert(&self, f: &RingElement<T>) -> Option<RingElement<T>> {
        let n = &self.n;
        let conj = self.sigma(f);
        let norm = self.mul(f, &conj);
        debug_assert!(norm.d.is_zero());
        let inv = (&norm.e).invm(n)?;
        Some(RingElement {
            d: (&conj.d).mulm(&inv, n),
            e: (&conj.e).mulm(&inv, n),
        })
    }

    /// Generic square-and-multiply exponentiation of an arbitrary base.
    ///
    /// Powers of x itself should go through [crate::detail::power_of_x],
    /// which needs roughly half the ring multiplications; this generic form
    /// is kept as the reference implementation the Lucas chain is checked
    /// against.
    pub fn pow(&self, base: &RingElement<T>, exp: &T) -> RingElement<T> {
        if exp.is_zero() {
            return self.one();
        }
        let mut result = self.one();
        let mut sq = base.clone();
        let bits = exp.bits();
        for i in 0..bits {
            if exp.bit(i) {
                result = self.mul(&result, &sq);
            }
            if i + 1 < bits {
                sq = self.square(&sq);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    fn random_modulus(rng: &mut impl Rng) -> Modulus<u64> {
        let n = (rng.gen::<u64>() >> 16) | 1;
        let n = n.max(3);
        let b = rng.gen::<u64>() % n;
        let c = rng.gen::<u64>() % n;
        Modulus::new(n, b, c)
    }

    #[test]
    fn x_squared_reduces_to_bx_plus_c() {
        let m = Modulus::new(13u64, 2, 3);
        assert_eq!(m.square(&m.x()), RingElement { d: 2, e: 3 });
        assert_eq!(m.mul(&m.x(), &m.x()), RingElement { d: 2, e: 3 });
        assert_eq!(m.pow(&m.x(), &2), RingElement { d: 2, e: 3 });
        // x³ = (b² + c)x + bc
        assert_eq!(m.pow(&m.x(), &3), RingElement { d: 7, e: 6 });
    }

    #[test]
    fn square_matches_mul() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        for _ in 0..500 {
            let m = random_modulus(&mut rng);
            let f = RingElement {
                d: rng.gen::<u64>() % m.n,
                e: rng.gen::<u64>() % m.n,
            };
            assert_eq!(m.square(&f), m.mul(&f, &f));
            assert_eq!(m.mul_by_x(&f), m.mul(&f, &m.x()));
        }
    }

    #[test]
    fn sigma_is_an_involution() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(2);
        for _ in 0..500 {
            let m = random_modulus(&mut rng);
            let f = RingElement {
                d: rng.gen::<u64>() % m.n,
                e: rng.gen::<u64>() % m.n,
            };
            assert_eq!(m.sigma(&m.sigma(&f)), f);
        }
        // σ(x) = b - x, i.e. (n-1, b)
        let m = Modulus::new(13u64, 5, 7);
        assert_eq!(m.sigma(&m.x()), RingElement { d: 12, e: 5 });
    }

    #[test]
    fn sigma_is_multiplicative() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let m = random_modulus(&mut rng);
            let f = RingElement {
                d: rng.gen::<u64>() % m.n,
                e: rng.gen::<u64>() % m.n,
            };
            let g = RingElement {
                d: rng.gen::<u64>() % m.n,
                e: rng.gen::<u64>() % m.n,
            };
            assert_eq!(m.sigma(&m.mul(&f, &g)), m.mul(&m.sigma(&f), &m.sigma(&g)));
        }
    }

    #[test]
    fn invert_round_trip() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(4);
        let mut inverted = 0;
        for _ in 0..500 {
            let m = random_modulus(&mut rng);
            let f = RingElement {
                d: rng.gen::<u64>() % m.n,
                e: rng.gen::<u64>() % m.n,
            };
            if let Some(inv) = m.invert(&f) {
                assert_eq!(m.mul(&inv, &f), m.one());
                assert_eq!(m.mul(&f, &inv), m.one());
                inverted += 1;
            }
        }
        assert!(inverted > 0);
    }

    #[test]
    fn pow_matches_repeated_mul() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let m = random_modulus(&mut rng);
            let f = RingElement {
                d: rng.gen::<u64>() % m.n,
                e: rng.gen::<u64>() % m.n,
            };
            let k = rng.gen::<u64>() % 64;
            let mut expect = m.one();
            for _ in 0..k {
                expect = m.mul(&expect, &f);
            }
            assert_eq!(m.pow(&f, &k), expect);
        }
    }

    #[cfg(feature = "num-bigint")]
    #[test]
    fn bigint_ring_agrees_with_u64() {
        use num_bigint::BigUint;
        let mut rng = rand::rngs::StdRng::seed_from_u64(6);
        for _ in 0..100 {
            let m = random_modulus(&mut rng);
            let f = RingElement {
                d: rng.gen::<u64>() % m.n,
                e: rng.gen::<u64>() % m.n,
            };
            let k = rng.gen::<u64>();
            let bm = Modulus::new(
                BigUint::from(m.n),
                BigUint::from(m.b),
                BigUint::from(m.c),
            );
            let bf = RingElement {
                d: BigUint::from(f.d),
                e: BigUint::from(f.e),
            };
            let lhs = m.pow(&f, &k);
            let rhs = bm.pow(&bf, &BigUint::from(k));
            assert_eq!(BigUint::from(lhs.d), rhs.d);
            assert_eq!(BigUint::from(lhs.e), rhs.e);
        }
    }
}
