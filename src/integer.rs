//! Backend implementations for integers

use crate::traits::{BitTest, ExactRoots, ModInt, RandomRange};
use num_integer::Roots;
use rand::Rng;

#[cfg(feature = "num-bigint")]
use num_bigint::{BigInt, BigUint, RandBigInt};
#[cfg(feature = "num-bigint")]
use num_integer::Integer;
#[cfg(feature = "num-bigint")]
use num_traits::{One, Signed, ToPrimitive, Zero};

macro_rules! impl_bittest_prim {
    ($($T:ty)*) => {$(
        impl BitTest for $T {
            #[inline]
            fn bits(&self) -> usize {
                (<$T>::BITS - self.leading_zeros()) as usize
            }
            #[inline]
            fn bit(&self, position: usize) -> bool {
                self & (1 << position) > 0
            }
            #[inline]
            fn trailing_zeros(&self) -> usize {
                <$T>::trailing_zeros(*self) as usize
            }
        }
    )*}
}
impl_bittest_prim!(u8 u16 u32 u64);

// QUAD_RESIDUAL[N] has a bit i set iff i is a quadratic residue mod N.
const QUAD_RESIDUAL64: u64 = 0x0202021202030213;
const QUAD_RESIDUAL63: u64 = 0x0402483012450293;
const QUAD_RESIDUAL65: u64 = 0x218a019866014613;
const QUAD_RESIDUAL11: u64 = 0x23b;

macro_rules! impl_exactroots_prim {
    ($($T:ty)*) => {$(
        impl ExactRoots for $T {
            fn sqrt_exact(&self) -> Option<Self> {
                // eliminate most non-squares by checking quadratic residues
                // modulo 64, 63, 65 and 11 before the full root extraction
                if (QUAD_RESIDUAL64 >> (self & 63) as u64) & 1 == 0 {
                    return None;
                }
                if (QUAD_RESIDUAL63 >> (self % 63) as u64) & 1 == 0 {
                    return None;
                }
                if (QUAD_RESIDUAL65 >> ((self % 65) & 63) as u64) & 1 == 0 {
                    // both 0 and 64 are squares mod 65
                    return None;
                }
                if (QUAD_RESIDUAL11 >> (self % 11) as u64) & 1 == 0 {
                    return None;
                }
                let root = self.sqrt();
                if &(root * root) == self {
                    Some(root)
                } else {
                    None
                }
            }
        }
    )*};
}
impl_exactroots_prim!(u8 u16 u32 u64);

fn jacobi_u64(mut x: u64, mut y: u64) -> i8 {
    debug_assert!(y % 2 == 1);

    let mut res: i8 = 1;
    loop {
        x %= y;
        if x == 0 {
            return 0;
        }
        while x % 2 == 0 {
            x /= 2;
            let m8 = y % 8;
            if m8 == 3 || m8 == 5 {
                res = -res;
            }
        }
        if x == 1 {
            return res;
        }
        if x % 4 == 3 && y % 4 == 3 {
            res = -res;
        }
        std::mem::swap(&mut x, &mut y);
    }
}

fn invm_u64(a: u64, m: u64) -> Option<u64> {
    let (mut old_r, mut r) = ((a % m) as i128, m as i128);
    let (mut old_s, mut s) = (1i128, 0i128);

    while r != 0 {
        let quotient = old_r / r;
        let tmp = old_r - quotient * r;
        old_r = r;
        r = tmp;
        let tmp = old_s - quotient * s;
        old_s = s;
        s = tmp;
    }

    if old_r != 1 {
        return None;
    }
    let mut inv = old_s % m as i128;
    if inv < 0 {
        inv += m as i128;
    }
    Some(inv as u64)
}

macro_rules! impl_modint_prim {
    ($($T:ty)*) => {$(
        impl<'a, 'b, 'm> ModInt<&'b $T, &'m $T> for &'a $T {
            type Output = $T;

            #[inline]
            fn addm(self, rhs: &'b $T, m: &'m $T) -> $T {
                ((*self as u128 + *rhs as u128) % *m as u128) as $T
            }

            #[inline]
            fn subm(self, rhs: &'b $T, m: &'m $T) -> $T {
                let m = *m as u128;
                let a = *self as u128 % m;
                let b = *rhs as u128 % m;
                ((a + m - b) % m) as $T
            }

            #[inline]
            fn mulm(self, rhs: &'b $T, m: &'m $T) -> $T {
                (*self as u128 * *rhs as u128 % *m as u128) as $T
            }

            fn powm(self, exp: &'b $T, m: &'m $T) -> $T {
                let m = *m as u128;
                if m == 1 {
                    return 0;
                }
                let mut result = 1u128;
                let mut base = *self as u128 % m;
                let mut e = *exp;
                while e != 0 {
                    if e & 1 == 1 {
                        result = result * base % m;
                    }
                    base = base * base % m;
                    e >>= 1;
                }
                result as $T
            }

            #[inline]
            fn negm(self, m: &'m $T) -> $T {
                let a = self % m;
                if a == 0 {
                    0
                } else {
                    m - a
                }
            }

            fn jacobi(self, n: &'m $T) -> i8 {
                jacobi_u64(*self as u64, *n as u64)
            }

            fn invm(self, m: &'m $T) -> Option<$T> {
                invm_u64(*self as u64, *m as u64).map(|v| v as $T)
            }
        }

        impl RandomRange for $T {
            fn random_range<R: Rng>(rng: &mut R, lo: &Self, hi: &Self) -> Self {
                rng.gen_range(*lo..=*hi)
            }
        }
    )*}
}
impl_modint_prim!(u8 u16 u32 u64);

#[cfg(feature = "num-bigint")]
impl BitTest for BigUint {
    fn bits(&self) -> usize {
        BigUint::bits(&self) as usize
    }
    fn bit(&self, position: usize) -> bool {
        BigUint::bit(&self, position as u64)
    }
    #[inline]
    fn trailing_zeros(&self) -> usize {
        match BigUint::trailing_zeros(&self) {
            Some(a) => a as usize,
            None => 0,
        }
    }
}

#[cfg(feature = "num-bigint")]
impl ExactRoots for BigUint {
    fn sqrt_exact(&self) -> Option<Self> {
        if (QUAD_RESIDUAL64 >> (self % 64u8).to_u64().unwrap()) & 1 == 0 {
            return None;
        }
        if (QUAD_RESIDUAL63 >> (self % 63u8).to_u64().unwrap()) & 1 == 0 {
            return None;
        }
        if (QUAD_RESIDUAL65 >> ((self % 65u8) % 64u8).to_u64().unwrap()) & 1 == 0 {
            return None;
        }
        if (QUAD_RESIDUAL11 >> (self % 11u8).to_u64().unwrap()) & 1 == 0 {
            return None;
        }
        let root = Roots::sqrt(self);
        if &root * &root == *self {
            Some(root)
        } else {
            None
        }
    }
}

#[cfg(feature = "num-bigint")]
impl<'a, 'b, 'm> ModInt<&'b BigUint, &'m BigUint> for &'a BigUint {
    type Output = BigUint;

    #[inline]
    fn addm(self, rhs: &'b BigUint, m: &'m BigUint) -> BigUint {
        (self + rhs) % m
    }

    fn subm(self, rhs: &'b BigUint, m: &'m BigUint) -> BigUint {
        let a = self % m;
        let b = rhs % m;
        if a >= b {
            a - b
        } else {
            m - (b - a)
        }
    }

    #[inline]
    fn mulm(self, rhs: &'b BigUint, m: &'m BigUint) -> BigUint {
        (self * rhs) % m
    }

    #[inline]
    fn powm(self, exp: &'b BigUint, m: &'m BigUint) -> BigUint {
        self.modpow(exp, m)
    }

    fn negm(self, m: &'m BigUint) -> BigUint {
        let a = self % m;
        if a.is_zero() {
            a
        } else {
            m - a
        }
    }

    fn jacobi(self, n: &'m BigUint) -> i8 {
        debug_assert!(n.is_odd());

        let mut x = self % n;
        let mut y = n.clone();
        let mut res: i8 = 1;
        loop {
            x = x % &y;
            if x.is_zero() {
                return 0;
            }
            while x.is_even() {
                x = &x >> 1;
                let m8 = (&y % 8u8).to_u8().unwrap();
                if m8 == 3 || m8 == 5 {
                    res = -res;
                }
            }
            if x.is_one() {
                return res;
            }
            if (&x % 4u8).to_u8().unwrap() == 3 && (&y % 4u8).to_u8().unwrap() == 3 {
                res = -res;
            }
            std::mem::swap(&mut x, &mut y);
        }
    }

    fn invm(self, m: &'m BigUint) -> Option<BigUint> {
        let (mut old_r, mut r) = (BigInt::from(self % m), BigInt::from(m.clone()));
        let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());

        while !r.is_zero() {
            let quotient = &old_r / &r;
            let tmp = &old_r - &quotient * &r;
            old_r = r;
            r = tmp;
            let tmp = &old_s - &quotient * &s;
            old_s = s;
            s = tmp;
        }

        if !old_r.is_one() {
            return None;
        }
        let m = BigInt::from(m.clone());
        let mut inv = old_s % &m;
        if inv.is_negative() {
            inv += &m;
        }
        inv.to_biguint()
    }
}

#[cfg(feature = "num-bigint")]
impl RandomRange for BigUint {
    fn random_range<R: Rng>(rng: &mut R, lo: &Self, hi: &Self) -> Self {
        rng.gen_biguint_range(lo, &(hi + 1u8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::random;

    #[test]
    fn exact_root_test() {
        assert!(matches!(ExactRoots::sqrt_exact(&3u8), None));
        assert!(matches!(ExactRoots::sqrt_exact(&4u8), Some(2)));
        assert!(matches!(ExactRoots::sqrt_exact(&9u8), Some(3)));
        assert!(matches!(ExactRoots::sqrt_exact(&18u8), None));

        for _ in 0..100 {
            let x = random::<u32>() as u64;
            assert!(matches!(ExactRoots::sqrt_exact(&(x * x)), Some(v) if v == x));
        }
        for _ in 0..100 {
            let x = random::<u32>() as u64;
            let y = random::<u32>() as u64;
            if x == y {
                continue;
            }
            assert!(ExactRoots::sqrt_exact(&(x * y)).is_none() || x * y == 0);
        }
    }

    #[test]
    fn jacobi_test() {
        // vectors from Forster's tables
        assert_eq!((&1u64).jacobi(&3), 1);
        assert_eq!((&2u64).jacobi(&3), -1);
        assert_eq!((&1u64).jacobi(&5), 1);
        assert_eq!((&4u64).jacobi(&5), 1);
        assert_eq!((&3u64).jacobi(&5), -1);
        assert_eq!((&21u64).jacobi(&7), 0);
        // (2|p) = (-1)^((p²-1)/8)
        assert_eq!((&2u64).jacobi(&7), 1);
        assert_eq!((&2u64).jacobi(&17), 1);
        assert_eq!((&2u64).jacobi(&11), -1);
    }

    #[test]
    fn invm_test() {
        for _ in 0..200 {
            let m = (random::<u64>() | 1).max(3);
            let a = random::<u64>() % m;
            if let Some(inv) = (&a).invm(&m) {
                assert_eq!((&a).mulm(&inv, &m), 1, "a={} m={}", a, m);
            } else {
                assert_ne!(num_integer::gcd(a, m), 1);
            }
        }
    }

    #[test]
    fn powm_test() {
        for _ in 0..200 {
            let m = (random::<u64>() | 1).max(3);
            let a = random::<u64>() % m;
            let e = random::<u64>() % 1024;
            let mut expect = 1u64;
            for _ in 0..e {
                expect = (&expect).mulm(&a, &m);
            }
            assert_eq!((&a).powm(&e, &m), expect);
        }
    }

    #[cfg(feature = "num-bigint")]
    #[test]
    fn bigint_agrees_with_u64() {
        for _ in 0..500 {
            let m = (random::<u32>() as u64) | 1;
            if m < 3 {
                continue;
            }
            let a = random::<u64>() % m;
            let b = random::<u64>() % m;
            let (ba, bb, bm) = (BigUint::from(a), BigUint::from(b), BigUint::from(m));
            assert_eq!(BigUint::from((&a).addm(&b, &m)), (&ba).addm(&bb, &bm));
            assert_eq!(BigUint::from((&a).subm(&b, &m)), (&ba).subm(&bb, &bm));
            assert_eq!(BigUint::from((&a).mulm(&b, &m)), (&ba).mulm(&bb, &bm));
            assert_eq!(BigUint::from((&a).powm(&b, &m)), (&ba).powm(&bb, &bm));
            assert_eq!(BigUint::from((&a).negm(&m)), (&ba).negm(&bm));
            assert_eq!((&a).jacobi(&m), (&ba).jacobi(&bm));
            assert_eq!(
                (&a).invm(&m).map(BigUint::from),
                (&ba).invm(&bm)
            );
        }
    }

    #[cfg(feature = "num-bigint")]
    #[test]
    fn random_range_test() {
        let mut rng = rand::thread_rng();
        let lo = BigUint::from(2u8);
        let hi = BigUint::from(12345u32);
        for _ in 0..1000 {
            let v = BigUint::random_range(&mut rng, &lo, &hi);
            assert!(lo <= v && v <= hi);
        }
        for _ in 0..1000 {
            let v = u64::random_range(&mut rng, &2, &5);
            assert!((2..=5).contains(&v));
        }
    }
}
