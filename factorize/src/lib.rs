//! Integer factorization into prime powers.
//!
//! The driver strips small primes by trial division, then works through a
//! stack of cofactors: probable primes are recorded directly, perfect
//! powers of a prime collapse in one step, and everything else is split by
//! Pollard's rho. Rho runs Floyd cycle detection over x -> x^2 + 1 with a
//! p-1 style warm-up of the seed and a running difference product, so each
//! step costs one gcd of the accumulated product rather than of a single
//! difference.

use std::collections::BTreeMap;
use std::fmt;

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Signed, Zero};

use number_core::{gcd, mod_pow, nth_root, rand_range};
use primality::{is_prime, primes_up_to};

/// Small primes used both for trial division and for the rho warm-up.
const SMALL_PRIME_BOUND: u64 = 100;

/// A multiset of prime factors with exponents, ordered by factor.
///
/// Sign is carried as a `-1` entry; `0` and `1` factor as themselves with
/// exponent one, so `unfactorize` inverts `factorize` on every input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Factorization(BTreeMap<BigInt, u32>);

impl Factorization {
    pub fn new() -> Self {
        Factorization(BTreeMap::new())
    }

    /// Add `exp` to the exponent of `factor`.
    pub fn insert_pow(&mut self, factor: BigInt, exp: u32) {
        *self.0.entry(factor).or_insert(0) += exp;
    }

    pub fn exponent_of(&self, factor: &BigInt) -> u32 {
        self.0.get(factor).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BigInt, &u32)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Multiply the factorization back out.
    pub fn unfactorize(&self) -> BigInt {
        self.0
            .iter()
            .fold(BigInt::one(), |acc, (p, &e)| acc * p.pow(e))
    }
}

impl fmt::Display for Factorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (p, &e) in &self.0 {
            if !first {
                write!(f, " * ")?;
            }
            first = false;
            if e == 1 {
                write!(f, "{p}")?;
            } else {
                write!(f, "{p}^{e}")?;
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Factorization {
    type Item = (&'a BigInt, &'a u32);
    type IntoIter = std::collections::btree_map::Iter<'a, BigInt, u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Factor n into prime powers.
///
/// `0` and `1` map to themselves with exponent one; negative input adds a
/// `-1` entry and factors the magnitude. Primality of the produced factors
/// is probabilistic (Miller-Rabin), like everything downstream of the
/// worklist.
pub fn factorize(n: &BigInt) -> Factorization {
    let mut result = Factorization::new();

    if n.is_zero() || n.is_one() {
        result.insert_pow(n.clone(), 1);
        return result;
    }
    if n.is_negative() {
        result.insert_pow(BigInt::from(-1), 1);
    }
    let mut m = n.magnitude().clone();

    for p in primes_up_to(SMALL_PRIME_BOUND) {
        let p = BigUint::from(p);
        while (&m % &p).is_zero() {
            result.insert_pow(BigInt::from(p.clone()), 1);
            m /= &p;
        }
    }

    if m.is_one() {
        if result.is_empty() {
            result.insert_pow(BigInt::one(), 1);
        }
        return result;
    }

    let mut worklist = vec![m];
    while let Some(n) = worklist.pop() {
        if is_prime(&n) {
            result.insert_pow(BigInt::from(n), 1);
            continue;
        }

        if let Some((base, exp)) = is_power(&n) {
            // Only collapse when the base is itself prime; a composite
            // base keeps its exponent hidden and goes through rho like
            // any other cofactor.
            if is_prime(&base) {
                result.insert_pow(BigInt::from(base), exp);
                continue;
            }
        }

        let divisor = pollard_rho(&n);
        let other = &n / &divisor;
        worklist.push(divisor);
        if other > BigUint::one() {
            worklist.push(other);
        }
    }
    result
}

/// Multiply a factorization back into the integer it came from.
pub fn unfactorize(factors: &Factorization) -> BigInt {
    factors.unfactorize()
}

/// Detect a perfect power: returns `(base, exp)` with `base^exp == n` for
/// the largest possible exponent, or `None`. The base is not necessarily
/// prime.
pub fn is_power(n: &BigUint) -> Option<(BigUint, u32)> {
    let limit = n.bits().saturating_sub(1) as u32;
    for exp in (2..=limit).rev() {
        let base = nth_root(n, exp);
        if base.pow(exp) == *n {
            return Some((base, exp));
        }
    }
    None
}

/// Pollard's rho with the polynomial x -> x^2 + 1.
///
/// The caller must ensure n is composite and has no factor below
/// [`SMALL_PRIME_BOUND`]; under those conditions rho always terminates
/// with a nontrivial divisor (restarting on a degenerate cycle).
pub fn pollard_rho(n: &BigUint) -> BigUint {
    rho_pollard_reduce(n, |x| (x * x + BigUint::one()) % n)
}

/// Core of Pollard's rho over an arbitrary iteration polynomial `f`.
///
/// The seed is warmed up by raising it to every prime below the small
/// bound, which acts as a partial p-1 method and often shortens the walk.
/// Floyd's tortoise-and-hare runs `f` at two speeds while a running
/// product of differences accumulates modulo n; its gcd with n either
/// stays 1, yields a divisor, or degenerates to n itself, in which case
/// the walk restarts from a fresh random seed.
pub fn rho_pollard_reduce(n: &BigUint, f: impl Fn(&BigUint) -> BigUint) -> BigUint {
    let one = BigUint::one();
    let two = BigUint::from(2u32);
    let upper = n - &one; // excluded, so seeds land in [2, n-2]
    let mut rng = rand::thread_rng();

    let mut a = rand_range(&two, &upper, &mut rng);
    for p in primes_up_to(SMALL_PRIME_BOUND) {
        a = mod_pow(&a, &BigUint::from(p), n);
    }

    let mut b = a.clone();
    let mut q = BigUint::one();

    loop {
        a = f(&a);
        b = f(&f(&b));

        let diff = (&b + n - &a) % n;
        q = (q * diff) % n;

        let g = gcd(&q, n);
        if g == *n {
            let seed = rand_range(&two, &upper, &mut rng);
            a = seed.clone();
            b = seed;
            q = one.clone();
        } else if !g.is_one() {
            return g;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factor_u64(n: i64) -> Factorization {
        factorize(&BigInt::from(n))
    }

    fn expect_factors(n: i64, expected: &[(i64, u32)]) {
        let f = factor_u64(n);
        assert_eq!(f.len(), expected.len(), "factor count mismatch for {n}: {f}");
        for &(p, e) in expected {
            assert_eq!(
                f.exponent_of(&BigInt::from(p)),
                e,
                "wrong exponent of {p} in factorization of {n}"
            );
        }
        assert_eq!(f.unfactorize(), BigInt::from(n), "round trip failed for {n}");
    }

    #[test]
    fn test_degenerate_inputs() {
        expect_factors(0, &[(0, 1)]);
        expect_factors(1, &[(1, 1)]);
        expect_factors(-1, &[(-1, 1)]);
    }

    #[test]
    fn test_small_composites() {
        expect_factors(12, &[(2, 2), (3, 1)]);
        expect_factors(360, &[(2, 3), (3, 2), (5, 1)]);
        expect_factors(1024, &[(2, 10)]);
        expect_factors(97, &[(97, 1)]);
    }

    #[test]
    fn test_negative_numbers() {
        expect_factors(-12, &[(-1, 1), (2, 2), (3, 1)]);
        expect_factors(-97, &[(-1, 1), (97, 1)]);
    }

    #[test]
    fn test_semiprime_beyond_trial_division() {
        // Both factors exceed the trial-division bound, forcing rho.
        expect_factors(104_729 * 104_743, &[(104_729, 1), (104_743, 1)]);
        expect_factors(8051, &[(83, 1), (97, 1)]);
    }

    #[test]
    fn test_prime_power_shortcut() {
        // 101^3: not caught by trial division, collapsed by power detection
        expect_factors(1_030_301, &[(101, 3)]);
        expect_factors(101 * 101, &[(101, 2)]);
    }

    #[test]
    fn test_mixed_factorization() {
        let n = 8i64 * 3 * 101 * 101 * 104_729;
        expect_factors(n, &[(2, 3), (3, 1), (101, 2), (104_729, 1)]);
    }

    #[test]
    fn test_unfactorize_round_trip() {
        for n in [-720i64, -2, 2, 30, 1009, 123_456_789, 999_999_937] {
            let n = BigInt::from(n);
            assert_eq!(unfactorize(&factorize(&n)), n, "round trip failed for {n}");
        }
    }

    #[test]
    fn test_is_power() {
        // Largest exponent wins
        assert_eq!(
            is_power(&BigUint::from(64u32)),
            Some((BigUint::from(2u32), 6))
        );
        assert_eq!(
            is_power(&BigUint::from(36u32)),
            Some((BigUint::from(6u32), 2))
        );
        assert_eq!(
            is_power(&BigUint::from(1_030_301u32)),
            Some((BigUint::from(101u32), 3))
        );
        assert_eq!(is_power(&BigUint::from(97u32)), None);
        assert_eq!(is_power(&BigUint::from(1u32)), None);
        assert_eq!(is_power(&BigUint::zero()), None);
    }

    #[test]
    fn test_pollard_rho_finds_nontrivial_divisor() {
        let n = BigUint::from(104_729u64 * 104_743);
        let d = pollard_rho(&n);
        assert!(d > BigUint::one() && d < n, "trivial divisor {d}");
        assert!((&n % &d).is_zero(), "{d} does not divide {n}");
    }

    #[test]
    fn test_display() {
        assert_eq!(factor_u64(360).to_string(), "2^3 * 3^2 * 5");
        assert_eq!(factor_u64(-6).to_string(), "-1 * 2 * 3");
        assert_eq!(factor_u64(97).to_string(), "97");
    }
}
