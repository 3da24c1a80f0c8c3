//! Modular square roots for prime and prime-power moduli.
//!
//! The prime case is Tonelli-Shanks; odd prime powers are handled by Hensel
//! lifting of the prime-level root, with non-unit inputs split off by their
//! p-adic valuation. Powers of two use direct solution-set lifting. Root
//! enumeration for non-unit inputs grows with p^(t/2), so prime-power moduli
//! are intended to stay small.

use std::collections::BTreeSet;

use num_bigint::{BigInt, BigUint};
use num_integer::{Integer, Roots};
use num_traits::{One, Zero};

use crate::{mod_inverse, mod_pow, NumError, Result};

/// Decompose n as p^k with the largest possible k (so p itself is not a
/// perfect power); returns (n, 1) when n is not a perfect power.
fn split_prime_power(n: &BigUint) -> (BigUint, u32) {
    let max_exp = n.bits().saturating_sub(1) as u32;
    for exp in (2..=max_exp).rev() {
        let root = n.nth_root(exp);
        if root.pow(exp) == *n {
            return (root, exp);
        }
    }
    (n.clone(), 1)
}

/// All square roots of a modulo n, where n is a prime or a prime power.
///
/// Returns the empty vector when a is a non-residue. The base of the prime
/// power is recovered from n itself; a caller holding the decomposition can
/// use [`sqrt_mod_prime_power`] directly.
pub fn sqrt_mod(a: &BigUint, n: &BigUint) -> Result<Vec<BigUint>> {
    let (p, k) = split_prime_power(n);
    sqrt_mod_prime_power(a, &p, k)
}

/// Whether a has a square root modulo n (prime or prime power).
pub fn has_sqrt_mod(a: &BigUint, n: &BigUint) -> Result<bool> {
    let (p, k) = split_prime_power(n);
    if k == 1 && p.is_odd() {
        // Euler's criterion, no root construction needed.
        let a = a % &p;
        if a.is_zero() {
            return Ok(true);
        }
        let exp = (&p - BigUint::one()) >> 1usize;
        return Ok(mod_pow(&a, &exp, &p).is_one());
    }
    Ok(!sqrt_mod_prime_power(a, &p, k)?.is_empty())
}

/// All square roots of a modulo p^k, for prime p and k >= 1.
pub fn sqrt_mod_prime_power(a: &BigUint, p: &BigUint, k: u32) -> Result<Vec<BigUint>> {
    if p < &BigUint::from(2u32) || k == 0 {
        return Err(NumError::InvalidArgument(format!(
            "modulus {p}^{k} is not a prime power"
        )));
    }
    if *p == BigUint::from(2u32) {
        return Ok(sqrt_mod_two_power(a, k));
    }
    Ok(sqrt_mod_odd_prime_power(a, p, k))
}

/// Square roots modulo 2^k by lifting the solution set one bit at a time.
/// The set never exceeds four residues, so this is cheap for any k.
fn sqrt_mod_two_power(a: &BigUint, k: u32) -> Vec<BigUint> {
    let modulus = BigUint::one() << k as usize;
    let a = a % &modulus;

    // x^2 = x (mod 2), so the single root mod 2 is a's parity.
    let mut roots: BTreeSet<BigUint> = BTreeSet::new();
    roots.insert(&a % BigUint::from(2u32));

    for j in 1..k {
        let half = BigUint::one() << (j as usize);
        let next_mod = BigUint::one() << (j as usize + 1);
        let target = &a % &next_mod;
        let mut lifted = BTreeSet::new();
        for r in &roots {
            for candidate in [r.clone(), r + &half] {
                if (&candidate * &candidate) % &next_mod == target {
                    lifted.insert(candidate);
                }
            }
        }
        roots = lifted;
        if roots.is_empty() {
            break;
        }
    }

    roots.into_iter().collect()
}

fn sqrt_mod_odd_prime_power(a: &BigUint, p: &BigUint, k: u32) -> Vec<BigUint> {
    let pk = p.pow(k);
    let a = a % &pk;

    if a.is_zero() {
        // x = j * p^ceil(k/2) for j in [0, p^floor(k/2))
        let step = p.pow(k.div_ceil(2));
        let count = p.pow(k / 2);
        let mut roots = Vec::new();
        let mut j = BigUint::zero();
        while j < count {
            roots.push(&j * &step);
            j += 1u32;
        }
        return roots;
    }

    let (valuation, unit) = crate::extract_prime_power(&a, p);
    if valuation % 2 == 1 {
        return Vec::new();
    }

    if valuation == 0 {
        let root = match tonelli_shanks(&a, p) {
            Some(r) => r,
            None => return Vec::new(),
        };
        let lifted = hensel_lift(&root, &a, p, k);
        let other = &pk - &lifted;
        let mut roots = vec![lifted, other];
        roots.sort();
        roots.dedup();
        return roots;
    }

    // a = p^t * unit with t even: roots are p^(t/2) * y + j * p^(k - t/2)
    // for each root y of the unit modulo p^(k - t).
    let half = valuation / 2;
    let sub_roots = sqrt_mod_odd_prime_power(&unit, p, k - valuation);
    let scale = p.pow(half);
    let step = p.pow(k - half);
    let count = p.pow(half);

    let mut roots = BTreeSet::new();
    for y in sub_roots {
        let base = &scale * &y;
        let mut j = BigUint::zero();
        while j < count {
            roots.insert((&base + &j * &step) % &pk);
            j += 1u32;
        }
    }
    roots.into_iter().collect()
}

/// Tonelli-Shanks square root of a unit modulo an odd prime p.
fn tonelli_shanks(a: &BigUint, p: &BigUint) -> Option<BigUint> {
    let one = BigUint::one();
    let a = a % p;
    if a.is_zero() {
        return Some(BigUint::zero());
    }

    let p_minus_1 = p - &one;
    let legendre_exp = &p_minus_1 >> 1usize;
    if !mod_pow(&a, &legendre_exp, p).is_one() {
        return None;
    }

    // p - 1 = q * 2^s with q odd
    let (s, q) = crate::extract_prime_power(&p_minus_1, &BigUint::from(2u32));

    if s == 1 {
        // p = 3 (mod 4)
        let exp = (p + &one) >> 2usize;
        return Some(mod_pow(&a, &exp, p));
    }

    // Find a quadratic non-residue z
    let mut z = BigUint::from(2u32);
    while mod_pow(&z, &legendre_exp, p) != p_minus_1 {
        z += 1u32;
        if z >= *p {
            return None; // p was not prime after all
        }
    }

    let mut m = s;
    let mut c = mod_pow(&z, &q, p);
    let mut t = mod_pow(&a, &q, p);
    let mut r = mod_pow(&a, &((&q + &one) >> 1usize), p);

    loop {
        if t.is_one() {
            return Some(r);
        }
        // Least i with t^(2^i) = 1
        let mut i = 0u32;
        let mut probe = t.clone();
        while !probe.is_one() {
            probe = (&probe * &probe) % p;
            i += 1;
            if i == m {
                return None;
            }
        }
        let exp = BigUint::one() << (m - i - 1) as usize;
        let b = mod_pow(&c, &exp, p);
        m = i;
        c = (&b * &b) % p;
        t = (&t * &c) % p;
        r = (&r * &b) % p;
    }
}

/// Lift a root of x^2 = a (mod p) to a root modulo p^k. Requires p odd and
/// a a unit, so the derivative 2x stays invertible at every level.
fn hensel_lift(root: &BigUint, a: &BigUint, p: &BigUint, k: u32) -> BigUint {
    let mut modulus = p.clone();
    let mut root = root.clone();

    for _ in 1..k {
        modulus *= p;
        let m_int = BigInt::from(modulus.clone());
        let r_int = BigInt::from(root);
        let a_int = BigInt::from(a % &modulus);

        let f = (&r_int * &r_int - a_int).mod_floor(&m_int);
        let deriv = (BigInt::from(2) * &r_int).mod_floor(&m_int);
        let inv = mod_inverse(&deriv, &m_int).expect("2x is a unit modulo an odd prime power");

        root = (r_int - f * inv)
            .mod_floor(&m_int)
            .to_biguint()
            .expect("mod_floor of a positive modulus is non-negative");
    }
    root
}
