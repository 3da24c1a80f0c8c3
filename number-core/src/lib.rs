//! Shared numeric collaborators for the number-theory workspace: gcd and
//! modular exponentiation, modular inverse, the Jacobi symbol, modular
//! square roots, random big integers of a fixed bit length, and byte-string
//! conversions.
//!
//! Everything here is a pure function over immutable inputs; the sieve and
//! the factorization worklist live in their own crates.

pub mod sqrtmod;

use num_bigint::{BigInt, BigUint};
use num_integer::{Integer, Roots};
use num_traits::{One, ToPrimitive, Zero};
use rand::Rng;

pub use sqrtmod::{has_sqrt_mod, sqrt_mod, sqrt_mod_prime_power};

/// Errors shared by every crate in the workspace.
#[derive(Debug, thiserror::Error)]
pub enum NumError {
    /// Malformed input, detected before any computation starts.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A bounded search exhausted its budget without an answer.
    #[error("unresolvable within budget: {0}")]
    Unresolvable(String),

    /// A numeric precondition was violated, e.g. inverting a non-unit.
    /// Indicates caller misuse such as a non-prime curve modulus.
    #[error("arithmetic precondition violated: {0}")]
    ArithmeticPrecondition(String),
}

pub type Result<T> = std::result::Result<T, NumError>;

/// Greatest common divisor.
pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    a.gcd(b)
}

/// Modular exponentiation: base^exp mod modulus.
pub fn mod_pow(base: &BigUint, exp: &BigUint, modulus: &BigUint) -> BigUint {
    base.modpow(exp, modulus)
}

/// Iterative extended Euclid: returns (g, x, y) with a*x + b*y = g.
fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    let (mut old_r, mut r) = (a.clone(), b.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
    let (mut old_t, mut t) = (BigInt::zero(), BigInt::one());

    while !r.is_zero() {
        let q = &old_r / &r;
        let next_r = &old_r - &q * &r;
        old_r = std::mem::replace(&mut r, next_r);
        let next_s = &old_s - &q * &s;
        old_s = std::mem::replace(&mut s, next_s);
        let next_t = &old_t - &q * &t;
        old_t = std::mem::replace(&mut t, next_t);
    }

    (old_r, old_s, old_t)
}

/// Modular multiplicative inverse: a^(-1) mod m.
///
/// Returns `None` when gcd(a, m) != 1, i.e. the inverse does not exist.
pub fn mod_inverse(a: &BigInt, m: &BigInt) -> Option<BigInt> {
    if m <= &BigInt::one() {
        return None;
    }
    let a = a.mod_floor(m);
    if a.is_zero() {
        return None;
    }
    let (g, x, _) = extended_gcd(&a, m);
    if !g.is_one() {
        return None;
    }
    Some(x.mod_floor(m))
}

/// Jacobi symbol (a/n) for odd n >= 1, computed by quadratic reciprocity.
///
/// Returns -1, 0 or 1; fails with `InvalidArgument` when n is even or zero.
pub fn jacobi(a: &BigInt, n: &BigUint) -> Result<i8> {
    if n.is_zero() || n.is_even() {
        return Err(NumError::InvalidArgument(format!(
            "jacobi symbol is only defined for odd n, got {n}"
        )));
    }
    let n_int = BigInt::from(n.clone());
    let mut a = a
        .mod_floor(&n_int)
        .to_biguint()
        .expect("mod_floor of a positive modulus is non-negative");
    let mut n = n.clone();
    let mut result = 1i8;

    while !a.is_zero() {
        while a.is_even() {
            a >>= 1usize;
            let n_mod_8 = (&n % BigUint::from(8u32)).to_u8().expect("residue < 8");
            if n_mod_8 == 3 || n_mod_8 == 5 {
                result = -result;
            }
        }
        std::mem::swap(&mut a, &mut n);
        let a_mod_4 = (&a % BigUint::from(4u32)).to_u8().expect("residue < 4");
        let n_mod_4 = (&n % BigUint::from(4u32)).to_u8().expect("residue < 4");
        if a_mod_4 == 3 && n_mod_4 == 3 {
            result = -result;
        }
        a %= &n;
    }

    if n.is_one() {
        Ok(result)
    } else {
        Ok(0)
    }
}

/// Integer k-th root: the largest r with r^k <= n.
pub fn nth_root(n: &BigUint, k: u32) -> BigUint {
    n.nth_root(k)
}

/// Split n as p^s * m with m not divisible by p; returns (s, m).
pub fn extract_prime_power(n: &BigUint, p: &BigUint) -> (u32, BigUint) {
    let mut s = 0u32;
    let mut m = n.clone();
    while !m.is_zero() && (&m % p).is_zero() {
        m /= p;
        s += 1;
    }
    (s, m)
}

/// Random integer with exactly `bits` bits (the top bit is always set).
pub fn randint_bits(bits: u64, rng: &mut impl Rng) -> BigUint {
    assert!(bits >= 1, "cannot draw a zero-bit integer");
    let num_bytes = bits.div_ceil(8) as usize;
    let mut bytes = vec![0u8; num_bytes];
    rng.fill(&mut bytes[..]);

    // Clear excess high bits, then pin the top bit of the requested width.
    let excess_bits = num_bytes as u64 * 8 - bits;
    if excess_bits > 0 {
        bytes[0] &= (1u8 << (8 - excess_bits)) - 1;
    }
    bytes[0] |= 1u8 << ((bits - 1) % 8);

    let n = BigUint::from_bytes_be(&bytes);
    debug_assert_eq!(n.bits(), bits);
    n
}

/// Random integer in [0, n).
pub fn rand_below(n: &BigUint, rng: &mut impl Rng) -> BigUint {
    assert!(!n.is_zero(), "empty range");
    // One spare byte keeps the modular bias negligible for witness selection.
    let num_bytes = n.bits().div_ceil(8) as usize + 1;
    let mut bytes = vec![0u8; num_bytes];
    rng.fill(&mut bytes[..]);
    BigUint::from_bytes_be(&bytes) % n
}

/// Random integer in [lo, hi).
pub fn rand_range(lo: &BigUint, hi: &BigUint, rng: &mut impl Rng) -> BigUint {
    assert!(lo < hi, "empty range");
    lo + rand_below(&(hi - lo), rng)
}

/// Deterministic big-endian byte-string to integer conversion.
pub fn s2n(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}

/// Inverse of [`s2n`]; zero maps to the empty string.
pub fn n2s(n: &BigUint) -> Vec<u8> {
    if n.is_zero() {
        return Vec::new();
    }
    n.to_bytes_be()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gcd() {
        assert_eq!(
            gcd(&BigUint::from(360u32), &BigUint::from(48u32)),
            BigUint::from(24u32)
        );
        assert_eq!(gcd(&BigUint::from(17u32), &BigUint::from(5u32)), BigUint::one());
    }

    #[test]
    fn test_mod_inverse() {
        // 3^(-1) mod 7 = 5 since 3 * 5 = 15 = 1 (mod 7)
        let inv = mod_inverse(&BigInt::from(3), &BigInt::from(7));
        assert_eq!(inv, Some(BigInt::from(5)));

        // No inverse when gcd != 1
        assert!(mod_inverse(&BigInt::from(6), &BigInt::from(9)).is_none());

        // Negative arguments are reduced first
        let inv = mod_inverse(&BigInt::from(-3), &BigInt::from(7)).expect("-3 = 4 is a unit mod 7");
        assert_eq!((BigInt::from(-3) * &inv).mod_floor(&BigInt::from(7)), BigInt::one());

        // a * a^(-1) = 1 (mod m) for a larger pair
        let a = BigInt::from(123_456_789i64);
        let m = BigInt::from(1_000_000_007i64);
        let inv = mod_inverse(&a, &m).expect("coprime to a prime modulus");
        assert_eq!((a * inv).mod_floor(&m), BigInt::one());
    }

    #[test]
    fn test_jacobi_prime_modulus() {
        // Quadratic residues mod 7 are {1, 2, 4}
        let seven = BigUint::from(7u32);
        assert_eq!(jacobi(&BigInt::from(1), &seven).unwrap(), 1);
        assert_eq!(jacobi(&BigInt::from(2), &seven).unwrap(), 1);
        assert_eq!(jacobi(&BigInt::from(3), &seven).unwrap(), -1);
        assert_eq!(jacobi(&BigInt::from(7), &seven).unwrap(), 0);
    }

    #[test]
    fn test_jacobi_composite_modulus() {
        // (2/9) = (2/3)^2 = 1, (3/9) = 0
        let nine = BigUint::from(9u32);
        assert_eq!(jacobi(&BigInt::from(2), &nine).unwrap(), 1);
        assert_eq!(jacobi(&BigInt::from(3), &nine).unwrap(), 0);
        // (2/15) = (2/3)(2/5) = (-1)(-1) = 1
        assert_eq!(jacobi(&BigInt::from(2), &BigUint::from(15u32)).unwrap(), 1);
    }

    #[test]
    fn test_jacobi_rejects_even_modulus() {
        assert!(jacobi(&BigInt::from(3), &BigUint::from(8u32)).is_err());
        assert!(jacobi(&BigInt::from(3), &BigUint::zero()).is_err());
    }

    #[test]
    fn test_jacobi_matches_euler_criterion() {
        // For an odd prime p and a unit a, (a/p) = a^((p-1)/2) mod p
        let p = BigUint::from(101u32);
        let exp = (&p - BigUint::one()) / BigUint::from(2u32);
        for a in 1u32..40 {
            let euler = mod_pow(&BigUint::from(a), &exp, &p);
            let expected = if euler.is_one() { 1 } else { -1 };
            assert_eq!(
                jacobi(&BigInt::from(a), &p).unwrap(),
                expected,
                "jacobi({a}, 101) disagrees with Euler's criterion"
            );
        }
    }

    #[test]
    fn test_nth_root() {
        assert_eq!(nth_root(&BigUint::from(27u32), 3), BigUint::from(3u32));
        assert_eq!(nth_root(&BigUint::from(28u32), 3), BigUint::from(3u32));
        assert_eq!(nth_root(&BigUint::from(1024u32), 10), BigUint::from(2u32));
    }

    #[test]
    fn test_extract_prime_power() {
        let (s, m) = extract_prime_power(&BigUint::from(48u32), &BigUint::from(2u32));
        assert_eq!(s, 4);
        assert_eq!(m, BigUint::from(3u32));

        let (s, m) = extract_prime_power(&BigUint::from(7u32), &BigUint::from(2u32));
        assert_eq!(s, 0);
        assert_eq!(m, BigUint::from(7u32));
    }

    #[test]
    fn test_randint_bits_width() {
        let mut rng = rand::thread_rng();
        for bits in [2u64, 8, 13, 64, 100, 257] {
            for _ in 0..5 {
                let n = randint_bits(bits, &mut rng);
                assert_eq!(n.bits(), bits, "randint_bits({bits}) produced {n}");
            }
        }
    }

    #[test]
    fn test_rand_range_bounds() {
        let mut rng = rand::thread_rng();
        let lo = BigUint::from(2u32);
        let hi = BigUint::from(97u32);
        for _ in 0..200 {
            let n = rand_range(&lo, &hi, &mut rng);
            assert!(n >= lo && n < hi, "{n} escaped [2, 97)");
        }
    }

    #[test]
    fn test_byte_conversion_round_trip() {
        assert_eq!(s2n(b"AB"), BigUint::from(0x4142u32));
        assert_eq!(n2s(&BigUint::from(0x4142u32)), b"AB".to_vec());
        assert_eq!(n2s(&BigUint::zero()), Vec::<u8>::new());
        let n = BigUint::parse_bytes(b"123456789123456789123456789", 10).unwrap();
        assert_eq!(s2n(&n2s(&n)), n);
    }
}
