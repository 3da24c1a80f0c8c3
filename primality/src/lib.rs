//! Probabilistic primality testing and prime candidate generation.
//!
//! Three classical tests are exposed in increasing order of strength:
//! Fermat, Solovay-Strassen, and Miller-Rabin. Each takes a `confidence`
//! parameter counting independent random witness rounds; a composite
//! survives Miller-Rabin with probability at most 4^(-confidence). Every
//! round draws a fresh witness and first checks gcd(witness, n), so a
//! shared factor short-circuits to composite regardless of the test.
//!
//! Candidate generation filters random odd integers through a gcd with the
//! product of all small primes before spending a full test on them.

pub mod sieve;

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, ToPrimitive};
use rand::Rng;

use number_core::{
    extract_prime_power, gcd, jacobi, mod_pow, rand_range, randint_bits, s2n, NumError, Result,
};

pub use sieve::{primes_up_to, random_prime_with_bits};

/// Default number of witness rounds, giving a Miller-Rabin error bound
/// of 4^(-25).
pub const DEFAULT_CONFIDENCE: u32 = 25;

/// Shared preamble of all three tests: `Some(answer)` for n < 4 and even n,
/// `None` when the witness loop has to decide.
fn trivial_cases(n: &BigUint) -> Option<bool> {
    if n < &BigUint::from(2u32) {
        return Some(false);
    }
    if n <= &BigUint::from(3u32) {
        return Some(true);
    }
    if n.is_even() {
        return Some(false);
    }
    None
}

/// Fermat primality test: checks a^(n-1) = 1 (mod n) for random witnesses
/// a in [2, n-1]. Fooled by Carmichael numbers, kept for comparison against
/// the stronger tests.
pub fn fermat(n: &BigUint, confidence: u32) -> bool {
    if let Some(answer) = trivial_cases(n) {
        return answer;
    }
    let one = BigUint::one();
    let n_minus_1 = n - &one;
    let mut rng = rand::thread_rng();

    for _ in 0..confidence {
        let a = rand_range(&BigUint::from(2u32), n, &mut rng);
        if !gcd(&a, n).is_one() {
            return false;
        }
        if !mod_pow(&a, &n_minus_1, n).is_one() {
            return false;
        }
    }
    true
}

/// Solovay-Strassen primality test: for random witnesses a in [2, n-1],
/// a^((n-1)/2) mod n must land in {1, n-1} and agree with the Jacobi
/// symbol (a/n). Strictly stronger than Fermat.
pub fn solovay_strassen(n: &BigUint, confidence: u32) -> bool {
    if let Some(answer) = trivial_cases(n) {
        return answer;
    }
    let one = BigUint::one();
    let n_minus_1 = n - &one;
    let half_exp = &n_minus_1 >> 1usize;
    let mut rng = rand::thread_rng();

    for _ in 0..confidence {
        let a = rand_range(&BigUint::from(2u32), n, &mut rng);
        if !gcd(&a, n).is_one() {
            return false;
        }

        let euler = mod_pow(&a, &half_exp, n);
        if !euler.is_one() && euler != n_minus_1 {
            return false;
        }

        // n is odd here, so the symbol is always defined.
        let symbol = jacobi(&BigInt::from(a), n).expect("n is odd");
        let expected = match symbol {
            1 => one.clone(),
            -1 => n_minus_1.clone(),
            _ => return false,
        };
        if euler != expected {
            return false;
        }
    }
    true
}

/// Miller-Rabin primality test: writes n - 1 = 2^s * m with m odd and
/// follows the square chain a^m, a^2m, ..., a^((n-1)/2) for random
/// witnesses a in [2, n-2]. The strongest of the three tests; error
/// probability at most 4^(-confidence).
pub fn miller_rabin(n: &BigUint, confidence: u32) -> bool {
    if let Some(answer) = trivial_cases(n) {
        return answer;
    }
    let one = BigUint::one();
    let n_minus_1 = n - &one;
    let (s, m) = extract_prime_power(&n_minus_1, &BigUint::from(2u32));
    let mut rng = rand::thread_rng();

    'witness: for _ in 0..confidence {
        let a = rand_range(&BigUint::from(2u32), &n_minus_1, &mut rng);
        if !gcd(&a, n).is_one() {
            return false;
        }

        let mut b = mod_pow(&a, &m, n);
        if b.is_one() || b == n_minus_1 {
            continue 'witness;
        }

        for i in 0..s {
            b = (&b * &b) % n;
            if b.is_one() {
                // A nontrivial square root of 1 exists, n is composite.
                return false;
            }
            if b == n_minus_1 {
                if i < s - 1 {
                    continue 'witness;
                }
                // -1 appeared only at the last squaring, too late to
                // reach 1 by the Fermat step.
                return false;
            }
        }
        return false;
    }
    true
}

/// Default primality check: exact table lookup for numbers the sieve
/// already covers, Miller-Rabin at [`DEFAULT_CONFIDENCE`] beyond it.
pub fn is_prime(n: &BigUint) -> bool {
    if let Some(small) = n.to_u64() {
        if let Some(known) = sieve::is_cached_prime(small) {
            return known;
        }
    }
    miller_rabin(n, DEFAULT_CONFIDENCE)
}

/// Generate a probable prime with exactly `bits` bits at the default
/// confidence.
pub fn generate_prime(bits: u64, rng: &mut impl Rng) -> Result<BigUint> {
    generate_prime_with_attempts(bits, DEFAULT_CONFIDENCE, 64 * bits.max(16), rng)
}

/// Generate a probable prime with exactly `bits` bits.
///
/// Widths up to 10 bits are served from the sieve's exact buckets; larger
/// widths draw random odd candidates, reject those sharing a factor with
/// the small-primes product, and accept the first Miller-Rabin survivor.
/// Fails with `Unresolvable` when `max_attempts` candidates are exhausted,
/// which for any sane attempt budget indicates a broken entropy source.
pub fn generate_prime_with_attempts(
    bits: u64,
    confidence: u32,
    max_attempts: u64,
    rng: &mut impl Rng,
) -> Result<BigUint> {
    if bits < 2 {
        return Err(NumError::InvalidArgument(format!(
            "no primes with fewer than 2 bits, requested {bits}"
        )));
    }
    if bits <= 10 {
        let p = sieve::random_prime_with_bits(bits, rng)
            .expect("buckets cover widths 2 through 10");
        return Ok(BigUint::from(p));
    }

    for _ in 0..max_attempts {
        let n = randint_bits(bits, rng) | BigUint::one();
        if sieve::shares_small_prime_factor(&n) {
            continue;
        }
        if miller_rabin(&n, confidence) {
            return Ok(n);
        }
    }
    Err(NumError::Unresolvable(format!(
        "no {bits}-bit prime found in {max_attempts} attempts"
    )))
}

/// Generate a probable prime whose big-endian byte representation starts
/// with `prefix`.
///
/// The total size defaults to the prefix length plus two spare bytes (four
/// beyond 512 prefix bytes); an explicit `size` must be a multiple of 8
/// strictly larger than the prefix in bits. The low `size - 8*len` bits are
/// randomized below 2^extend, which leaves the prefix bytes untouched.
pub fn generate_prime_with_prefix(
    prefix: &[u8],
    size: Option<u64>,
    confidence: u32,
    rng: &mut impl Rng,
) -> Result<BigUint> {
    let prefix_bits = prefix.len() as u64 * 8;
    let size = size.unwrap_or(if prefix.len() > 512 {
        prefix_bits + 32
    } else {
        prefix_bits + 16
    });

    if prefix_bits >= size {
        return Err(NumError::InvalidArgument(format!(
            "size {size} leaves no room for a {}-byte prefix",
            prefix.len()
        )));
    }
    if size % 8 != 0 {
        return Err(NumError::InvalidArgument(format!(
            "size must be a multiple of 8, got {size}"
        )));
    }

    let extend = size - prefix_bits;
    let visible = s2n(prefix) << extend as usize;
    let hi = BigUint::one() << extend as usize;
    let max_attempts = 64 * size;

    for _ in 0..max_attempts {
        let tail = rand_range(&BigUint::one(), &hi, rng);
        let n = &visible | tail | BigUint::one();
        if sieve::shares_small_prime_factor(&n) {
            continue;
        }
        if miller_rabin(&n, confidence) {
            return Ok(n);
        }
    }
    Err(NumError::Unresolvable(format!(
        "no prime with the given {}-byte prefix found in {max_attempts} attempts",
        prefix.len()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;
    use number_core::n2s;

    const KNOWN_PRIMES: [u64; 8] = [5, 97, 1009, 7919, 104_729, 999_999_937, 2_147_483_647, 67_280_421_310_721];
    const KNOWN_COMPOSITES: [u64; 7] = [9, 15, 341, 1105, 6601, 999_999_939, 4_294_967_297];

    #[test]
    fn test_all_tests_accept_primes() {
        for p in KNOWN_PRIMES {
            let p = BigUint::from(p);
            assert!(fermat(&p, 25), "fermat rejected prime {p}");
            assert!(solovay_strassen(&p, 25), "solovay-strassen rejected prime {p}");
            assert!(miller_rabin(&p, 25), "miller-rabin rejected prime {p}");
        }
    }

    #[test]
    fn test_strong_tests_reject_composites() {
        // 341 is a Fermat pseudoprime to base 2, 1105 and 6601 are
        // Carmichael numbers; Solovay-Strassen and Miller-Rabin reject all
        // of them with overwhelming probability.
        for c in KNOWN_COMPOSITES {
            let c = BigUint::from(c);
            assert!(!solovay_strassen(&c, 25), "solovay-strassen accepted {c}");
            assert!(!miller_rabin(&c, 25), "miller-rabin accepted {c}");
        }
    }

    #[test]
    fn test_trivial_inputs() {
        for f in [fermat, solovay_strassen, miller_rabin] {
            assert!(!f(&BigUint::zero(), 25));
            assert!(!f(&BigUint::one(), 25));
            assert!(f(&BigUint::from(2u32), 25));
            assert!(f(&BigUint::from(3u32), 25));
            assert!(!f(&BigUint::from(4u32), 25));
        }
    }

    #[test]
    fn test_is_prime_matches_sieve_on_small_range() {
        let primes = primes_up_to(500);
        for n in 0u64..=500 {
            assert_eq!(
                is_prime(&BigUint::from(n)),
                primes.contains(&n),
                "is_prime disagrees with the sieve at {n}"
            );
        }
    }

    #[test]
    fn test_miller_rabin_matches_sieve_ground_truth() {
        let primes = primes_up_to(2000);
        for n in 2u64..=2000 {
            assert_eq!(
                miller_rabin(&BigUint::from(n), 10),
                primes.contains(&n),
                "miller-rabin disagrees with the sieve at {n}"
            );
        }
    }

    #[test]
    fn test_generate_prime_small_widths() {
        let mut rng = rand::thread_rng();
        for bits in 2u64..=10 {
            let p = generate_prime(bits, &mut rng).unwrap();
            assert_eq!(p.bits(), bits);
            assert!(is_prime(&p), "{p} is not prime");
        }
    }

    #[test]
    fn test_generate_prime_large_width() {
        let mut rng = rand::thread_rng();
        let p = generate_prime(128, &mut rng).unwrap();
        assert_eq!(p.bits(), 128);
        assert!(p.is_odd());
        assert!(miller_rabin(&p, 25));
    }

    #[test]
    fn test_generate_prime_rejects_tiny_width() {
        let mut rng = rand::thread_rng();
        assert!(generate_prime(0, &mut rng).is_err());
        assert!(generate_prime(1, &mut rng).is_err());
    }

    #[test]
    fn test_generate_prime_with_prefix() {
        let mut rng = rand::thread_rng();
        let p = generate_prime_with_prefix(b"hello", None, 25, &mut rng).unwrap();
        let bytes = n2s(&p);
        assert!(bytes.starts_with(b"hello"), "prefix lost in {bytes:?}");
        // Default size for a 5-byte prefix is 56 bits
        assert!(p.bits() <= 56);
        assert!(is_prime(&p));
    }

    #[test]
    fn test_generate_prime_with_prefix_explicit_size() {
        let mut rng = rand::thread_rng();
        let p = generate_prime_with_prefix(b"AB", Some(64), 25, &mut rng).unwrap();
        assert!(n2s(&p).starts_with(b"AB"));
        assert!(p.bits() <= 64);
    }

    #[test]
    fn test_generate_prime_with_prefix_bad_sizes() {
        let mut rng = rand::thread_rng();
        // No room for randomness
        assert!(generate_prime_with_prefix(b"hello", Some(40), 25, &mut rng).is_err());
        // Not a multiple of 8
        assert!(generate_prime_with_prefix(b"hi", Some(31), 25, &mut rng).is_err());
    }
}
