//! Process-wide growable prime table.
//!
//! The cache is seeded once with every prime up to 1024 and lazily extended
//! by trial division when a larger limit is requested. Extension is
//! append-only and idempotent: re-requesting a covered limit returns a
//! prefix without recomputation. All access goes through one mutex, so a
//! reader never observes a partially extended table.

use std::sync::{LazyLock, Mutex};

use num_bigint::BigUint;
use num_traits::One;
use rand::Rng;

use number_core::gcd;

/// The seed bound; primes below it also feed the bit-length buckets and the
/// small-primes product used as a gcd pre-filter for candidate generation.
const SEED_LIMIT: u64 = 1024;

/// Largest bit length served from the buckets (every prime of up to 10 bits
/// is below `SEED_LIMIT`).
const BUCKET_BITS: usize = 10;

struct SieveCache {
    /// Ordered, duplicate-free list of every prime found so far.
    primes: Vec<u64>,
    /// Highest limit the list is known to cover.
    covered: u64,
    /// Membership mask for n <= covered.
    mask: Vec<bool>,
    /// Primes grouped by exact bit length, index 2..=BUCKET_BITS.
    by_bits: Vec<Vec<u64>>,
    /// Product of all seeded primes.
    product: BigUint,
}

static SIEVE: LazyLock<Mutex<SieveCache>> = LazyLock::new(|| Mutex::new(SieveCache::seeded()));

impl SieveCache {
    fn seeded() -> Self {
        let mut cache = SieveCache {
            primes: vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31],
            covered: 31,
            mask: Vec::new(),
            by_bits: vec![Vec::new(); BUCKET_BITS + 1],
            product: BigUint::one(),
        };
        cache.extend_to(SEED_LIMIT);

        for &p in &cache.primes {
            let bits = (64 - p.leading_zeros()) as usize;
            if bits <= BUCKET_BITS {
                cache.by_bits[bits].push(p);
            }
            cache.product *= p;
        }
        cache
    }

    /// Grow the prime list to cover `limit` by trial-dividing successive odd
    /// candidates against the primes already known up to their square root.
    fn extend_to(&mut self, limit: u64) {
        let mut i = *self.primes.last().expect("cache is never empty");
        while i <= limit {
            i += 2;
            let sqrt = i.isqrt();
            let mut composite = false;
            for &p in &self.primes {
                if i % p == 0 {
                    composite = true;
                    break;
                }
                if p > sqrt {
                    break;
                }
            }
            if !composite {
                self.primes.push(i);
            }
        }
        self.covered = self.covered.max(limit);
        self.rebuild_mask();
    }

    fn rebuild_mask(&mut self) {
        let mut mask = vec![false; self.covered as usize + 1];
        for &p in &self.primes {
            if p <= self.covered {
                mask[p as usize] = true;
            }
        }
        self.mask = mask;
    }

    fn prefix(&self, limit: u64) -> Vec<u64> {
        let end = self.primes.partition_point(|&p| p <= limit);
        self.primes[..end].to_vec()
    }
}

/// All primes not greater than `limit`, in order. Served from the cache,
/// extending it first if needed; `limit < 2` yields an empty vector.
pub fn primes_up_to(limit: u64) -> Vec<u64> {
    if limit < 2 {
        return Vec::new();
    }
    let mut cache = SIEVE.lock().expect("sieve lock poisoned");
    if limit > cache.covered {
        cache.extend_to(limit);
    }
    cache.prefix(limit)
}

/// Exact primality for n within the cache's covered range, `None` beyond it.
pub fn is_cached_prime(n: u64) -> Option<bool> {
    let cache = SIEVE.lock().expect("sieve lock poisoned");
    if n <= cache.covered {
        Some(cache.mask[n as usize])
    } else {
        None
    }
}

/// A uniformly drawn cached prime of exactly `bits` bits, for `bits` within
/// the bucketed range; `None` otherwise (or for the empty 1-bit bucket).
pub fn random_prime_with_bits(bits: u64, rng: &mut impl Rng) -> Option<u64> {
    if bits as usize > BUCKET_BITS {
        return None;
    }
    let cache = SIEVE.lock().expect("sieve lock poisoned");
    let bucket = &cache.by_bits[bits as usize];
    if bucket.is_empty() {
        return None;
    }
    Some(bucket[rng.gen_range(0..bucket.len())])
}

/// Whether n shares a factor with the product of all seeded primes. Used as
/// a cheap rejection filter before running a full primality test.
pub fn shares_small_prime_factor(n: &BigUint) -> bool {
    let cache = SIEVE.lock().expect("sieve lock poisoned");
    !gcd(n, &cache.product).is_one()
}
