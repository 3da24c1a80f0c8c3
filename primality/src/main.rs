use num_bigint::BigUint;

use primality::{
    fermat, generate_prime, generate_prime_with_prefix, is_prime, miller_rabin, primes_up_to,
    solovay_strassen, DEFAULT_CONFIDENCE,
};

fn main() {
    println!("=== Primality Testing and Prime Generation ===\n");

    section_1_sieve();
    section_2_test_comparison();
    section_3_generation();
    section_4_prefix_generation();
}

// -------------------------------------------------------------------------
// Section 1 — Sieve
// -------------------------------------------------------------------------

fn section_1_sieve() {
    println!("--- Section 1: Prime Sieve ---\n");

    let primes = primes_up_to(100);
    println!("  Primes up to 100 ({} of them): {:?}", primes.len(), primes);

    for limit in [1_000u64, 10_000, 100_000] {
        let count = primes_up_to(limit).len();
        println!("  pi({limit}) = {count}");
    }
    println!();
}

// -------------------------------------------------------------------------
// Section 2 — Fermat vs Solovay-Strassen vs Miller-Rabin
// -------------------------------------------------------------------------

fn section_2_test_comparison() {
    println!("--- Section 2: Test Comparison on Hard Composites ---\n");

    // Carmichael numbers fool Fermat for every coprime witness.
    let cases: [(u64, &str); 4] = [
        (561, "Carmichael (3 x 11 x 17)"),
        (41041, "Carmichael (7 x 11 x 13 x 41)"),
        (2_147_483_647, "Mersenne prime 2^31 - 1"),
        (67_280_421_310_721, "prime factor of 2^64 + 1"),
    ];

    println!(
        "  {:>16} | {:>7} | {:>16} | {:>12}",
        "n", "fermat", "solovay-strassen", "miller-rabin"
    );
    for (n, description) in cases {
        let n = BigUint::from(n);
        println!(
            "  {:>16} | {:>7} | {:>16} | {:>12}   {}",
            n,
            fermat(&n, DEFAULT_CONFIDENCE),
            solovay_strassen(&n, DEFAULT_CONFIDENCE),
            miller_rabin(&n, DEFAULT_CONFIDENCE),
            description,
        );
    }
    println!();
}

// -------------------------------------------------------------------------
// Section 3 — Prime generation
// -------------------------------------------------------------------------

fn section_3_generation() {
    println!("--- Section 3: Prime Generation ---\n");

    let mut rng = rand::thread_rng();
    for bits in [8u64, 32, 64, 128, 256] {
        match generate_prime(bits, &mut rng) {
            Ok(p) => println!("  {bits:>3}-bit prime: {p}"),
            Err(e) => println!("  {bits:>3}-bit prime: failed ({e})"),
        }
    }
    println!();
}

// -------------------------------------------------------------------------
// Section 4 — Prefixed primes
// -------------------------------------------------------------------------

fn section_4_prefix_generation() {
    println!("--- Section 4: Primes with a Chosen Byte Prefix ---\n");

    let mut rng = rand::thread_rng();
    for prefix in [b"key:".as_slice(), b"demo".as_slice()] {
        match generate_prime_with_prefix(prefix, None, DEFAULT_CONFIDENCE, &mut rng) {
            Ok(p) => {
                let bytes = number_core::n2s(&p);
                println!(
                    "  prefix {:?}: p = {} ({} bits), bytes = {:?}, prime = {}",
                    String::from_utf8_lossy(prefix),
                    p,
                    p.bits(),
                    String::from_utf8_lossy(&bytes),
                    is_prime(&p),
                );
            }
            Err(e) => println!("  prefix {prefix:?}: failed ({e})"),
        }
    }
    println!();
}
