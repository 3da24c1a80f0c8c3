use std::time::Instant;

use factorize::{factorize, is_power, pollard_rho, unfactorize};
use num_bigint::{BigInt, BigUint};
use primality::generate_prime;

fn main() {
    println!("=== Prime Power Factorization ===\n");

    section_1_known_factorizations();
    section_2_perfect_powers();
    section_3_rho_on_semiprimes();
    section_4_random_targets();
}

// -------------------------------------------------------------------------
// Section 1 — Known factorizations
// -------------------------------------------------------------------------

fn section_1_known_factorizations() {
    println!("--- Section 1: Known Factorizations ---\n");

    for n in [0i64, 1, -1, 360, -360, 1009, 1_030_301, 123_456_789] {
        let n = BigInt::from(n);
        let f = factorize(&n);
        let ok = unfactorize(&f) == n;
        println!("  {n:>12} = {f}   (round trip: {ok})");
    }
    println!();
}

// -------------------------------------------------------------------------
// Section 2 — Perfect power detection
// -------------------------------------------------------------------------

fn section_2_perfect_powers() {
    println!("--- Section 2: Perfect Power Detection ---\n");

    for n in [64u64, 36, 97, 1_030_301, 10_000_000_000] {
        match is_power(&BigUint::from(n)) {
            Some((base, exp)) => println!("  {n} = {base}^{exp}"),
            None => println!("  {n} is not a perfect power"),
        }
    }
    println!();
}

// -------------------------------------------------------------------------
// Section 3 — Pollard's rho
// -------------------------------------------------------------------------

fn section_3_rho_on_semiprimes() {
    println!("--- Section 3: Pollard's Rho on Semiprimes ---\n");

    let cases: [(u64, &str); 3] = [
        (8051, "83 x 97"),
        (104_729 * 104_743, "104729 x 104743"),
        (1_000_003 * 1_000_033, "1000003 x 1000033"),
    ];

    for (n, description) in cases {
        let n = BigUint::from(n);
        let start = Instant::now();
        let d = pollard_rho(&n);
        let other = &n / &d;
        println!(
            "  n={n:<24} ({description}): {d} x {other} in {:?}",
            start.elapsed()
        );
    }
    println!();
}

// -------------------------------------------------------------------------
// Section 4 — Random semiprime targets
// -------------------------------------------------------------------------

fn section_4_random_targets() {
    println!("--- Section 4: Random Semiprime Targets ---\n");

    let mut rng = rand::thread_rng();
    for bits in [24u64, 32, 40] {
        let p = generate_prime(bits, &mut rng).unwrap();
        let q = generate_prime(bits, &mut rng).unwrap();
        let n = BigInt::from(&p * &q);

        let start = Instant::now();
        let f = factorize(&n);
        println!(
            "  {bits}-bit x {bits}-bit: {n} = {f} in {:?}",
            start.elapsed()
        );
        assert_eq!(unfactorize(&f), n);
    }
    println!();
}
