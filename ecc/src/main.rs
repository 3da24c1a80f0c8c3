use ecc::{Curve, Point};
use num_bigint::BigInt;
use num_traits::Zero;

fn main() {
    println!("=== Elliptic Curve Arithmetic over a Prime Field ===\n");

    let curve = Curve::new(2, 3, 97u32);
    println!("Curve: {curve}\n");

    section_1_point_enumeration(&curve);
    section_2_group_law(&curve);
    section_3_scalar_multiplication(&curve);
    section_4_orders(&curve);
}

// -------------------------------------------------------------------------
// Section 1 — Point enumeration
// -------------------------------------------------------------------------

fn section_1_point_enumeration(curve: &Curve) {
    println!("--- Section 1: Point Enumeration ---\n");

    let points = curve
        .find_points_in_range(&BigInt::zero(), None)
        .expect("full range is always valid");
    println!("  {} affine points; with the identity, group order {}", points.len(), points.len() + 1);

    let first: Vec<String> = points.iter().take(8).map(|p| p.to_string()).collect();
    println!("  first points by x: {}", first.join(", "));

    let mut rng = rand::thread_rng();
    let random = curve.find_points_rand(3, &mut rng).expect("curve has points");
    let random: Vec<String> = random.iter().map(|p| p.to_string()).collect();
    println!("  random points: {}\n", random.join(", "));
}

// -------------------------------------------------------------------------
// Section 2 — Group law
// -------------------------------------------------------------------------

fn section_2_group_law(curve: &Curve) {
    println!("--- Section 2: Group Law ---\n");

    let points = curve
        .find_points_in_range(&BigInt::zero(), None)
        .expect("full range is always valid");
    let p = points[0].clone();
    let q = points[2].clone();

    let sum = curve.add(&p, &q).expect("prime modulus");
    let double = curve.add(&p, &p).expect("prime modulus");
    println!("  P = {p}, Q = {q}");
    println!("  P + Q = {sum}   (on curve: {})", curve.check(&sum));
    println!("  2P    = {double}   (on curve: {})", curve.check(&double));

    let (x, y) = p.xy().expect("affine point");
    let neg = Point::Affine(x.clone(), (&curve.module - y) % &curve.module);
    println!("  P + (-P) = {}\n", curve.add(&p, &neg).expect("prime modulus"));
}

// -------------------------------------------------------------------------
// Section 3 — Scalar multiplication
// -------------------------------------------------------------------------

fn section_3_scalar_multiplication(curve: &Curve) {
    println!("--- Section 3: Scalar Multiplication ---\n");

    let points = curve
        .find_points_in_range(&BigInt::zero(), None)
        .expect("full range is always valid");
    let p = points[0].clone();

    for n in [0u32, 1, 2, 5, 10, 50] {
        let np = curve.power(&p, &n.into()).expect("prime modulus");
        println!("  {n:>2} x {p} = {np}");
    }
    println!();
}

// -------------------------------------------------------------------------
// Section 4 — Point orders
// -------------------------------------------------------------------------

fn section_4_orders(curve: &Curve) {
    println!("--- Section 4: Point Orders ---\n");

    let points = curve
        .find_points_in_range(&BigInt::zero(), None)
        .expect("full range is always valid");

    for p in points.iter().take(4) {
        match curve.get_order(p, Some(10_000)).expect("prime modulus") {
            Some(order) => {
                let check = curve.power(p, &order).expect("prime modulus");
                println!("  order({p}) = {order}   (order x P = {check})");
            }
            None => println!("  order({p}) not found within limit"),
        }
    }
    println!();
}
