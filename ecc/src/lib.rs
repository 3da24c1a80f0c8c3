//! Affine short-Weierstrass curve arithmetic: y^2 = x^3 + a*x + b over
//! Z/pZ.
//!
//! Points are either the identity (the point at infinity) or an affine
//! coordinate pair; the group law is the textbook chord-and-tangent
//! construction with explicit modular inverses. Nothing here is
//! constant-time, and the modulus is taken on trust: a composite p
//! surfaces as a failed inversion during addition, not as a constructor
//! error.

use std::fmt;

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use rand::Rng;
use rayon::prelude::*;

use number_core::{mod_inverse, rand_below, sqrt_mod, NumError, Result};

/// A point on a curve: the identity element or an affine pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Point {
    Identity,
    Affine(BigInt, BigInt),
}

impl Point {
    pub fn affine(x: impl Into<BigInt>, y: impl Into<BigInt>) -> Self {
        Point::Affine(x.into(), y.into())
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Point::Identity)
    }

    /// Coordinates of an affine point, `None` for the identity.
    pub fn xy(&self) -> Option<(&BigInt, &BigInt)> {
        match self {
            Point::Identity => None,
            Point::Affine(x, y) => Some((x, y)),
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Point::Identity => write!(f, "O"),
            Point::Affine(x, y) => write!(f, "({x}, {y})"),
        }
    }
}

/// A short-Weierstrass curve over Z/pZ with optional published metadata
/// (generator, order, cofactor, seed) attached via the builder methods.
#[derive(Debug, Clone)]
pub struct Curve {
    pub a: BigInt,
    pub b: BigInt,
    pub module: BigInt,
    pub g: Option<Point>,
    pub order: Option<BigUint>,
    pub cofactor: Option<BigUint>,
    pub seed: Option<BigUint>,
}

impl Curve {
    pub fn new(a: impl Into<BigInt>, b: impl Into<BigInt>, p: impl Into<BigUint>) -> Self {
        Curve {
            a: a.into(),
            b: b.into(),
            module: BigInt::from(p.into()),
            g: None,
            order: None,
            cofactor: None,
            seed: None,
        }
    }

    pub fn with_generator(mut self, g: Point) -> Self {
        self.g = Some(g);
        self
    }

    pub fn with_order(mut self, order: impl Into<BigUint>) -> Self {
        self.order = Some(order.into());
        self
    }

    pub fn with_cofactor(mut self, cofactor: impl Into<BigUint>) -> Self {
        self.cofactor = Some(cofactor.into());
        self
    }

    pub fn with_seed(mut self, seed: impl Into<BigUint>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    /// Total number of points, known only when the published order covers
    /// the whole group (cofactor 1).
    pub fn points_count(&self) -> Option<&BigUint> {
        match &self.cofactor {
            Some(c) if c.is_one() => self.order.as_ref(),
            _ => None,
        }
    }

    fn module_uint(&self) -> BigUint {
        self.module
            .magnitude()
            .clone()
    }

    pub fn is_null(&self, p: &Point) -> bool {
        p.is_identity()
    }

    /// Whether p1 == -p2, i.e. same x and negated y. The identity is not
    /// considered opposite to anything, itself included.
    pub fn is_opposite(&self, p1: &Point, p2: &Point) -> bool {
        match (p1.xy(), p2.xy()) {
            (Some((x1, y1)), Some((x2, y2))) => {
                x1 == x2 && *y1 == (-y2).mod_floor(&self.module)
            }
            _ => false,
        }
    }

    /// Whether the point satisfies the curve equation. The identity is on
    /// every curve.
    pub fn check(&self, p: &Point) -> bool {
        match p.xy() {
            None => true,
            Some((x, y)) => (y * y).mod_floor(&self.module) == self.right(x),
        }
    }

    /// Right-hand side of the curve equation: x^3 + a*x + b (mod p).
    pub fn right(&self, x: &BigInt) -> BigInt {
        (x * x * x + &self.a * x + &self.b).mod_floor(&self.module)
    }

    /// All points with the given x coordinate, ordered by y; empty when
    /// the right-hand side has no square root. The x value is kept as
    /// given, not reduced.
    ///
    /// Fails with `InvalidArgument` when x lies outside [0, p].
    pub fn check_x(&self, x: &BigInt) -> Result<Vec<Point>> {
        if x < &BigInt::zero() || x > &self.module {
            return Err(NumError::InvalidArgument(format!(
                "x = {x} is outside [0, {}]",
                self.module
            )));
        }
        let rhs = self
            .right(x)
            .to_biguint()
            .expect("reduced residue is non-negative");
        let roots = sqrt_mod(&rhs, &self.module_uint())?;
        Ok(roots
            .into_iter()
            .map(|y| Point::Affine(x.clone(), BigInt::from(y)))
            .collect())
    }

    /// Every point whose x coordinate lies in [start, end], ascending by x
    /// then y; `end` defaults to p - 1. The x values are scanned in
    /// parallel.
    pub fn find_points_in_range(
        &self,
        start: &BigInt,
        end: Option<&BigInt>,
    ) -> Result<Vec<Point>> {
        let default_end = &self.module - BigInt::one();
        let end = end.unwrap_or(&default_end);

        if start > end {
            return Ok(Vec::new());
        }
        if start < &BigInt::zero() || end > &self.module {
            return Err(NumError::InvalidArgument(format!(
                "range [{start}, {end}] escapes [0, {}]",
                self.module
            )));
        }
        let width = (end - start + BigInt::one())
            .to_u64()
            .ok_or_else(|| {
                NumError::InvalidArgument(format!(
                    "range [{start}, {end}] is too wide to enumerate"
                ))
            })?;

        let per_x: Vec<Vec<Point>> = (0..width)
            .into_par_iter()
            .map(|i| self.check_x(&(start + BigInt::from(i))))
            .collect::<Result<_>>()?;
        Ok(per_x.into_iter().flatten().collect())
    }

    /// `count` random points on the curve, one per successful random x
    /// draw (the lexicographically smaller root is taken).
    pub fn find_points_rand(&self, count: usize, rng: &mut impl Rng) -> Result<Vec<Point>> {
        let upper = self.module_uint() + BigUint::one(); // x drawn from [0, p]
        let mut points = Vec::with_capacity(count);

        while points.len() < count {
            let x = BigInt::from(rand_below(&upper, rng));
            let mut found = self.check_x(&x)?;
            if !found.is_empty() {
                points.push(found.swap_remove(0));
            }
        }
        Ok(points)
    }

    /// Group law: chord through two distinct points, tangent at a doubled
    /// one.
    ///
    /// Fails with `ArithmeticPrecondition` when a required inverse does
    /// not exist, which can only happen over a composite modulus.
    pub fn add(&self, p1: &Point, p2: &Point) -> Result<Point> {
        if self.is_null(p1) {
            return Ok(p2.clone());
        }
        if self.is_null(p2) {
            return Ok(p1.clone());
        }
        if self.is_opposite(p1, p2) {
            return Ok(Point::Identity);
        }

        let (x1, y1) = p1.xy().expect("non-identity checked above");
        let (x2, y2) = p2.xy().expect("non-identity checked above");

        let slope = if x1 != x2 {
            let inv = self.invert(&(x2 - x1))?;
            (y2 - y1) * inv
        } else {
            let inv = self.invert(&(BigInt::from(2) * y1))?;
            (BigInt::from(3) * x1 * x1 + &self.a) * inv
        };

        let x3 = (&slope * &slope - x1 - x2).mod_floor(&self.module);
        let y3 = (slope * (x1 - &x3) - y1).mod_floor(&self.module);
        Ok(Point::Affine(x3, y3))
    }

    fn invert(&self, v: &BigInt) -> Result<BigInt> {
        mod_inverse(v, &self.module).ok_or_else(|| {
            NumError::ArithmeticPrecondition(format!(
                "{v} is not invertible modulo {}; modulus is not prime",
                self.module
            ))
        })
    }

    /// Scalar multiplication n x P by double-and-add over the bits of n,
    /// least significant first.
    pub fn power(&self, p: &Point, n: &BigUint) -> Result<Point> {
        if n.is_zero() || self.is_null(p) {
            return Ok(Point::Identity);
        }

        let mut res = Point::Identity;
        let mut base = p.clone();
        let mut n = n.clone();
        while !n.is_zero() {
            if n.is_odd() {
                res = self.add(&res, &base)?;
            }
            base = self.add(&base, &base)?;
            n >>= 1usize;
        }
        Ok(res)
    }

    /// n x G for the attached generator; identity when no generator is
    /// set.
    pub fn generate(&self, n: &BigUint) -> Result<Point> {
        match &self.g {
            Some(g) => self.power(g, n),
            None => Ok(Point::Identity),
        }
    }

    /// Order of p by repeated addition, `Ok(None)` when `limit` additions
    /// pass without reaching the identity. Slow, intended for small
    /// curves.
    pub fn get_order(&self, p: &Point, limit: Option<u64>) -> Result<Option<BigUint>> {
        let mut order = 1u64;
        let mut res = p.clone();
        while !self.is_null(&res) {
            res = self.add(&res, p)?;
            order += 1;
            if let Some(limit) = limit {
                if order >= limit {
                    return Ok(None);
                }
            }
        }
        Ok(Some(BigUint::from(order)))
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "y^2 = x^3 + {}x + {} (mod {})",
            self.a, self.b, self.module
        )
    }
}
