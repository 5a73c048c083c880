use num_bigint::BigInt;
use num_integer::ExtendedGcd;
use num_traits::{One, Signed, Zero};

/// The coefficient ring of every computation in this workspace.
pub type Int = BigInt;

pub trait IntExt {
    fn is_unit(&self) -> bool;
    fn divides(&self, other: &Self) -> bool;
    fn bit_len(&self) -> u64;
}

impl IntExt for Int {
    fn is_unit(&self) -> bool {
        self.is_one() || (-self).is_one()
    }

    fn divides(&self, other: &Self) -> bool {
        if self.is_zero() {
            other.is_zero()
        } else {
            (other % self).is_zero()
        }
    }

    fn bit_len(&self) -> u64 {
        self.bits()
    }
}

pub fn gcd(x: &Int, y: &Int) -> Int {
    num_integer::Integer::gcd(x, y)
}

/// Returns `(d, s, t)` with `s * x + t * y = d`, `d = gcd(x, y) >= 0`.
///
/// When `x` divides `y` the coefficient pair is `(±1, 0)`,
/// so that eliminations against a dividing pivot stay trivial.
pub fn gcdx(x: &Int, y: &Int) -> (Int, Int, Int) {
    if !x.is_zero() && x.divides(y) {
        let s = if x.is_negative() { -Int::one() } else { Int::one() };
        return (x.abs(), s, Int::zero())
    }

    let ExtendedGcd { gcd: d, x: s, y: t } = num_integer::Integer::extended_gcd(x, y);
    if d.is_negative() {
        (-d, -s, -t)
    } else {
        (d, s, t)
    }
}

/// Prime factorization by trial division, primes in increasing order.
/// Returns an empty list for `0` and `±1`.
pub fn factorize(n: &Int) -> Vec<(Int, usize)> {
    let mut n = n.abs();
    let mut res = vec![];

    if n.is_zero() {
        return res
    }

    let mut p = Int::from(2);
    while &p * &p <= n {
        let mut e = 0;
        while (&n % &p).is_zero() {
            n /= &p;
            e += 1;
        }
        if e > 0 {
            res.push((p.clone(), e));
        }
        p += if p == Int::from(2) { 1 } else { 2 };
    }

    if n > Int::one() {
        res.push((n, 1));
    }

    res
}
