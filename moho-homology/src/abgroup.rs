use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

use derive_more::Display;
use itertools::Itertools;
use num_traits::{One, Zero};
use moho::{factorize, Int};
use moho::format::superscript;

/// A finitely generated abelian group `ℤʳ ⊕ ⨁ ℤ/pᵉ`,
/// stored by its free rank and, for each prime `p`, the exponents `e`
/// of its elementary divisors in decreasing order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AbGroup {
    rank: usize,
    tors: BTreeMap<Int, Vec<usize>>
}

impl AbGroup {
    /// The group `ℤ/d₁ ⊕ … ⊕ ℤ/dₖ`. A divisor `0` gives a copy of `ℤ`,
    /// `±1` gives nothing.
    pub fn new<I, T>(divisors: I) -> Self
    where I: IntoIterator<Item = T>, T: Into<Int> {
        let mut rank = 0;
        let mut tors: BTreeMap<Int, Vec<usize>> = BTreeMap::new();

        for d in divisors {
            let d: Int = d.into();
            if d.is_zero() {
                rank += 1;
                continue
            }
            for (p, e) in factorize(&d) {
                tors.entry(p).or_default().push(e);
            }
        }

        Self::from_data(tors, rank)
    }

    fn from_data(tors: BTreeMap<Int, Vec<usize>>, rank: usize) -> Self {
        let tors = tors.into_iter().filter(|(_, e)| !e.is_empty()).map(|(p, mut e)| {
            e.sort_by(|a, b| b.cmp(a));
            (p, e)
        }).collect();
        Self { rank, tors }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn z() -> Self {
        Self::free(1)
    }

    pub fn free(rank: usize) -> Self {
        Self { rank, tors: BTreeMap::new() }
    }

    pub fn zmod<T>(n: T) -> Self
    where T: Into<Int> {
        Self::new([n])
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    /// `p ↦ [e₁ ≥ e₂ ≥ …]` for the `p`-primary part.
    pub fn prime_exponents(&self) -> &BTreeMap<Int, Vec<usize>> {
        &self.tors
    }

    pub fn is_trivial(&self) -> bool {
        self.rank == 0 && self.tors.is_empty()
    }

    pub fn is_free(&self) -> bool {
        self.tors.is_empty()
    }

    pub fn is_finite(&self) -> bool {
        self.rank == 0
    }

    pub fn free_part(&self) -> Self {
        Self::free(self.rank)
    }

    pub fn torsion_part(&self) -> Self {
        Self { rank: 0, tors: self.tors.clone() }
    }

    /// The order of the torsion part.
    pub fn torsion_order(&self) -> Int {
        self.tors.iter().flat_map(|(p, es)|
            es.iter().map(move |&e| prime_pow(p, e))
        ).product()
    }

    /// `[0, …, 0, p₁^e, …]`: zeros first, then prime powers by increasing prime,
    /// decreasing exponent.
    pub fn elementary_divisors(&self) -> Vec<Int> {
        let mut res = vec![Int::zero(); self.rank];
        for (p, es) in self.tors.iter() {
            res.extend(es.iter().map(|&e| prime_pow(p, e)));
        }
        res
    }

    /// `[0, …, 0, d₁, d₂, …]` with `d₁` a multiple of `d₂` and so on.
    pub fn invariant_factors(&self) -> Vec<Int> {
        let mut res = vec![Int::zero(); self.rank];
        let len = self.tors.values().map(|es| es.len()).max().unwrap_or(0);

        for i in 0..len {
            let d = self.tors.iter().map(|(p, es)|
                es.get(i).map(|&e| prime_pow(p, e)).unwrap_or_else(Int::one)
            ).product();
            res.push(d);
        }
        res
    }

    pub fn direct_sum(&self, other: &Self) -> Self {
        [self, other].into_iter().sum()
    }

    /// `A ⊗ B`.
    pub fn tensor(&self, other: &Self) -> Self {
        let tors = self.combine(other, self.primes_union(other), |e1, e2| {
            let mut res = min_pairs(e1, e2);
            res.extend(repeat_list(e1, other.rank));
            res.extend(repeat_list(e2, self.rank));
            res
        });
        Self::from_data(tors, self.rank * other.rank)
    }

    /// `Tor(A, B)`.
    pub fn tor(&self, other: &Self) -> Self {
        let primes = self.tors.keys().filter(|p| other.tors.contains_key(*p)).cloned().collect();
        let tors = self.combine(other, primes, min_pairs);
        Self::from_data(tors, 0)
    }

    /// `Ext(A, B)`.
    pub fn ext(&self, other: &Self) -> Self {
        let tors = self.combine(other, self.primes_union(other), |e1, e2| {
            let mut res = min_pairs(e1, e2);
            res.extend(repeat_list(e1, other.rank));
            res
        });
        Self::from_data(tors, 0)
    }

    /// `Hom(A, B)`.
    pub fn hom(&self, other: &Self) -> Self {
        let tors = self.combine(other, self.primes_union(other), |e1, e2| {
            let mut res = min_pairs(e1, e2);
            res.extend(repeat_list(e2, self.rank));
            res
        });
        Self::from_data(tors, self.rank * other.rank)
    }

    fn primes_union(&self, other: &Self) -> BTreeSet<Int> {
        self.tors.keys().chain(other.tors.keys()).cloned().collect()
    }

    fn combine<F>(&self, other: &Self, primes: BTreeSet<Int>, f: F) -> BTreeMap<Int, Vec<usize>>
    where F: Fn(&[usize], &[usize]) -> Vec<usize> {
        let empty = vec![];
        primes.into_iter().map(|p| {
            let e1 = self.tors.get(&p).unwrap_or(&empty);
            let e2 = other.tors.get(&p).unwrap_or(&empty);
            let es = f(e1, e2);
            (p, es)
        }).collect()
    }

    /// Invariant factors, grouped: `"Z x C2^5 x C12"`, or `"0"` for the trivial group.
    pub fn invariant_string(&self) -> String {
        let counts = self.invariant_factors().into_iter().counts();
        let segments = counts.into_iter().sorted().map(|(d, count)| {
            let base = if d.is_zero() { "Z".to_string() } else { format!("C{d}") };
            if count > 4 {
                format!("{base}^{count}")
            } else {
                std::iter::repeat(base).take(count).join(" x ")
            }
        }).collect_vec();

        if segments.is_empty() {
            "0".to_string()
        } else {
            segments.join(" x ")
        }
    }

    /// `"ℤ² ⊕ (ℤ/4) ⊕ (ℤ/2)²"`, by invariant factors.
    pub fn math_symbol(&self) -> String {
        if self.is_trivial() {
            return "0".to_string()
        }

        let mut res = vec![];

        match self.rank {
            0 => (),
            1 => res.push("ℤ".to_string()),
            r => res.push(format!("ℤ{}", superscript(r as isize)))
        }

        let tors = self.invariant_factors().into_iter().skip(self.rank).dedup_with_count();
        for (r, t) in tors {
            let str = if r > 1 {
                format!("(ℤ/{}){}", t, superscript(r as isize))
            } else {
                format!("(ℤ/{})", t)
            };
            res.push(str);
        }

        res.join(" ⊕ ")
    }
}

fn prime_pow(p: &Int, e: usize) -> Int {
    num_traits::pow(p.clone(), e)
}

fn repeat_list(es: &[usize], times: usize) -> impl Iterator<Item = usize> + '_ {
    (0..times).flat_map(move |_| es.iter().copied())
}

fn min_pairs(e1: &[usize], e2: &[usize]) -> Vec<usize> {
    e1.iter().cartesian_product(e2.iter()).map(|(a, b)| *a.min(b)).collect()
}

impl fmt::Display for AbGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_trivial() {
            return f.write_str("trivial")
        }
        let str = self.elementary_divisors().into_iter().map(|d|
            if d.is_zero() { "Z".to_string() } else { format!("C{d}") }
        ).join(" x ");
        f.write_str(&str)
    }
}

// direct sum
impl<'a> Sum<&'a AbGroup> for AbGroup {
    fn sum<I: Iterator<Item = &'a AbGroup>>(iter: I) -> Self {
        let mut rank = 0;
        let mut tors: BTreeMap<Int, Vec<usize>> = BTreeMap::new();

        for g in iter {
            rank += g.rank;
            for (p, es) in g.tors.iter() {
                tors.entry(p.clone()).or_default().extend(es);
            }
        }

        AbGroup::from_data(tors, rank)
    }
}

impl Sum<AbGroup> for AbGroup {
    fn sum<I: Iterator<Item = AbGroup>>(iter: I) -> Self {
        iter.collect_vec().iter().sum()
    }
}

impl<'a, 'b> Add<&'b AbGroup> for &'a AbGroup {
    type Output = AbGroup;

    fn add(self, other: &'b AbGroup) -> Self::Output {
        [self, other].into_iter().sum()
    }
}

impl Add for AbGroup {
    type Output = AbGroup;

    fn add(self, other: AbGroup) -> Self::Output {
        &self + &other
    }
}

#[derive(Clone, Debug, Display, PartialEq, Eq)]
#[display("cannot parse {_0:?} as an abelian group")]
pub struct ParseAbGroupError(String);

impl std::error::Error for ParseAbGroupError {}

impl FromStr for AbGroup {
    type Err = ParseAbGroupError;

    /// Parses `"C12 x Z x Z^2 x C40"`. `"trivial"` and `"0"` give the trivial group.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "trivial" || s == "0" {
            return Ok(Self::zero())
        }

        let err = || ParseAbGroupError(s.to_string());
        let mut divisors: Vec<Int> = vec![];

        for summand in s.split('x') {
            let (base, mult) = match summand.split_once('^') {
                Some((b, m)) => (b.trim(), m.trim().parse::<usize>().map_err(|_| err())?),
                None => (summand.trim(), 1)
            };

            let d = if base == "Z" {
                Int::zero()
            } else if let Some(n) = base.strip_prefix('C') {
                n.parse::<Int>().map_err(|_| err())?
            } else {
                return Err(err())
            };

            divisors.extend(std::iter::repeat(d).take(mult));
        }

        Ok(Self::new(divisors))
    }
}
