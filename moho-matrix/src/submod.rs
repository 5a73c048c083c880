use std::cmp::Ordering;
use std::ops::{Add, AddAssign};
use num_traits::Zero;
use moho::{gcdx, Int};

/// A subgroup of ℤⁿ, kept as a row-echelon basis.
///
/// `pivot_in_row[r]` is the leading column of `basis[r]` (strictly increasing),
/// `pivot_in_col[c]` is the row whose leading column is `c`, if any.
#[derive(Clone, Debug)]
pub struct FreeSubmod {
    dim: usize,
    basis: Vec<Vec<Int>>,
    pivot_in_col: Vec<Option<usize>>,
    pivot_in_row: Vec<usize>,
}

impl FreeSubmod {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            basis: vec![],
            pivot_in_col: vec![None; dim],
            pivot_in_row: vec![],
        }
    }

    pub fn from_vecs<'a, I>(dim: usize, vecs: I) -> Self
    where I: IntoIterator<Item = &'a Vec<Int>> {
        let mut sub = Self::new(dim);
        for v in vecs {
            sub.push(v);
        }
        sub
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn basis(&self) -> &[Vec<Int>] {
        &self.basis
    }

    pub fn rank(&self) -> usize {
        self.basis.len()
    }

    pub fn is_zero(&self) -> bool {
        self.basis.is_empty()
    }

    /// Adds the span of `vec`.
    pub fn push(&mut self, vec: &[Int]) {
        assert_eq!(vec.len(), self.dim, "ambient dimension mismatch");

        let n = self.dim;
        let mut vec = vec.to_vec();

        for j in 0..n {
            if vec[j].is_zero() { continue }

            let Some(p) = self.pivot_in_col[j] else {
                self.insert_row(j, vec);
                return
            };

            let row = &mut self.basis[p];
            let a = row[j].clone();
            let b = vec[j].clone();

            if (&b % &a).is_zero() {
                let q = &b / &a;
                sub_mul(&mut vec[j..], &row[j..], &q);
            } else if (&a % &b).is_zero() {
                row[j..].swap_with_slice(&mut vec[j..]);
                let q = &a / &b;
                sub_mul(&mut vec[j..], &row[j..], &q);
            } else {
                // [ x    y  ][row]
                // [-b/g  a/g][vec]
                let (g, x, y) = gcdx(&a, &b);
                let (ag, mbg) = (&a / &g, -(&b / &g));

                for jj in j..n {
                    let aa = std::mem::take(&mut row[jj]);
                    let bb = std::mem::take(&mut vec[jj]);
                    row[jj] = &x * &aa + &y * &bb;
                    vec[jj] = &mbg * &aa + &ag * &bb;
                }
            }

            debug_assert!(vec[j].is_zero());
        }
    }

    fn insert_row(&mut self, j: usize, vec: Vec<Int>) {
        let at = self.pivot_in_row.partition_point(|&c| c <= j);

        self.basis.insert(at, vec);
        self.pivot_in_row.insert(at, j);

        for r in at .. self.basis.len() {
            self.pivot_in_col[self.pivot_in_row[r]] = Some(r);
        }
    }

    /// Reduces `vec` against the basis, returning the coefficients
    /// if it lies in the span.
    fn reduce(&self, vec: &[Int]) -> Option<Vec<Int>> {
        assert_eq!(vec.len(), self.dim, "ambient dimension mismatch");

        let n = self.dim;
        let mut vec = vec.to_vec();
        let mut coeffs = vec![Int::zero(); self.rank()];

        for j in 0..n {
            if vec[j].is_zero() { continue }

            let p = self.pivot_in_col[j]?;
            let row = &self.basis[p];
            let a = &row[j];

            if !(&vec[j] % a).is_zero() {
                return None
            }

            let q = &vec[j] / a;
            sub_mul(&mut vec[j..], &row[j..], &q);
            coeffs[p] = q;
        }

        Some(coeffs)
    }

    pub fn contains(&self, vec: &[Int]) -> bool {
        self.reduce(vec).is_some()
    }

    /// Coefficients `c` with `vec = Σ c[r] * basis[r]`, or `None` if `vec` is not in the span.
    pub fn coefficients(&self, vec: &[Int]) -> Option<Vec<Int>> {
        self.reduce(vec)
    }

    pub fn is_subset(&self, other: &Self) -> bool {
        assert_eq!(self.dim, other.dim, "ambient dimension mismatch");
        self.basis.iter().all(|v| other.contains(v))
    }

    /// Checks the row-echelon invariants.
    pub fn assert_consistent(&self) {
        assert_eq!(self.basis.len(), self.pivot_in_row.len());
        assert!(self.pivot_in_row.windows(2).all(|w| w[0] < w[1]));

        for (r, &c) in self.pivot_in_row.iter().enumerate() {
            let row = &self.basis[r];
            assert!(!row[c].is_zero());
            assert!(row[..c].iter().all(|a| a.is_zero()));
            assert_eq!(self.pivot_in_col[c], Some(r));
            assert!(self.basis[r + 1..].iter().all(|row| row[c].is_zero()));
        }

        let n_pivots = self.pivot_in_col.iter().filter(|p| p.is_some()).count();
        assert_eq!(n_pivots, self.basis.len());
    }

    /// The largest bit length of an entry of the basis.
    pub fn max_bits(&self) -> u64 {
        self.basis.iter().flatten().map(|a| a.bits()).max().unwrap_or(0)
    }
}

fn sub_mul(vec: &mut [Int], row: &[Int], q: &Int) {
    for (v, r) in vec.iter_mut().zip(row) {
        if !r.is_zero() {
            *v -= q * r;
        }
    }
}

impl AddAssign<&FreeSubmod> for FreeSubmod {
    fn add_assign(&mut self, rhs: &FreeSubmod) {
        assert_eq!(self.dim, rhs.dim, "ambient dimension mismatch");
        for v in rhs.basis.iter() {
            self.push(v);
        }
    }
}

impl Add<&FreeSubmod> for &FreeSubmod {
    type Output = FreeSubmod;

    fn add(self, rhs: &FreeSubmod) -> FreeSubmod {
        let (small, large) = if self.rank() < rhs.rank() {
            (self, rhs)
        } else {
            (rhs, self)
        };
        let mut res = large.clone();
        res += small;
        res
    }
}

impl PartialEq for FreeSubmod {
    fn eq(&self, other: &Self) -> bool {
        self.is_subset(other) && other.is_subset(self)
    }
}

impl Eq for FreeSubmod {}

impl PartialOrd for FreeSubmod {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.is_subset(other), other.is_subset(self)) {
            (true, true)   => Some(Ordering::Equal),
            (true, false)  => Some(Ordering::Less),
            (false, true)  => Some(Ordering::Greater),
            (false, false) => None,
        }
    }
}
