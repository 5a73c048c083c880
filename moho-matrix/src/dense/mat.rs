use std::ops::{Add, AddAssign, Index, IndexMut, Mul, MulAssign, Range};
use nalgebra::DMatrix;
use delegate::delegate;
use derive_more::Display;
use auto_impl_ops::auto_ops;
use num_traits::{Zero, One};
use moho::Int;
use crate::MatTrait;

/// A dense integer matrix.
#[derive(Clone, Debug, Display, PartialEq, Eq)]
pub struct Mat {
    inner: DMatrix<Int>
}

impl MatTrait for Mat {
    fn shape(&self) -> (usize, usize) {
        (self.inner.nrows(), self.inner.ncols())
    }
}

impl Mat {
    pub fn inner(&self) -> &DMatrix<Int> {
        &self.inner
    }

    pub fn into_inner(self) -> DMatrix<Int> {
        self.inner
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Int)> {
        let m = self.nrows();
        self.inner.iter().enumerate().map(move |(i, a)|
            (i % m, i / m, a)
        )
    }

    pub fn from_data<I, T>(shape: (usize, usize), data: I) -> Self
    where I: IntoIterator<Item = T>, T: Into<Int> {
        DMatrix::from_row_iterator(shape.0, shape.1, data.into_iter().map(|a| a.into())).into()
    }

    /// Builds an `m × n` matrix from its rows. Every row must have length `n`.
    pub fn from_rows(rows: &[Vec<Int>], n: usize) -> Self {
        let m = rows.len();
        assert!(rows.iter().all(|r| r.len() == n), "row length mismatch");
        DMatrix::from_fn(m, n, |i, j| rows[i][j].clone()).into()
    }

    /// Builds an `m × n` matrix whose columns are `cols`.
    pub fn from_cols(cols: &[Vec<Int>], m: usize) -> Self {
        let n = cols.len();
        assert!(cols.iter().all(|c| c.len() == m), "column length mismatch");
        DMatrix::from_fn(m, n, |i, j| cols[j][i].clone()).into()
    }

    pub fn zero(shape: (usize, usize)) -> Self {
        DMatrix::from_element(shape.0, shape.1, Int::zero()).into()
    }

    pub fn is_zero(&self) -> bool {
        self.inner.iter().all(|a| a.is_zero())
    }

    pub fn id(size: usize) -> Self {
        DMatrix::from_fn(size, size, |i, j|
            if i == j { Int::one() } else { Int::zero() }
        ).into()
    }

    pub fn is_id(&self) -> bool {
        self.is_square() && self.iter().all(|(i, j, a)|
            i == j && a.is_one() ||
            i != j && a.is_zero()
        )
    }

    pub fn diag<I>(shape: (usize, usize), entries: I) -> Self
    where I: IntoIterator<Item = Int> {
        let mut mat = Self::zero(shape);
        for (i, a) in entries.into_iter().enumerate() {
            mat[(i, i)] = a;
        }
        mat
    }

    pub fn is_diag(&self) -> bool {
        self.iter().all(|(i, j, a)|
            i == j || a.is_zero()
        )
    }

    pub fn row(&self, i: usize) -> Vec<Int> {
        (0..self.ncols()).map(|j| self[(i, j)].clone()).collect()
    }

    pub fn col(&self, j: usize) -> Vec<Int> {
        (0..self.nrows()).map(|i| self[(i, j)].clone()).collect()
    }

    pub fn transpose(&self) -> Mat {
        self.inner.transpose().into()
    }

    pub fn submat(&self, rows: Range<usize>, cols: Range<usize>) -> Mat {
        let (i0, i1) = (rows.start, rows.end);
        let (j0, j1) = (cols.start, cols.end);

        assert!(i0 <= i1 && i1 <= self.nrows());
        assert!(j0 <= j1 && j1 <= self.ncols());

        let slice = self.inner.view((i0, j0), (i1 - i0, j1 - j0));
        Self::from(slice.clone_owned())
    }

    pub fn submat_rows(&self, rows: Range<usize>) -> Mat {
        let n = self.ncols();
        self.submat(rows, 0 .. n)
    }

    pub fn submat_cols(&self, cols: Range<usize>) -> Mat {
        let m = self.nrows();
        self.submat(0 .. m, cols)
    }

    pub fn mul_vec(&self, v: &[Int]) -> Vec<Int> {
        assert_eq!(self.ncols(), v.len());
        (0..self.nrows()).map(|i|
            v.iter().enumerate().filter(|(_, a)| !a.is_zero()).fold(Int::zero(), |mut acc, (j, a)| {
                acc += &self[(i, j)] * a;
                acc
            })
        ).collect()
    }

    pub fn swap_rows(&mut self, i: usize, j: usize) {
        self.inner.swap_rows(i, j);
    }

    pub fn swap_cols(&mut self, i: usize, j: usize) {
        self.inner.swap_columns(i, j);
    }

    pub fn neg_row(&mut self, i: usize) {
        for j in 0..self.ncols() {
            let a = &mut self.inner[(i, j)];
            *a = -std::mem::take(a);
        }
    }

    pub fn neg_col(&mut self, j: usize) {
        for i in 0..self.nrows() {
            let a = &mut self.inner[(i, j)];
            *a = -std::mem::take(a);
        }
    }

    // Multiply [a, b; c, d] from left, touching only the columns in `range`.
    pub fn left_elementary_on(&mut self, comps: [&Int; 4], i: usize, j: usize, range: Range<usize>) {
        let [a, b, c, d] = comps;
        for k in range {
            let x = std::mem::take(&mut self.inner[(i, k)]);
            let y = std::mem::take(&mut self.inner[(j, k)]);
            self.inner[(i, k)] = a * &x + b * &y;
            self.inner[(j, k)] = c * &x + d * &y;
        }
    }

    // Multiply [a, c; b, d] from right, touching only the rows in `range`.
    pub fn right_elementary_on(&mut self, comps: [&Int; 4], i: usize, j: usize, range: Range<usize>) {
        let [a, b, c, d] = comps;
        for k in range {
            let x = std::mem::take(&mut self.inner[(k, i)]);
            let y = std::mem::take(&mut self.inner[(k, j)]);
            self.inner[(k, i)] = a * &x + b * &y;
            self.inner[(k, j)] = c * &x + d * &y;
        }
    }

    // Multiply [a, b; c, d] from left.
    pub fn left_elementary(&mut self, comps: [&Int; 4], i: usize, j: usize) {
        let n = self.ncols();
        self.left_elementary_on(comps, i, j, 0..n)
    }

    // Multiply [a, c; b, d] from right.
    pub fn right_elementary(&mut self, comps: [&Int; 4], i: usize, j: usize) {
        let m = self.nrows();
        self.right_elementary_on(comps, i, j, 0..m)
    }
}

impl From<DMatrix<Int>> for Mat {
    fn from(inner: DMatrix<Int>) -> Self {
        Self { inner }
    }
}

impl Index<(usize, usize)> for Mat {
    type Output = Int;
    delegate! {
        to self.inner {
            fn index(&self, index: (usize, usize)) -> &Int;
        }
    }
}

impl IndexMut<(usize, usize)> for Mat {
    delegate! {
        to self.inner {
            fn index_mut(&mut self, index: (usize, usize)) -> &mut Int;
        }
    }
}

impl Default for Mat {
    fn default() -> Self {
        Self::zero((0, 0))
    }
}

#[auto_ops]
impl AddAssign<&Mat> for Mat {
    fn add_assign(&mut self, rhs: &Self) {
        assert_eq!(self.shape(), rhs.shape());
        for (a, b) in self.inner.iter_mut().zip(rhs.inner.iter()) {
            *a += b;
        }
    }
}

#[auto_ops]
impl<'a, 'b> Mul<&'b Mat> for &'a Mat {
    type Output = Mat;
    fn mul(self, rhs: &'b Mat) -> Self::Output {
        assert_eq!(self.ncols(), rhs.nrows());
        let (l, m, n) = (self.nrows(), self.ncols(), rhs.ncols());
        let inner = DMatrix::from_fn(l, n, |i, k|
            (0..m).filter(|&j| !self[(i, j)].is_zero()).fold(Int::zero(), |mut acc, j| {
                acc += &self[(i, j)] * &rhs[(j, k)];
                acc
            })
        );
        Mat::from(inner)
    }
}
