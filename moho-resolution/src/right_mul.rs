use std::fmt;
use itertools::Itertools;
use num_traits::Zero;
use moho::Int;
use moho_matrix::MatTrait;
use moho_matrix::dense::Mat;

use crate::{BasisLayout, Monoid};

/// A ℤ-combination `Σ cᵢ mᵢ` of monoid elements, one `(cᵢ, mᵢ)` per term.
pub type Cell = Vec<(Int, usize)>;

/// A ℤ[M]-linear map between sums of `ℤ[M]e`, given by right multiplication.
///
/// Entry `(i, j)` is the element of ℤ[M] that the `j`-th source generator is
/// multiplied by on the right before landing in the `i`-th target summand.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RightMulMatrix {
    rows: Vec<Vec<Cell>>,
    ncols: usize,
}

impl MatTrait for RightMulMatrix {
    fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.ncols)
    }
}

impl RightMulMatrix {
    pub fn new(rows: Vec<Vec<Cell>>, ncols: usize) -> Self {
        assert!(rows.iter().all(|r| r.len() == ncols), "row length mismatch");
        Self { rows, ncols }
    }

    /// The map from the zero module into `nrows` summands.
    pub fn empty(nrows: usize) -> Self {
        Self::new(vec![vec![]; nrows], 0)
    }

    pub fn from_cols(cols: Vec<Vec<Cell>>, nrows: usize) -> Self {
        assert!(cols.iter().all(|c| c.len() == nrows), "column length mismatch");
        let ncols = cols.len();
        let mut rows = vec![Vec::with_capacity(ncols); nrows];
        for col in cols {
            for (i, cell) in col.into_iter().enumerate() {
                rows[i].push(cell);
            }
        }
        Self { rows, ncols }
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn cell(&self, i: usize, j: usize) -> &Cell {
        &self.rows[i][j]
    }

    /// The underlying ℤ-linear map, with rows indexed by `target` and
    /// columns by `source`.
    pub fn z_matrix(&self, monoid: &Monoid, source: &BasisLayout, target: &BasisLayout) -> Mat {
        assert_eq!(self.shape(), (target.gens().len(), source.gens().len()));

        let mut mat = Mat::zero((target.dim(), source.dim()));

        for (j, &x) in source.gens().iter().enumerate() {
            for (jj, &xx) in monoid.lclass(x).iter().enumerate() {
                let col = source.index(j, jj);
                for i in 0..self.nrows() {
                    for (c, m) in self.cell(i, j) {
                        let yy = monoid.op(xx, *m);
                        let row = target.index_of(monoid, i, yy).expect("image lies in the target L-class");
                        mat[(row, col)] += c;
                    }
                }
            }
        }

        mat
    }

    /// The map after applying `ℤ ⊗_{ℤ[M]} -`, i.e. the coefficient sums.
    pub fn tensor_z(&self) -> Mat {
        let (m, n) = self.shape();
        let mut mat = Mat::zero((m, n));
        for (i, row) in self.rows.iter().enumerate() {
            for (j, cell) in row.iter().enumerate() {
                mat[(i, j)] = cell.iter().fold(Int::zero(), |acc, (c, _)| acc + c);
            }
        }
        mat
    }
}

impl fmt::Display for RightMulMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = |c: &Cell| c.iter().map(|(a, m)| format!("({a},{m})")).join(",");
        let rows = self.rows.iter().map(|row|
            row.iter().map(|c| format!("[{}]", cell(c))).join(", ")
        );
        write!(f, "[{}]", rows.map(|r| format!("[{r}]")).join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect22() -> Monoid {
        Monoid::new(vec![
            vec![0,1,0,1,0],
            vec![0,1,0,1,1],
            vec![2,3,2,3,2],
            vec![2,3,2,3,3],
            vec![0,1,2,3,4],
        ]).unwrap()
    }

    fn cell(terms: &[(i64, usize)]) -> Cell {
        terms.iter().map(|&(c, m)| (Int::from(c), m)).collect()
    }

    #[test]
    fn from_cols() {
        let a = RightMulMatrix::from_cols(vec![
            vec![cell(&[(1, 0)])],
            vec![cell(&[(1, 1)])],
        ], 1);
        assert_eq!(a.shape(), (1, 2));
        assert_eq!(a, RightMulMatrix::new(vec![vec![cell(&[(1, 0)]), cell(&[(1, 1)])]], 2));
        assert_eq!(a.to_string(), "[[[(1,0)], [(1,1)]]]");
    }

    #[test]
    fn z_matrix_dim1() {
        let m = rect22();
        let a = RightMulMatrix::new(vec![vec![cell(&[(-1, 0), (1, 2)])]], 1);
        let src = BasisLayout::new(&m, &[4]);
        let tgt = BasisLayout::new(&m, &[0]);

        assert_eq!(a.z_matrix(&m, &src, &tgt), Mat::from_data((2, 5), [
            0, 0, 0, 0, -1,
            0, 0, 0, 0,  1,
        ]));
        assert_eq!(a.tensor_z(), Mat::from_data((1, 1), [0]));
    }

    #[test]
    fn z_matrix_dim2() {
        let m = rect22();
        let a = RightMulMatrix::new(vec![vec![cell(&[(1, 0)]), cell(&[(1, 1)])]], 2);
        let src = BasisLayout::new(&m, &[0, 0]);
        let tgt = BasisLayout::new(&m, &[4]);

        assert_eq!(a.z_matrix(&m, &src, &tgt), Mat::from_data((5, 4), [
            1, 0, 0, 0,
            0, 0, 1, 0,
            0, 1, 0, 0,
            0, 0, 0, 1,
            0, 0, 0, 0,
        ]));
        assert_eq!(a.tensor_z(), Mat::from_data((1, 2), [1, 1]));
    }

    #[test]
    fn empty() {
        let m = rect22();
        let a = RightMulMatrix::empty(1);
        let src = BasisLayout::new(&m, &[]);
        let tgt = BasisLayout::new(&m, &[0]);

        assert_eq!(a.shape(), (1, 0));
        assert_eq!(a.z_matrix(&m, &src, &tgt).shape(), (2, 0));
    }
}
