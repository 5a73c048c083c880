use std::cmp::min;
use log::{debug, trace};
use num_traits::{Zero, Signed};
use moho::{gcdx, Int, IntExt};
use crate::MatTrait;
use crate::dense::*;

/// Which of `[p, pinv, q, qinv]` to track.
pub type DiagFlags = [bool; 4];

/// Diagonalizes `target` over ℤ: finds unimodular `p`, `q` with `p * target * q = d`,
/// `d` zero off the diagonal and its nonzero entries in the leading positions.
/// The diagonal is not normalized into a divisibility chain.
pub fn diag(target: &Mat, flags: DiagFlags) -> DiagResult {
    let copy = target.clone();
    diag_in_place(copy, flags)
}

pub fn diag_in_place(target: Mat, flags: DiagFlags) -> DiagResult {
    debug!("start diag: {:?}, flags: {:?}.", target.shape(), flags);
    trace!("{}", target);

    let mut calc = DiagCalc::new(target, flags);

    calc.process();

    debug!("diag done, rank: {}.", calc.rank);
    trace!("{}", calc.target);

    calc.result()
}

/// A ℤ-basis of `{ v : a v = 0 }`, ordered by (first nonzero index, its absolute value).
pub fn kernel_basis(a: &Mat) -> Vec<Vec<Int>> {
    let n = a.ncols();
    let res = diag(a, [false, false, true, false]);
    let r = res.rank();
    let Some(q) = res.q() else {
        return vec![]
    };

    let mut kernel: Vec<Vec<Int>> = (r..n).map(|j| q.col(j)).collect();
    kernel.sort_by_cached_key(|v| kernel_sort_key(v));
    kernel
}

fn kernel_sort_key(v: &[Int]) -> (usize, Int) {
    match v.iter().position(|a| !a.is_zero()) {
        Some(i) => (i, v[i].abs()),
        None => (v.len(), Int::zero()),
    }
}

#[derive(Debug)]
pub struct DiagResult {
    result: Mat,
    rank: usize,
    p:    Option<Mat>,
    pinv: Option<Mat>,
    q:    Option<Mat>,
    qinv: Option<Mat>
}

impl DiagResult {
    pub fn result(&self) -> &Mat {
        &self.result
    }

    pub fn p(&self) -> Option<&Mat> {
        self.p.as_ref()
    }

    pub fn pinv(&self) -> Option<&Mat> {
        self.pinv.as_ref()
    }

    pub fn q(&self) -> Option<&Mat> {
        self.q.as_ref()
    }

    pub fn qinv(&self) -> Option<&Mat> {
        self.qinv.as_ref()
    }

    pub fn destruct(self) -> (Mat, [Option<Mat>; 4]) {
        (self.result, [self.p, self.pinv, self.q, self.qinv])
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    /// The nonzero diagonal entries.
    pub fn factors(&self) -> Vec<&Int> {
        (0..self.rank).map(|i| &self.result[(i, i)]).collect()
    }
}

#[derive(Debug)]
pub struct DiagCalc {
    target: Mat,
    rank: usize,
    p:    Option<Mat>,
    pinv: Option<Mat>,
    q:    Option<Mat>,
    qinv: Option<Mat>
}

impl DiagCalc {
    pub fn new(target: Mat, flags: DiagFlags) -> Self {
        let id_opt = |size, flag| {
            if flag { Some(Mat::id(size)) } else { None }
        };

        let (m, n) = target.shape();
        let p    = id_opt(m, flags[0]);
        let pinv = id_opt(m, flags[1]);
        let q    = id_opt(n, flags[2]);
        let qinv = id_opt(n, flags[3]);

        DiagCalc { target, rank: 0, p, pinv, q, qinv }
    }

    pub fn result(self) -> DiagResult {
        DiagResult {
            result: self.target,
            rank: self.rank,
            p: self.p,
            pinv: self.pinv,
            q: self.q,
            qinv: self.qinv
        }
    }

    pub fn process(&mut self) {
        let (m, n) = self.target.shape();

        for k in 0..min(m, n) {
            let Some((i, j)) = self.select_pivot(k) else {
                break
            };

            trace!("select-pivot: ({i}, {j}) for {k}");

            if i > k {
                self.swap_rows(k, i);
            }
            if j > k {
                self.swap_cols(k, j);
            }

            self.eliminate_at(k);
            self.rank += 1;
        }

        debug_assert!(self.target.is_diag());
    }

    // Entry in the lower-right block `k..` minimizing (|a|, bit-length of its row and column).
    fn select_pivot(&self, k: usize) -> Option<(usize, usize)> {
        let (m, n) = self.target.shape();

        let row_bits = (k..m).map(|i|
            (k..n).map(|j| self.target[(i, j)].bit_len()).sum::<u64>()
        ).collect::<Vec<_>>();
        let col_bits = (k..n).map(|j|
            (k..m).map(|i| self.target[(i, j)].bit_len()).sum::<u64>()
        ).collect::<Vec<_>>();

        let mut best: Option<(Int, u64, usize, usize)> = None;

        for i in k..m {
            for j in k..n {
                let a = &self.target[(i, j)];
                if a.is_zero() { continue }

                let abs = a.abs();
                let bits = row_bits[i - k] + col_bits[j - k];
                let better = match &best {
                    None => true,
                    Some((b_abs, b_bits, _, _)) => (&abs, bits) < (b_abs, *b_bits)
                };
                if better {
                    best = Some((abs, bits, i, j));
                }
            }
        }

        best.map(|(_, _, i, j)| (i, j))
    }

    fn eliminate_at(&mut self, k: usize) {
        assert!(!self.target[(k, k)].is_zero());

        loop {
            let modified = self.eliminate_col(k)
                         | self.eliminate_row(k);
            if !modified {
                break
            }
        }
    }

    // Clears column `k` below the pivot.
    fn eliminate_col(&mut self, k: usize) -> bool {
        let mut modified = false;

        for i1 in k + 1 .. self.target.nrows() {
            if self.target[(i1, k)].is_zero() { continue }

            let x = self.target[(k , k)].clone();
            let y = self.target[(i1, k)].clone();

            if x.divides(&y) {
                // [ 1 0][x] = [x]
                // [-q 1][y]   [0]
                let q = &y / &x;
                self.left_elementary([&Int::from(1), &Int::zero(), &-q, &Int::from(1)], k, i1);
            } else if y.divides(&x) {
                self.swap_rows(k, i1);
                let q = &x / &y;
                self.left_elementary([&Int::from(1), &Int::zero(), &-q, &Int::from(1)], k, i1);
            } else {
                // d = sx + ty,
                // a = x/d,
                // b = y/d.

                // [ s t][x] < k  = [d]
                // [-b a][y] < i1   [0]

                let (d, s, t) = gcdx(&x, &y);
                let (a, b) = (&x / &d, &y / &d);

                self.left_elementary([&s, &t, &-b, &a], k, i1);
            }
            modified = true
        }

        modified
    }

    // Clears row `k` right of the pivot.
    fn eliminate_row(&mut self, k: usize) -> bool {
        let mut modified = false;

        for j1 in k + 1 .. self.target.ncols() {
            if self.target[(k, j1)].is_zero() { continue }

            let x = self.target[(k, k )].clone();
            let y = self.target[(k, j1)].clone();

            if x.divides(&y) {
                let q = &y / &x;
                self.right_elementary([&Int::from(1), &Int::zero(), &-q, &Int::from(1)], k, j1);
            } else if y.divides(&x) {
                self.swap_cols(k, j1);
                let q = &x / &y;
                self.right_elementary([&Int::from(1), &Int::zero(), &-q, &Int::from(1)], k, j1);
            } else {
                // [x y][s -b] = [d 0]
                //      [t  a]

                let (d, s, t) = gcdx(&x, &y);
                let (a, b) = (&x / &d, &y / &d);

                self.right_elementary([&s, &t, &-b, &a], k, j1);
            }
            modified = true
        }

        modified
    }

    fn swap_rows(&mut self, i: usize, j: usize) {
        self.target.swap_rows(i, j);
        if let Some(p) = self.p.as_mut() {
            p.swap_rows(i, j)
        }
        if let Some(pinv) = self.pinv.as_mut() {
            pinv.swap_cols(i, j)
        }

        trace!("swap-rows: ({i}, {j})\n{}", self.target);
    }

    fn swap_cols(&mut self, i: usize, j: usize) {
        self.target.swap_cols(i, j);
        if let Some(q) = self.q.as_mut() {
            q.swap_cols(i, j)
        }
        if let Some(qinv) = self.qinv.as_mut() {
            qinv.swap_rows(i, j)
        }

        trace!("swap-cols: ({i}, {j})\n{}", self.target);
    }

    // Multiply [a, b; c, d] from left, assuming det = 1.
    fn left_elementary(&mut self, comps: [&Int; 4], i: usize, j: usize) {
        let [a, b, c, d] = comps;
        debug_assert!((a * d - b * c) == Int::from(1));

        // columns left of the pivot are already cleared in both rows.
        let (k, n) = (min(i, j), self.target.ncols());
        self.target.left_elementary_on(comps, i, j, k..n);

        if let Some(p) = self.p.as_mut() {
            p.left_elementary(comps, i, j)
        }
        if let Some(pinv) = self.pinv.as_mut() {
            let inv_t = [d, &-c, &-b, a];
            pinv.right_elementary(inv_t, i, j)
        }

        trace!("left-elem: [{a}, {b}; {c}, {d}] for rows ({i}, {j}).\n{}", self.target);
    }

    // Multiply [a, c; b, d] from right, assuming det = 1.
    fn right_elementary(&mut self, comps: [&Int; 4], i: usize, j: usize) {
        let [a, b, c, d] = comps;
        debug_assert!((a * d - b * c) == Int::from(1));

        let (k, m) = (min(i, j), self.target.nrows());
        self.target.right_elementary_on(comps, i, j, k..m);

        if let Some(q) = self.q.as_mut() {
            q.right_elementary(comps, i, j)
        }
        if let Some(qinv) = self.qinv.as_mut() {
            let inv_t = [d, &-c, &-b, a];
            qinv.left_elementary(inv_t, i, j)
        }

        trace!("right-elem: [{a}, {b}; {c}, {d}] for cols ({i}, {j}).\n{}", self.target);
    }
}
