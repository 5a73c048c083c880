use std::ops::Range;
use itertools::Itertools;
use num_traits::Zero;
use moho::Int;

use crate::Monoid;

/// The ℤ-basis of `ℤ[M]g₁ ⊕ … ⊕ ℤ[M]gₖ`.
///
/// Flat index `offset(i) + ii` stands for the `ii`-th element of the L-class
/// of `gᵢ`, placed in the `i`-th summand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasisLayout {
    gens: Vec<usize>,
    offsets: Vec<usize>,
}

impl BasisLayout {
    pub fn new(monoid: &Monoid, gens: &[usize]) -> Self {
        let offsets = std::iter::once(0).chain(
            gens.iter().scan(0, |acc, &g| {
                *acc += monoid.lclass(g).len();
                Some(*acc)
            })
        ).collect();
        Self { gens: gens.to_vec(), offsets }
    }

    pub fn gens(&self) -> &[usize] {
        &self.gens
    }

    pub fn dim(&self) -> usize {
        self.offsets[self.gens.len()]
    }

    pub fn summand_range(&self, i: usize) -> Range<usize> {
        self.offsets[i] .. self.offsets[i + 1]
    }

    pub fn index(&self, i: usize, ii: usize) -> usize {
        debug_assert!(ii < self.summand_range(i).len());
        self.offsets[i] + ii
    }

    /// The pair `(i, ii)` of the flat index.
    pub fn pair(&self, index: usize) -> (usize, usize) {
        assert!(index < self.dim());
        let i = self.offsets.partition_point(|&o| o <= index) - 1;
        (i, index - self.offsets[i])
    }

    /// The flat index of the monoid element `x` in the `i`-th summand.
    pub fn index_of(&self, monoid: &Monoid, i: usize, x: usize) -> Option<usize> {
        monoid.lclass_pos(self.gens[i], x).map(|ii| self.offsets[i] + ii)
    }

    /// The monoid element at the flat index.
    pub fn element(&self, monoid: &Monoid, index: usize) -> usize {
        let (i, ii) = self.pair(index);
        monoid.lclass(self.gens[i])[ii]
    }

    pub fn left_mul_table(&self, monoid: &Monoid) -> LeftMulTable {
        let table = (0..monoid.order()).map(|s|
            (0..self.gens.len()).flat_map(|i| {
                let e = self.gens[i];
                monoid.lclass(e).iter().map(move |&x| {
                    let sx = monoid.op(s, x);
                    let ii = monoid.lclass_pos(e, sx).expect("L-class is a left ideal");
                    self.offsets[i] + ii
                })
            }).collect_vec()
        ).collect();
        LeftMulTable { table }
    }
}

/// Left multiplication `s·` on the flat basis, as an index permutation map.
#[derive(Clone, Debug)]
pub struct LeftMulTable {
    table: Vec<Vec<usize>>,
}

impl LeftMulTable {
    pub fn index(&self, s: usize, index: usize) -> usize {
        self.table[s][index]
    }

    pub fn apply(&self, s: usize, vec: &[Int]) -> Vec<Int> {
        let mut res = vec![Int::zero(); vec.len()];
        for (&k, a) in self.table[s].iter().zip(vec) {
            if !a.is_zero() {
                res[k] += a;
            }
        }
        res
    }

    /// All `s·vec` for `s ∈ M`, in order.
    pub fn orbit<'a>(&'a self, vec: &'a [Int]) -> impl Iterator<Item = Vec<Int>> + 'a {
        (0..self.table.len()).map(move |s| self.apply(s, vec))
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

    #[test]
    fn layout() {
        let m = rect22();
        let l = BasisLayout::new(&m, &[0, 4, 1]);

        assert_eq!(l.dim(), 9);
        assert_eq!(l.summand_range(1), 2..7);
        assert_eq!(l.index(2, 1), 8);
        assert_eq!(l.pair(0), (0, 0));
        assert_eq!(l.pair(6), (1, 4));
        assert_eq!(l.pair(7), (2, 0));
        assert_eq!(l.element(&m, 8), 3);
        assert_eq!(l.index_of(&m, 0, 2), Some(1));
        assert_eq!(l.index_of(&m, 0, 1), None);
    }

    #[test]
    fn empty_layout() {
        let m = rect22();
        let l = BasisLayout::new(&m, &[]);
        assert_eq!(l.dim(), 0);
    }

    #[test]
    fn left_mul() {
        let m = rect22();
        let l = BasisLayout::new(&m, &[0]);
        let t = l.left_mul_table(&m);

        // L(0) = {0, 2}; 3·0 = 2, 3·2 = 2.
        assert_eq!(t.index(3, 0), 1);
        assert_eq!(t.index(3, 1), 1);

        let v = [1, -1].map(Int::from);
        assert_eq!(t.apply(3, &v), vec![Int::zero(), Int::zero()]);
        assert_eq!(t.apply(4, &v), v.to_vec());
        assert_eq!(t.orbit(&v).count(), 5);
    }
}
