use std::collections::BTreeMap;
use itertools::Itertools;
use log::debug;

use crate::{InvalidTable, Result};

/// A finite monoid given by its multiplication table, `op(a, b) = table[a][b]`.
///
/// Besides the table, this keeps the left ideals `M·e` generated by
/// idempotents. Idempotents are scanned in increasing order and the first
/// one seen for each distinct L-class becomes its representative.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Monoid {
    table: Vec<Vec<usize>>,
    identity: usize,
    lclasses: BTreeMap<usize, Vec<usize>>,
    positions: BTreeMap<usize, Vec<Option<usize>>>,
}

impl Monoid {
    /// Validates `table` and precomputes the L-classes of its idempotents.
    pub fn new(table: Vec<Vec<usize>>) -> Result<Self> {
        let identity = Self::validate(&table)?;
        Ok(Self::build(table, identity))
    }

    fn validate(table: &[Vec<usize>]) -> std::result::Result<usize, InvalidTable> {
        let n = table.len();
        if n == 0 {
            return Err(InvalidTable::Empty)
        }

        for (i, row) in table.iter().enumerate() {
            if row.len() != n {
                return Err(InvalidTable::NotSquare { row: i, len: row.len(), expected: n })
            }
            if let Some((j, &value)) = row.iter().find_position(|&&x| x >= n) {
                return Err(InvalidTable::OutOfRange { i, j, value })
            }
        }

        for a in 0..n {
            for b in 0..n {
                let ab = table[a][b];
                for c in 0..n {
                    if table[ab][c] != table[a][table[b][c]] {
                        return Err(InvalidTable::NotAssociative { a, b, c })
                    }
                }
            }
        }

        let ids = (0..n).filter(|&e|
            (0..n).all(|x| table[e][x] == x && table[x][e] == x)
        ).collect_vec();

        match ids.as_slice() {
            &[e] => Ok(e),
            _ => Err(InvalidTable::NoIdentity(ids.len()))
        }
    }

    fn build(table: Vec<Vec<usize>>, identity: usize) -> Self {
        let n = table.len();
        let mut lclasses: BTreeMap<usize, Vec<usize>> = BTreeMap::new();

        for e in (0..n).filter(|&e| table[e][e] == e) {
            let lclass = (0..n).map(|x| table[x][e]).sorted().dedup().collect_vec();
            if !lclasses.values().contains(&lclass) {
                lclasses.insert(e, lclass);
            }
        }

        let positions = lclasses.iter().map(|(&e, lclass)| {
            let mut pos = vec![None; n];
            for (i, &x) in lclass.iter().enumerate() {
                pos[x] = Some(i);
            }
            (e, pos)
        }).collect();

        debug!("monoid of order {n}: {} L-class representatives", lclasses.len());

        Self { table, identity, lclasses, positions }
    }

    pub fn table(&self) -> &[Vec<usize>] {
        &self.table
    }

    pub fn order(&self) -> usize {
        self.table.len()
    }

    pub fn identity(&self) -> usize {
        self.identity
    }

    #[inline]
    pub fn op(&self, a: usize, b: usize) -> usize {
        self.table[a][b]
    }

    pub fn idempotents(&self) -> Vec<usize> {
        (0..self.order()).filter(|&e| self.op(e, e) == e).collect()
    }

    /// Representative idempotents, in increasing order, with their L-classes.
    pub fn e_to_lclass(&self) -> &BTreeMap<usize, Vec<usize>> {
        &self.lclasses
    }

    pub fn representatives(&self) -> impl Iterator<Item = usize> + '_ {
        self.lclasses.keys().cloned()
    }

    pub fn is_representative(&self, e: usize) -> bool {
        self.lclasses.contains_key(&e)
    }

    /// The sorted L-class `M·e` of a representative idempotent `e`.
    ///
    /// Panics if `e` is not a representative.
    pub fn lclass(&self, e: usize) -> &[usize] {
        &self.lclasses[&e]
    }

    /// The position of `x` within `lclass(e)`.
    pub fn lclass_pos(&self, e: usize, x: usize) -> Option<usize> {
        self.positions[&e][x]
    }

    /// The first representative whose L-class is smallest.
    pub fn min_lclass_idempotent(&self) -> usize {
        self.lclasses.iter().min_by_key(|(_, l)| l.len()).map(|(&e, _)| e).unwrap_or(self.identity)
    }

    /// The opposite monoid, `op'(a, b) = op(b, a)`.
    pub fn transpose(&self) -> Self {
        let n = self.order();
        let table = (0..n).map(|i|
            (0..n).map(|j| self.op(j, i)).collect()
        ).collect();
        Self::build(table, self.identity)
    }

    /// The isomorphic monoid obtained by relabeling `x ↦ n - 1 - x`.
    pub fn reflect(&self) -> Self {
        let n = self.order();
        let r = |x: usize| n - 1 - x;
        let table = (0..n).map(|i|
            (0..n).map(|j| r(self.op(r(i), r(j)))).collect()
        ).collect();
        Self::build(table, r(self.identity))
    }

    /// The cyclic group `ℤ/n`.
    pub fn cyclic(n: usize) -> Result<Self> {
        let table = (0..n).map(|i|
            (0..n).map(|j| (i + j) % n).collect()
        ).collect();
        Self::new(table)
    }

    /// Appends a new identity element `n` to a semigroup table.
    pub fn adjoin_identity(table: &[Vec<usize>]) -> Result<Self> {
        let n = table.len();
        let mut ext = table.iter().enumerate().map(|(i, row)| {
            let mut row = row.clone();
            row.push(i);
            row
        }).collect_vec();
        ext.push((0..=n).collect());
        Self::new(ext)
    }

    /// Uses `table` as is when it already has a two-sided identity,
    /// otherwise adjoins one.
    pub fn maybe_adjoin_identity(table: &[Vec<usize>]) -> Result<Self> {
        let n = table.len();
        let get = |a: usize, b: usize| table.get(a).and_then(|r| r.get(b)).cloned();
        let has_identity = (0..n).any(|e|
            (0..n).all(|x| get(e, x) == Some(x) && get(x, e) == Some(x))
        );
        if has_identity {
            Self::new(table.to_vec())
        } else {
            Self::adjoin_identity(table)
        }
    }

    /// The direct product `a × b`, with `(x, y)` labeled `x * |b| + y`.
    pub fn product(a: &Monoid, b: &Monoid) -> Self {
        let (n1, n2) = (a.order(), b.order());
        let n = n1 * n2;
        let table = (0..n).map(|i| {
            let (x1, y1) = (i / n2, i % n2);
            (0..n).map(|j| {
                let (x2, y2) = (j / n2, j % n2);
                a.op(x1, x2) * n2 + b.op(y1, y2)
            }).collect()
        }).collect();
        Self::build(table, a.identity * n2 + b.identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ResolutionError;

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
    fn validate() {
        use InvalidTable::*;
        let err = |t: Vec<Vec<usize>>| match Monoid::new(t) {
            Err(ResolutionError::InputInvalid(e)) => e,
            other => panic!("unexpected: {other:?}"),
        };

        assert_eq!(err(vec![]), Empty);
        assert_eq!(err(vec![vec![0, 1], vec![1]]), NotSquare { row: 1, len: 1, expected: 2 });
        assert_eq!(err(vec![vec![0, 2], vec![1, 0]]), OutOfRange { i: 0, j: 1, value: 2 });
        assert_eq!(err(vec![vec![1, 0], vec![0, 0]]), NotAssociative { a: 0, b: 0, c: 1 });
        assert_eq!(err(vec![vec![0, 0], vec![0, 0]]), NoIdentity(0));
    }

    #[test]
    fn cyclic() {
        let m = Monoid::cyclic(4).unwrap();
        assert_eq!(m.order(), 4);
        assert_eq!(m.identity(), 0);
        assert_eq!(m.op(3, 2), 1);
        assert_eq!(m.idempotents(), vec![0]);
        assert_eq!(m.lclass(0), &[0, 1, 2, 3]);
        assert_eq!(m.min_lclass_idempotent(), 0);
    }

    #[test]
    fn lclasses() {
        let m = rect22();
        assert_eq!(m.identity(), 4);
        assert_eq!(m.idempotents(), vec![0, 1, 2, 3, 4]);

        let reps = m.e_to_lclass().iter().map(|(&e, l)| (e, l.clone())).collect_vec();
        assert_eq!(reps, vec![
            (0, vec![0, 2]),
            (1, vec![1, 3]),
            (4, vec![0, 1, 2, 3, 4]),
        ]);

        assert!(m.is_representative(1));
        assert!(!m.is_representative(2));
        assert_eq!(m.lclass_pos(1, 3), Some(1));
        assert_eq!(m.lclass_pos(1, 2), None);
        assert_eq!(m.min_lclass_idempotent(), 0);
    }

    #[test]
    fn transforms_preserve_validity() {
        let m = rect22();
        for t in [m.transpose(), m.reflect(), m.transpose().reflect()] {
            let checked = Monoid::new(t.table().to_vec()).unwrap();
            assert_eq!(checked, t);
        }
        assert_eq!(m.reflect().identity(), 0);
        assert_eq!(m.transpose().transpose(), m);
    }

    #[test]
    fn adjoin_identity() {
        let band = vec![vec![0, 1], vec![0, 1]];
        let m = Monoid::adjoin_identity(&band).unwrap();
        assert_eq!(m.table(), &[vec![0, 1, 0], vec![0, 1, 1], vec![0, 1, 2]]);
        assert_eq!(m.identity(), 2);

        let m2 = Monoid::maybe_adjoin_identity(&band).unwrap();
        assert_eq!(m, m2);

        let z2 = vec![vec![0, 1], vec![1, 0]];
        let m3 = Monoid::maybe_adjoin_identity(&z2).unwrap();
        assert_eq!(m3.order(), 2);
    }

    #[test]
    fn product() {
        let a = Monoid::cyclic(2).unwrap();
        let b = Monoid::cyclic(3).unwrap();
        let p = Monoid::product(&a, &b);

        assert_eq!(p.order(), 6);
        assert_eq!(p.identity(), 0);
        assert_eq!(p.op(5, 5), 1); // (1, 2) * (1, 2) = (0, 1)

        let checked = Monoid::new(p.table().to_vec()).unwrap();
        assert_eq!(checked, p);
    }
}
