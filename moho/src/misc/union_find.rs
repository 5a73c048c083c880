use itertools::Itertools;

/// Disjoint sets over `0..n`. The root of a class is always its smallest member.
pub struct UnionFind {
    p: Vec<usize>
}

impl UnionFind {
    pub fn new(n: usize) -> Self {
        Self { p: (0..n).collect() }
    }

    pub fn size(&self) -> usize {
        self.p.len()
    }

    pub fn root(&self, mut i: usize) -> usize {
        while self.p[i] != i {
            i = self.p[i];
        }
        i
    }

    pub fn is_same(&self, i: usize, j: usize) -> bool {
        self.root(i) == self.root(j)
    }

    pub fn union(&mut self, i: usize, j: usize) {
        use std::cmp::Ordering::*;
        let ri = self.root(i);
        let rj = self.root(j);

        match usize::cmp(&ri, &rj) {
            Less    => self.p[rj] = ri,
            Equal   => (),
            Greater => self.p[ri] = rj,
        }
    }

    /// Union all elements of `iter` into one class.
    pub fn union_all<I>(&mut self, iter: I)
    where I: IntoIterator<Item = usize> {
        let mut iter = iter.into_iter();
        if let Some(first) = iter.next() {
            for i in iter {
                self.union(first, i);
            }
        }
    }

    /// The classes, each sorted, ordered by their smallest element.
    pub fn group(&self) -> Vec<Vec<usize>> {
        let n = self.size();
        (0..n).into_group_map_by(|&i| self.root(i)).into_iter().sorted_by_key(|&(i, _)| i).map(|(_, l)| l).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roots_are_minimal() {
        let mut u = UnionFind::new(5);
        assert_eq!(u.group().len(), 5);

        u.union(3, 1);
        u.union(4, 3);
        assert_eq!(u.root(4), 1);
        assert!(u.is_same(1, 4));
        assert!(!u.is_same(0, 4));

        u.union(2, 0);
        u.union(4, 2);
        assert_eq!((0..5).map(|i| u.root(i)).collect::<Vec<_>>(), vec![0; 5]);
        assert_eq!(u.group(), vec![vec![0, 1, 2, 3, 4]]);
    }

    #[test]
    fn union_all() {
        let mut u = UnionFind::new(6);
        u.union_all([4, 1, 5]);
        u.union_all([3]);
        u.union_all([]);

        assert_eq!(u.size(), 6);
        assert_eq!(u.group(), vec![vec![0], vec![1, 4, 5], vec![2], vec![3]]);
    }
}
