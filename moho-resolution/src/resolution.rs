use std::fmt;
use std::ops::Index;
use std::sync::Arc;
use ahash::AHashSet;
use itertools::Itertools;
use log::{debug, info};
use moho::format::table;
use moho_matrix::dense::{kernel_basis, Mat};
use moho_homology::AbGroup;

use crate::{cover, CacheStats, Monoid, NodeCache, ResolutionConfig, ResolutionNode, Result};

/// A projective resolution of the trivial ℤ[M]-module ℤ, where each stage
/// is split into independent nodes.
///
/// ```text
///   0 <-- ℤ <-- ℤ[M]e₀ <-- P₁ <-- P₂ <-- ⋯
/// ```
///
/// `P_d` is the direct sum of the domains of the nodes at dimension `d`.
/// A node may occur several times, both within a dimension and across
/// dimensions; it is stored once in the cache.
pub struct BranchedResolution {
    monoid: Monoid,
    config: ResolutionConfig,
    base_gen: usize,
    levels: Vec<Vec<Arc<ResolutionNode>>>,
    cache: NodeCache,
}

impl BranchedResolution {
    /// Starts from the augmentation `ℤ[M]e₀ → ℤ` where `e₀` has the smallest
    /// L-class, and covers its kernel.
    pub fn new(monoid: Monoid, config: ResolutionConfig) -> Result<Self> {
        let e = monoid.min_lclass_idempotent();
        let n = monoid.lclass(e).len();

        let aug = Mat::from_data((1, n), std::iter::repeat(1).take(n));
        let kernel = kernel_basis(&aug);
        let res = cover(&monoid, &[e], &kernel, &config)?;

        debug!("augmentation from e = {e} (rank {n}), dim 1: {:?}", res.input_gens);

        let cache = NodeCache::new();
        let node = cache.get_or_insert((res.input_gens, vec![e], res.matrix));

        Ok(Self {
            monoid,
            config,
            base_gen: e,
            levels: vec![vec![node]],
            cache,
        })
    }

    pub fn monoid(&self) -> &Monoid {
        &self.monoid
    }

    pub fn config(&self) -> &ResolutionConfig {
        &self.config
    }

    /// The generator `e₀` of the dimension 0 module.
    pub fn base_gen(&self) -> usize {
        self.base_gen
    }

    /// The largest dimension built so far.
    pub fn max_dim(&self) -> usize {
        self.levels.len()
    }

    /// The nodes at dimension `d ≥ 1`, with multiplicity.
    pub fn nodes(&self, d: usize) -> &[Arc<ResolutionNode>] {
        assert!(d >= 1 && d <= self.max_dim(), "dimension {d} is not built");
        &self.levels[d - 1]
    }

    /// Builds the nodes up to dimension `maxdim`.
    pub fn extend(&mut self, maxdim: usize) -> Result<()> {
        while self.levels.len() < maxdim {
            let d = self.levels.len() + 1;
            let next = self.expand_last()?;

            debug!("dim {d}: {} nodes, {} gens", next.len(), next.iter().map(|n| n.gens().len()).sum::<usize>());

            self.levels.push(next);
        }
        Ok(())
    }

    fn expand_last(&self) -> Result<Vec<Arc<ResolutionNode>>> {
        let last = self.levels.last().map(|l| l.as_slice()).unwrap_or(&[]);
        let expand = |node: &Arc<ResolutionNode>| -> Result<Vec<Arc<ResolutionNode>>> {
            let children = node.expand(&self.monoid, &self.config, &self.cache)?;
            Ok(children.nodes().to_vec())
        };

        // a node may occur several times in a level; expand each one once.
        let distinct = Self::distinct(last);

        cfg_if::cfg_if! {
        if #[cfg(feature = "multithread")] {
            if crate::config::is_multithread_enabled() {
                use rayon::prelude::*;
                distinct.par_iter().map(|n| expand(n).map(|_| ())).collect::<Result<()>>()?;
            } else {
                distinct.iter().map(|n| expand(n).map(|_| ())).collect::<Result<()>>()?;
            }
        } else {
            distinct.iter().map(|n| expand(n).map(|_| ())).collect::<Result<()>>()?;
        }}

        let children = last.iter().map(expand).collect::<Result<Vec<_>>>()?;
        Ok(children.into_iter().flatten().collect())
    }

    fn distinct(nodes: &[Arc<ResolutionNode>]) -> Vec<&Arc<ResolutionNode>> {
        nodes.iter().unique_by(|n| Arc::as_ptr(n)).collect()
    }

    /// `H_d(BM; ℤ)`.
    pub fn homology(&mut self, d: usize) -> Result<AbGroup> {
        if d == 0 {
            return Ok(AbGroup::z())
        }
        self.extend(d + 1)?;
        self.compute_homology(&self.levels[d - 1])
    }

    /// `H_1, …, H_maxdim`.
    pub fn homology_list(&mut self, maxdim: usize) -> Result<HomologyList> {
        self.extend(maxdim + 1)?;

        let distinct = self.levels[..maxdim].iter().flatten().unique_by(|n| Arc::as_ptr(n)).collect_vec();
        debug!("computing homology of {} distinct nodes", distinct.len());

        cfg_if::cfg_if! {
        if #[cfg(feature = "multithread")] {
            if crate::config::is_multithread_enabled() {
                use rayon::prelude::*;
                distinct.par_iter().map(|n| n.homology().map(|_| ())).collect::<Result<()>>()?;
            }
        }}

        let list = self.levels[..maxdim].iter().map(|nodes|
            self.compute_homology(nodes)
        ).collect::<Result<Vec<_>>>()?;

        Ok(HomologyList(list))
    }

    fn compute_homology(&self, nodes: &[Arc<ResolutionNode>]) -> Result<AbGroup> {
        let summands = nodes.iter().map(|n| n.homology()).collect::<Result<Vec<_>>>()?;
        Ok(summands.into_iter().sum())
    }

    /// The number of generators at each dimension, starting from 0.
    pub fn generator_counts(&self) -> Vec<usize> {
        std::iter::once(1).chain(self.levels.iter().map(|nodes|
            nodes.iter().map(|n| n.gens().len()).sum()
        )).collect()
    }

    /// The number of nodes at each dimension, starting from 1.
    pub fn node_counts(&self) -> Vec<usize> {
        self.levels.iter().map(|nodes| nodes.len()).collect()
    }

    pub fn distinct_node_counts(&self) -> Vec<usize> {
        self.levels.iter().map(|nodes|
            nodes.iter().map(Arc::as_ptr).collect::<AHashSet<_>>().len()
        ).collect()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// The first dimension with no generators, if reached.
    pub fn finite_dimension(&self) -> Option<usize> {
        self.generator_counts().into_iter().position(|c| c == 0)
    }

    pub fn is_finite(&self) -> bool {
        self.finite_dimension().is_some()
    }

    /// The number of generators in the last built dimension that belong to
    /// nodes not occurring in any earlier dimension.
    pub fn novelty(&self) -> usize {
        let Some((last, earlier)) = self.levels.split_last() else {
            return 0
        };
        let seen = earlier.iter().flatten().map(Arc::as_ptr).collect::<AHashSet<_>>();
        last.iter()
            .unique_by(|n| Arc::as_ptr(n))
            .filter(|n| !seen.contains(&Arc::as_ptr(n)))
            .map(|n| n.gens().len())
            .sum()
    }

    pub fn stats_table(&self) -> String {
        let gens = self.generator_counts();
        let nodes = self.node_counts();
        let distinct = self.distinct_node_counts();

        table("d", 1..=self.max_dim(), ["gens", "nodes", "distinct"].into_iter(), |&d, &c| match c {
            "gens" => gens[d],
            "nodes" => nodes[d - 1],
            _ => distinct[d - 1],
        })
    }

    pub fn print_stats(&self) {
        let s = self.cache_stats();
        info!("resolution of a monoid of order {} up to dim {}", self.monoid.order(), self.max_dim());
        info!("\n{}", self.stats_table());
        info!("cache: {} nodes, {} hits, {} misses", s.size, s.hits, s.misses);
    }
}

impl fmt::Debug for BranchedResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BranchedResolution")
            .field("order", &self.monoid.order())
            .field("base_gen", &self.base_gen)
            .field("generator_counts", &self.generator_counts())
            .finish()
    }
}

/// `H_1, H_2, …`, rendered as `[C2, 0, C2]`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HomologyList(pub Vec<AbGroup>);

impl HomologyList {
    pub fn groups(&self) -> &[AbGroup] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Index<usize> for HomologyList {
    type Output = AbGroup;

    fn index(&self, i: usize) -> &AbGroup {
        &self.0[i]
    }
}

impl fmt::Display for HomologyList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0.iter().map(|h| h.invariant_string()).join(", ");
        write!(f, "[{s}]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zmod2() -> BranchedResolution {
        BranchedResolution::new(Monoid::cyclic(2).unwrap(), ResolutionConfig::default()).unwrap()
    }

    #[test]
    fn init() {
        let res = zmod2();
        assert_eq!(res.base_gen(), 0);
        assert_eq!(res.max_dim(), 1);
        assert_eq!(res.generator_counts(), vec![1, 1]);
        assert_eq!(res.nodes(1)[0].gens(), &[0]);
        assert_eq!(res.nodes(1)[0].target(), &[0]);
    }

    #[test]
    fn periodic_nodes_are_shared() {
        let mut res = zmod2();
        res.extend(4).unwrap();

        assert_eq!(res.node_counts(), vec![1, 1, 1, 1]);
        assert!(Arc::ptr_eq(&res.nodes(1)[0], &res.nodes(3)[0]));
        assert!(Arc::ptr_eq(&res.nodes(2)[0], &res.nodes(4)[0]));
        assert!(!Arc::ptr_eq(&res.nodes(1)[0], &res.nodes(2)[0]));
        assert_eq!(res.cache_stats().size, 2);
        assert_eq!(res.novelty(), 0);
        assert!(!res.is_finite());
    }

    #[test]
    fn repeated_nodes_expand_once() {
        let band: Vec<Vec<usize>> = (0..9).map(|x| (0..9).map(|y| 3 * (x / 3) + y % 3).collect()).collect();
        let m = Monoid::adjoin_identity(&band).unwrap();
        let mut res = BranchedResolution::new(m, ResolutionConfig::default()).unwrap();
        res.extend(3).unwrap();

        let level = res.nodes(2);
        assert_eq!(level.len(), 2);
        assert!(Arc::ptr_eq(&level[0], &level[1]));
        assert!(level[0].is_expanded());

        assert_eq!(res.node_counts(), vec![1, 2, 6]);
        assert_eq!(res.cache_stats(), CacheStats { hits: 3, misses: 3, size: 3 });
    }

    #[test]
    fn homology_zmod2() {
        let mut res = zmod2();
        let h = res.homology_list(4).unwrap();
        assert_eq!(h.to_string(), "[C2, 0, C2, 0]");
        assert_eq!(res.homology(0).unwrap(), AbGroup::z());
        assert_eq!(res.homology(3).unwrap(), AbGroup::zmod(2));
    }

    #[test]
    fn trivial_monoid() {
        let m = Monoid::new(vec![vec![0]]).unwrap();
        let mut res = BranchedResolution::new(m, ResolutionConfig::default()).unwrap();

        assert_eq!(res.generator_counts(), vec![1, 0]);
        assert_eq!(res.finite_dimension(), Some(1));

        let h = res.homology_list(3).unwrap();
        assert_eq!(h.to_string(), "[0, 0, 0]");
        assert_eq!(res.node_counts(), vec![1, 0, 0, 0]);
    }

    #[test]
    fn stats_table() {
        let mut res = zmod2();
        res.extend(2).unwrap();
        let t = res.stats_table();
        assert!(t.contains("gens"));
        assert_eq!(t.lines().count(), 3);
    }

    #[test]
    fn homology_list_display() {
        let h = HomologyList(vec![AbGroup::zmod(2), AbGroup::zero(), AbGroup::new([0, 0, 6])]);
        assert_eq!(h.to_string(), "[C2, 0, Z x Z x C6]");
        assert_eq!(h.len(), 3);
        assert_eq!(h[2].rank(), 2);
    }
}
