use std::sync::{Arc, OnceLock};
use itertools::Itertools;
use log::{debug, trace};
use num_traits::Zero;
use moho::{Int, UnionFind};
use moho_matrix::MatTrait;
use moho_matrix::dense::{kernel_basis, Mat};
use moho_homology::{AbGroup, HomologyCalc};

use crate::{cover, BasisLayout, Monoid, NodeCache, ResolutionConfig, ResolutionError, Result, RightMulMatrix};

/// One direct summand of a stage of the resolution:
///
/// ```text
///   ℤ[M]g₁ ⊕ … ⊕ ℤ[M]gₖ ---(matrix)---> ℤ[M]t₁ ⊕ … ⊕ ℤ[M]tₗ
/// ```
///
/// The children cover the kernel of this map, one per block of the
/// partition of the `gᵢ`.
#[derive(Debug)]
pub struct ResolutionNode {
    gens: Vec<usize>,
    target: Vec<usize>,
    matrix: RightMulMatrix,
    children: OnceLock<Result<NodeChildren>>,
    homology: OnceLock<AbGroup>,
}

#[derive(Clone, Debug)]
pub struct NodeChildren {
    partition: Vec<Vec<usize>>,
    nodes: Vec<Arc<ResolutionNode>>,
}

impl NodeChildren {
    /// The blocks of generator indices, sorted, in increasing order.
    pub fn partition(&self) -> &[Vec<usize>] {
        &self.partition
    }

    /// The child covering each block.
    pub fn nodes(&self) -> &[Arc<ResolutionNode>] {
        &self.nodes
    }
}

/// A partition of the generators of a node, together with the kernel
/// vectors falling into each block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    pub bins: Vec<Vec<usize>>,
    pub kernel_bins: Vec<Vec<usize>>,
}

impl ResolutionNode {
    pub fn new(gens: Vec<usize>, target: Vec<usize>, matrix: RightMulMatrix) -> Self {
        assert_eq!(matrix.shape(), (target.len(), gens.len()), "matrix shape mismatch");
        Self {
            gens,
            target,
            matrix,
            children: OnceLock::new(),
            homology: OnceLock::new(),
        }
    }

    pub fn gens(&self) -> &[usize] {
        &self.gens
    }

    pub fn target(&self) -> &[usize] {
        &self.target
    }

    pub fn matrix(&self) -> &RightMulMatrix {
        &self.matrix
    }

    /// The ℤ-rank of the domain.
    pub fn rank(&self, monoid: &Monoid) -> usize {
        self.gens.iter().map(|&e| monoid.lclass(e).len()).sum()
    }

    pub fn z_matrix(&self, monoid: &Monoid) -> Mat {
        let source = BasisLayout::new(monoid, &self.gens);
        let target = BasisLayout::new(monoid, &self.target);
        self.matrix.z_matrix(monoid, &source, &target)
    }

    pub fn kernel_basis(&self, monoid: &Monoid) -> Vec<Vec<Int>> {
        kernel_basis(&self.z_matrix(monoid))
    }

    /// Groups the generators so that every kernel vector touches a single block.
    pub fn partition(&self, monoid: &Monoid, kernel: &[Vec<Int>]) -> Partition {
        let layout = BasisLayout::new(monoid, &self.gens);
        let touched = kernel.iter().map(|v| {
            let t = v.iter().enumerate().filter(|(_, a)| !a.is_zero()).map(|(index, _)|
                layout.pair(index).0
            ).dedup().collect_vec();
            assert!(!t.is_empty(), "zero vector in kernel basis");
            t
        }).collect_vec();

        let mut uf = UnionFind::new(self.gens.len());
        for t in touched.iter() {
            uf.union_all(t.iter().cloned());
        }

        let bins = uf.group();
        let mut j_to_bin = vec![0; self.gens.len()];
        for (b, bin) in bins.iter().enumerate() {
            for &j in bin {
                j_to_bin[j] = b;
            }
        }

        let mut kernel_bins = vec![vec![]; bins.len()];
        for (k, t) in touched.iter().enumerate() {
            kernel_bins[j_to_bin[t[0]]].push(k);
        }

        Partition { bins, kernel_bins }
    }

    /// The children, if already computed.
    pub fn children(&self) -> Option<&NodeChildren> {
        self.children.get().and_then(|r| r.as_ref().ok())
    }

    pub fn is_expanded(&self) -> bool {
        self.children.get().is_some()
    }

    /// Computes the children at most once.
    pub fn expand(&self, monoid: &Monoid, config: &ResolutionConfig, cache: &NodeCache) -> Result<&NodeChildren> {
        self.children.get_or_init(||
            self.make_children(monoid, config, cache)
        ).as_ref().map_err(|e| e.clone())
    }

    fn make_children(&self, monoid: &Monoid, config: &ResolutionConfig, cache: &NodeCache) -> Result<NodeChildren> {
        let rank = self.rank(monoid);
        if let Some(max) = config.max_rank {
            if rank > max {
                return Err(ResolutionError::ResourceLimit(format!("node of rank {rank} exceeds {max}")))
            }
        }

        let kernel = self.kernel_basis(monoid);

        if let Some(max) = config.max_bits {
            let bits = kernel.iter().flatten().map(|a| a.bits()).max().unwrap_or(0);
            if bits > max {
                return Err(ResolutionError::ResourceLimit(format!("kernel entries of {bits} bits exceed {max}")))
            }
        }

        let Partition { bins, kernel_bins } = self.partition(monoid, &kernel);

        debug!("expand node: {} gens, rank {rank}, kernel {}, {} blocks", self.gens.len(), kernel.len(), bins.len());

        let layout = BasisLayout::new(monoid, &self.gens);
        let make_child = |b: usize| -> Result<Arc<ResolutionNode>> {
            let bin = &bins[b];
            let coords = bin.iter().flat_map(|&j| layout.summand_range(j)).collect_vec();
            let vecs = kernel_bins[b].iter().map(|&k|
                coords.iter().map(|&c| kernel[k][c].clone()).collect_vec()
            ).collect_vec();
            let target = bin.iter().map(|&j| self.gens[j]).collect_vec();

            let res = cover(monoid, &target, &vecs, config)?;
            trace!("block {b}: {:?} <- {:?} by {}", target, res.input_gens, res.matrix);

            Ok(cache.get_or_insert((res.input_gens, target, res.matrix)))
        };

        cfg_if::cfg_if! {
        if #[cfg(feature = "multithread")] {
            let nodes = if crate::config::is_multithread_enabled() {
                use rayon::prelude::*;
                (0..bins.len()).into_par_iter().map(make_child).collect::<Result<Vec<_>>>()?
            } else {
                (0..bins.len()).map(make_child).collect::<Result<Vec<_>>>()?
            };
            Ok(NodeChildren { partition: bins, nodes })
        } else {
            let nodes = (0..bins.len()).map(make_child).collect::<Result<Vec<_>>>()?;
            Ok(NodeChildren { partition: bins, nodes })
        }}
    }

    /// The homology at this node: `ker(matrix ⊗ ℤ) / im(children ⊗ ℤ)`.
    ///
    /// Panics if the node has not been expanded.
    pub fn homology(&self) -> Result<&AbGroup> {
        let Some(children) = self.children.get() else {
            panic!("node is not expanded")
        };
        let children = children.as_ref().map_err(|e| e.clone())?;
        Ok(self.homology.get_or_init(|| self.compute_homology(children)))
    }

    fn compute_homology(&self, children: &NodeChildren) -> AbGroup {
        let n = self.gens.len();
        let total = children.nodes.iter().map(|c| c.gens.len()).sum();

        let outgoing = self.matrix.tensor_z();
        let mut incoming = Mat::zero((n, total));
        let mut offset = 0;

        for (bin, child) in children.partition.iter().zip(children.nodes.iter()) {
            let t = child.matrix.tensor_z();
            assert_eq!(t.nrows(), bin.len());

            for i in 0..t.nrows() {
                for j in 0..t.ncols() {
                    incoming[(bin[i], offset + j)] += &t[(i, j)];
                }
            }
            offset += t.ncols();
        }

        HomologyCalc::calculate(&incoming, &outgoing)
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

    fn rmat(rows: &[&[&[(i64, usize)]]], ncols: usize) -> RightMulMatrix {
        let rows = rows.iter().map(|row|
            row.iter().map(|cell|
                cell.iter().map(|&(c, m)| (Int::from(c), m)).collect()
            ).collect()
        ).collect();
        RightMulMatrix::new(rows, ncols)
    }

    fn vecs(data: &[&[i64]]) -> Vec<Vec<Int>> {
        data.iter().map(|v| v.iter().map(|&a| Int::from(a)).collect()).collect()
    }

    #[test]
    fn rect22_dim1() {
        let m = rect22();
        let cache = NodeCache::new();
        let node = ResolutionNode::new(vec![4], vec![0], rmat(&[&[&[(-1, 0), (1, 2)]]], 1));

        assert_eq!(node.rank(&m), 5);
        assert_eq!(node.z_matrix(&m), Mat::from_data((2, 5), [
            0, 0, 0, 0, -1,
            0, 0, 0, 0,  1,
        ]));

        let mut k = node.kernel_basis(&m);
        k.sort();
        k.reverse();
        assert_eq!(k, vecs(&[&[1,0,0,0,0], &[0,1,0,0,0], &[0,0,1,0,0], &[0,0,0,1,0]]));

        let p = node.partition(&m, &k);
        assert_eq!(p.bins, vec![vec![0]]);
        assert_eq!(p.kernel_bins, vec![vec![0, 1, 2, 3]]);

        let children = node.expand(&m, &ResolutionConfig::default(), &cache).unwrap();
        let [child] = children.nodes() else { panic!() };
        assert_eq!(child.gens(), &[0, 0]);
        assert_eq!(child.target(), &[4]);
        assert_eq!(child.matrix(), &rmat(&[&[&[(1, 0)], &[(1, 1)]]], 2));
    }

    #[test]
    fn rect22_dim2() {
        let m = rect22();
        let cache = NodeCache::new();
        let node = ResolutionNode::new(vec![0, 0], vec![4], rmat(&[&[&[(1, 0)], &[(1, 1)]]], 2));

        assert_eq!(node.z_matrix(&m), Mat::from_data((5, 4), [
            1, 0, 0, 0,
            0, 0, 1, 0,
            0, 1, 0, 0,
            0, 0, 0, 1,
            0, 0, 0, 0,
        ]));
        assert!(node.kernel_basis(&m).is_empty());

        let p = node.partition(&m, &[]);
        assert_eq!(p.bins, vec![vec![0], vec![1]]);
        assert_eq!(p.kernel_bins, vec![Vec::<usize>::new(), vec![]]);

        let children = node.expand(&m, &ResolutionConfig::default(), &cache).unwrap();
        assert_eq!(children.nodes().len(), 2);
        for child in children.nodes() {
            assert!(child.gens().is_empty());
            assert_eq!(child.target(), &[0]);
            assert_eq!(child.matrix(), &RightMulMatrix::empty(1));
        }

        // both blocks give the same node
        assert!(Arc::ptr_eq(&children.nodes()[0], &children.nodes()[1]));
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);

        assert_eq!(node.homology().unwrap(), &AbGroup::z());
    }

    #[test]
    fn rect22_dim3() {
        let m = rect22();
        let cache = NodeCache::new();
        let node = ResolutionNode::new(vec![], vec![0], RightMulMatrix::empty(1));

        assert_eq!(node.z_matrix(&m).shape(), (2, 0));
        assert!(node.kernel_basis(&m).is_empty());
        assert_eq!(node.partition(&m, &[]), Partition { bins: vec![], kernel_bins: vec![] });

        let children = node.expand(&m, &ResolutionConfig::default(), &cache).unwrap();
        assert!(children.nodes().is_empty());
        assert!(node.homology().unwrap().is_trivial());
    }

    #[test]
    fn partition_merges_blocks() {
        let m = Monoid::cyclic(2).unwrap();
        let node = ResolutionNode::new(vec![0, 0, 0], vec![], RightMulMatrix::new(vec![], 3));
        let k = vecs(&[&[1, 0, 0, 0, 1, 0], &[0, 1, 0, 0, 0, 0], &[0, 0, 0, 1, 0, 0]]);

        let p = node.partition(&m, &k);
        assert_eq!(p.bins, vec![vec![0, 2], vec![1]]);
        assert_eq!(p.kernel_bins, vec![vec![0, 1], vec![2]]);
    }

    #[test]
    fn resource_limit() {
        let m = rect22();
        let cache = NodeCache::new();
        let node = ResolutionNode::new(vec![4], vec![0], rmat(&[&[&[(-1, 0), (1, 2)]]], 1));
        let config = ResolutionConfig { max_rank: Some(4), ..Default::default() };

        let err = node.expand(&m, &config, &cache).unwrap_err();
        assert!(matches!(err, ResolutionError::ResourceLimit(_)));
        assert!(node.is_expanded());
        assert!(node.children().is_none());
        assert!(node.homology().is_err());
    }

    #[test]
    #[should_panic]
    fn shape_mismatch() {
        ResolutionNode::new(vec![0, 0], vec![4], RightMulMatrix::empty(1));
    }
}
