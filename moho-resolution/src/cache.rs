use std::sync::{Arc, Mutex, PoisonError};
use ahash::AHashMap;
use moho::util::sync::SyncCounter;

use crate::{ResolutionNode, RightMulMatrix};

/// (domain generators, target generators, outgoing matrix)
pub type NodeKey = (Vec<usize>, Vec<usize>, RightMulMatrix);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub size: usize,
}

/// Content-addressed store of resolution nodes. Equal keys give the same node.
#[derive(Debug, Default)]
pub struct NodeCache {
    nodes: Mutex<AHashMap<NodeKey, Arc<ResolutionNode>>>,
    hits: SyncCounter,
    misses: SyncCounter,
}

impl NodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_insert(&self, key: NodeKey) -> Arc<ResolutionNode> {
        let mut nodes = self.nodes.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(node) = nodes.get(&key) {
            self.hits.incr();
            return node.clone()
        }

        self.misses.incr();

        let (gens, target, matrix) = key.clone();
        let node = Arc::new(ResolutionNode::new(gens, target, matrix));
        nodes.insert(key, node.clone());
        node
    }

    pub fn len(&self) -> usize {
        self.nodes.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hits(&self) -> usize {
        self.hits.count()
    }

    pub fn misses(&self) -> usize {
        self.misses.count()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits(),
            misses: self.misses(),
            size: self.len(),
        }
    }
}
