//! Disjoint-set forest shared by the edge-scanning MST strategies.

/// Union-find over dense vertex ids `0..n`.
///
/// Path compression only; no rank tracking. The strategies scan edges in
/// weight order, so trees stay shallow enough in practice.
#[derive(Debug)]
pub struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    /// Root of `x`'s set, compressing the walked chain onto the root.
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut current = x;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    /// Merge the sets of `a` and `b`. Returns false when they were already
    /// joined, which is how the strategies detect cycle-closing edges.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        self.parent[rb] = ra;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singletons_are_their_own_roots() {
        let mut uf = UnionFind::new(4);
        for i in 0..4 {
            assert_eq!(uf.find(i), i);
        }
    }

    #[test]
    fn union_merges_and_rejects_cycles() {
        let mut uf = UnionFind::new(5);
        assert!(uf.union(0, 1));
        assert!(uf.union(1, 2));
        assert!(!uf.union(0, 2), "0 and 2 already share a root");
        assert!(uf.union(3, 4));
        assert_ne!(uf.find(0), uf.find(3));
        assert!(uf.union(2, 4));
        assert_eq!(uf.find(0), uf.find(3));
    }

    #[test]
    fn find_compresses_chains() {
        let mut uf = UnionFind::new(4);
        uf.union(0, 1);
        uf.union(0, 2);
        uf.union(0, 3);
        let root = uf.find(3);
        assert_eq!(uf.find(1), root);
        assert_eq!(uf.find(2), root);
    }
}
