use super::error::TreeError;
use super::fingerprint::FINGERPRINT_DIM;
use super::graph::PersistedNode;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use time::OffsetDateTime;

/// A persisted tree record (spec.md §3 "Tree (persisted)").
#[derive(Debug, Clone)]
pub struct PersistedTree {
    pub id: String,
    pub name: String,
    /// The original Newick string, preserved verbatim.
    pub newick: String,
    pub fingerprint: [f32; FINGERPRINT_DIM],
    pub num_leaves: usize,
    pub num_nodes: usize,
    pub metadata: Option<BTreeMap<String, String>>,
    pub created_at: OffsetDateTime,
}

/// cladogram / phylogram / mixed classification from branch-length presence
/// (spec.md §11 supplement #4 — already known the way the teacher's
/// `cmd_pgr::nwk::stat` computes it, carried here as a convenience field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeType {
    Cladogram,
    Phylogram,
    Mixed,
}

impl std::fmt::Display for TreeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TreeType::Cladogram => "cladogram",
            TreeType::Phylogram => "phylogram",
            TreeType::Mixed => "mixed",
        };
        write!(f, "{}", s)
    }
}

impl PersistedTree {
    pub fn tree_type(&self, nodes: &[PersistedNode]) -> TreeType {
        let non_root: Vec<&PersistedNode> = nodes.iter().filter(|n| n.parent_id.is_some()).collect();
        if non_root.is_empty() {
            return TreeType::Cladogram;
        }
        let with_length = non_root.iter().filter(|n| n.branch_length > 0.0).count();
        if with_length == 0 {
            TreeType::Cladogram
        } else if with_length == non_root.len() {
            TreeType::Phylogram
        } else {
            TreeType::Mixed
        }
    }
}

/// A single hit from `Corpus::search` (spec.md §4.E).
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub tree_id: String,
    pub score: f32,
}

/// Derive a default tree id for callers that don't supply one (SPEC_FULL.md
/// §13 open-question resolution): deterministic so re-ingesting byte-identical
/// input is idempotent at the id level.
pub fn default_tree_id(name: &str, newick: &str) -> String {
    format!("{:016x}", fxhash::hash64(&(name, newick)))
}

#[derive(Default)]
struct CorpusInner {
    trees: HashMap<String, PersistedTree>,
    tree_order: Vec<String>,
    /// Nodes in insertion (preorder) order across all trees, for deterministic
    /// `nodes_of` output; `node_index` gives O(1) lookup by id.
    nodes: Vec<PersistedNode>,
    node_index: HashMap<String, usize>,
}

/// The in-memory corpus (spec.md §3 "Corpus", §4.E, §5): a `tree_id -> Tree`
/// and `node_id -> Node` double map guarded by a single reader-writer lock,
/// exactly the shape spec.md §5 prescribes ("reader-writer lock wrapping the
/// two maps" — no extra crate needed, `std::sync::RwLock` suffices).
#[derive(Default)]
pub struct Corpus {
    inner: RwLock<CorpusInner>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_guard(&self) -> Result<std::sync::RwLockReadGuard<'_, CorpusInner>, TreeError> {
        self.inner
            .read()
            .map_err(|_| TreeError::Internal("corpus read lock poisoned".to_string()))
    }

    fn write_guard(&self) -> Result<std::sync::RwLockWriteGuard<'_, CorpusInner>, TreeError> {
        self.inner
            .write()
            .map_err(|_| TreeError::Internal("corpus write lock poisoned".to_string()))
    }

    /// Insert a tree and its nodes atomically: either both are visible to
    /// readers afterwards, or (on a duplicate id) neither is (spec.md §5's
    /// ordering guarantee; §7: "no partial mutation").
    pub fn insert(&self, tree: PersistedTree, nodes: Vec<PersistedNode>) -> Result<(), TreeError> {
        let mut guard = self.write_guard()?;
        if guard.trees.contains_key(&tree.id) {
            return Err(TreeError::InvalidArgument(format!(
                "tree id '{}' already exists",
                tree.id
            )));
        }
        guard.tree_order.push(tree.id.clone());
        for n in nodes {
            let idx = guard.nodes.len();
            guard.node_index.insert(n.id.clone(), idx);
            guard.nodes.push(n);
        }
        guard.trees.insert(tree.id.clone(), tree);
        Ok(())
    }

    pub fn get_tree(&self, id: &str) -> Result<PersistedTree, TreeError> {
        let guard = self.read_guard()?;
        guard
            .trees
            .get(id)
            .cloned()
            .ok_or_else(|| TreeError::NotFound(format!("tree '{}'", id)))
    }

    /// Trees in insertion order, truncated to `limit`.
    pub fn list_trees(&self, limit: usize) -> Result<Vec<PersistedTree>, TreeError> {
        let guard = self.read_guard()?;
        Ok(guard
            .tree_order
            .iter()
            .take(limit)
            .filter_map(|id| guard.trees.get(id).cloned())
            .collect())
    }

    pub fn get_node(&self, id: &str) -> Result<PersistedNode, TreeError> {
        let guard = self.read_guard()?;
        guard
            .node_index
            .get(id)
            .and_then(|&i| guard.nodes.get(i))
            .cloned()
            .ok_or_else(|| TreeError::NotFound(format!("node '{}'", id)))
    }

    /// All nodes of `tree_id`, in the preorder they were ingested.
    pub fn nodes_of(&self, tree_id: &str) -> Result<Vec<PersistedNode>, TreeError> {
        let guard = self.read_guard()?;
        if !guard.trees.contains_key(tree_id) {
            return Err(TreeError::NotFound(format!("tree '{}'", tree_id)));
        }
        Ok(guard
            .nodes
            .iter()
            .filter(|n| n.tree_id == tree_id)
            .cloned()
            .collect())
    }

    /// Cosine top-K search (spec.md §4.E). Fingerprints are stored
    /// pre-normalised, so similarity reduces to a dot product; results are
    /// clamped into `[-1, 1]` then reported in `[0, 1]`. Ties keep insertion
    /// order (the sort below is stable and the candidate list is built in
    /// insertion order).
    pub fn search(&self, query_vec: &[f32; FINGERPRINT_DIM], k: usize) -> Result<Vec<SearchHit>, TreeError> {
        let guard = self.read_guard()?;
        let mut hits: Vec<SearchHit> = guard
            .tree_order
            .iter()
            .filter_map(|id| guard.trees.get(id))
            .map(|t| {
                let dot: f32 = query_vec
                    .iter()
                    .zip(t.fingerprint.iter())
                    .map(|(a, b)| a * b)
                    .sum();
                let clamped = dot.clamp(-1.0, 1.0);
                let score = clamped.max(0.0).min(1.0);
                SearchHit {
                    tree_id: t.id.clone(),
                    score,
                }
            })
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        hits.truncate(k);
        Ok(hits)
    }

    /// Remove the tree and all its nodes. Returns the number of node records
    /// removed, or `NotFound` if `tree_id` is absent.
    pub fn delete(&self, tree_id: &str) -> Result<usize, TreeError> {
        let mut guard = self.write_guard()?;
        if guard.trees.remove(tree_id).is_none() {
            return Err(TreeError::NotFound(format!("tree '{}'", tree_id)));
        }
        guard.tree_order.retain(|id| id != tree_id);
        let before = guard.nodes.len();
        guard.nodes.retain(|n| n.tree_id != tree_id);
        let removed = before - guard.nodes.len();
        guard.node_index.clear();
        for (i, n) in guard.nodes.iter().enumerate() {
            guard.node_index.insert(n.id.clone(), i);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::phylo::fingerprint::compute_fingerprint;
    use crate::libs::phylo::graph::build_graph;
    use crate::libs::phylo::tree::Tree;

    fn ingest(corpus: &Corpus, id: &str, newick: &str) -> PersistedTree {
        let tree = Tree::from_newick(newick).unwrap();
        let fp = compute_fingerprint(&tree, true);
        let summary = build_graph(&tree, id).unwrap();
        let persisted = PersistedTree {
            id: id.to_string(),
            name: id.to_string(),
            newick: newick.to_string(),
            fingerprint: fp,
            num_leaves: summary.num_leaves,
            num_nodes: summary.num_nodes,
            metadata: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        corpus.insert(persisted.clone(), summary.nodes).unwrap();
        persisted
    }

    #[test]
    fn test_insert_get_list() {
        let corpus = Corpus::new();
        ingest(&corpus, "t1", "(A,B);");
        ingest(&corpus, "t2", "(C,D);");

        assert_eq!(corpus.get_tree("t1").unwrap().id, "t1");
        assert_eq!(corpus.list_trees(10).unwrap().len(), 2);
        assert_eq!(corpus.list_trees(1).unwrap()[0].id, "t1");
        assert!(corpus.get_tree("missing").is_err());
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let corpus = Corpus::new();
        ingest(&corpus, "t1", "(A,B);");
        let tree = Tree::from_newick("(C,D);").unwrap();
        let summary = build_graph(&tree, "t1").unwrap();
        let persisted = PersistedTree {
            id: "t1".to_string(),
            name: "dup".to_string(),
            newick: "(C,D);".to_string(),
            fingerprint: compute_fingerprint(&tree, true),
            num_leaves: summary.num_leaves,
            num_nodes: summary.num_nodes,
            metadata: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        assert!(corpus.insert(persisted, summary.nodes).is_err());
        // original record must be untouched
        assert_eq!(corpus.get_tree("t1").unwrap().newick, "(A,B);");
    }

    #[test]
    fn test_search_self_and_delete() {
        let corpus = Corpus::new();
        let t1 = ingest(&corpus, "t1", "((A:0.1,B:0.1):0.3,(C:0.2,D:0.2):0.2);");
        ingest(&corpus, "t2", "((A:0.5,B:0.5):0.3,(C:0.5,D:0.5):0.3);");

        let hits = corpus.search(&t1.fingerprint, 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].tree_id, "t1");
        assert!(hits[0].score >= 0.999);
        assert!(hits[1].score >= 0.95);

        let removed = corpus.delete("t1").unwrap();
        assert!(removed > 0);
        assert!(corpus.get_tree("t1").is_err());
        assert!(corpus.nodes_of("t1").is_err());
        assert!(corpus.delete("t1").is_err());
    }

    #[test]
    fn test_nodes_of_preserves_preorder() {
        let corpus = Corpus::new();
        ingest(&corpus, "t1", "((A,B),C);");
        let nodes = corpus.nodes_of("t1").unwrap();
        assert_eq!(nodes.len(), 5);
        assert!(nodes[0].parent_id.is_none());
    }
}
