use super::error::TreeError;
use super::node::NodeId as ArenaNodeId;
use super::tree::Tree;
use std::collections::HashMap;

/// Deterministic, content-derived identifier for a persisted node: 16 lowercase
/// hex characters (spec.md §3: `hash(tree_id || ":node:" || preorder_index)`).
pub type NodeKey = String;

/// A node of a persisted tree, addressed by `NodeKey` rather than by pointer
/// or arena index (spec.md §9: "nodes reference each other by identifier").
///
/// spec.md's external schema (§6) names only `left_child_id`/`right_child_id`,
/// which models a binary tree. The Newick grammar (§4.A) is permissive and
/// allows multifurcating (n-ary) internal nodes, so this struct keeps the
/// full ordered `child_ids` list as the source of truth for traversal and
/// round-tripping, and exposes `left_child_id`/`right_child_id` as schema-
/// compatible accessors over its first two entries.
#[derive(Debug, Clone)]
pub struct PersistedNode {
    pub id: NodeKey,
    pub tree_id: String,
    pub label: Option<String>,
    pub parent_id: Option<NodeKey>,
    /// Ordered child ids, preserved from Newick source order.
    pub child_ids: Vec<NodeKey>,
    pub depth: usize,
    /// Branch length to parent; 0.0 if unset in the source.
    pub branch_length: f64,
    pub is_leaf: bool,
    /// Filled by `fingerprint::compute_position_embeddings` at ingest time.
    pub position_embedding: Option<[f32; 64]>,
    pub metadata: Option<std::collections::BTreeMap<String, String>>,
}

impl PersistedNode {
    pub fn left_child_id(&self) -> Option<&NodeKey> {
        self.child_ids.first()
    }

    pub fn right_child_id(&self) -> Option<&NodeKey> {
        if self.child_ids.len() >= 2 {
            self.child_ids.get(1)
        } else {
            None
        }
    }
}

/// Derive the deterministic id of the node at `preorder_index` within `tree_id`.
pub fn node_key(tree_id: &str, preorder_index: usize) -> NodeKey {
    let composite = format!("{}:node:{}", tree_id, preorder_index);
    format!("{:016x}", fxhash::hash64(&composite))
}

/// Output of the node graph builder (spec.md §4.B): the ordered node list
/// (root first) plus the tree-level leaf/node counts.
pub struct GraphSummary {
    pub nodes: Vec<PersistedNode>,
    pub num_leaves: usize,
    pub num_nodes: usize,
}

/// Traverse `tree` in pre-order, assigning each clade a deterministic id and
/// materialising parent/children/depth/branch-length (spec.md §4.B).
///
/// Child ordering is preserved exactly from the parser ("left" = first child
/// in Newick source): it affects node ids but not the fingerprint, which
/// canonicalises.
pub fn build_graph(tree: &Tree, tree_id: &str) -> Result<GraphSummary, TreeError> {
    let root = tree
        .get_root()
        .ok_or_else(|| TreeError::InvalidArgument("tree has no root".to_string()))?;
    let order = tree.preorder(&root)?;

    let mut index_of: HashMap<ArenaNodeId, usize> = HashMap::with_capacity(order.len());
    for (i, &id) in order.iter().enumerate() {
        index_of.insert(id, i);
    }

    let mut nodes: Vec<PersistedNode> = Vec::with_capacity(order.len());
    let mut num_leaves = 0usize;

    for (i, &arena_id) in order.iter().enumerate() {
        let node = tree.get_node(arena_id).ok_or_else(|| {
            TreeError::Internal(format!("node {} missing from arena during graph build", arena_id))
        })?;

        let key = node_key(tree_id, i);

        let parent_id = match node.parent {
            Some(p) => {
                let p_idx = *index_of
                    .get(&p)
                    .ok_or_else(|| TreeError::Internal("parent not visited before child".to_string()))?;
                Some(node_key(tree_id, p_idx))
            }
            None => None,
        };

        let child_ids: Vec<NodeKey> = node
            .children
            .iter()
            .map(|c| {
                let c_idx = *index_of.get(c).unwrap();
                node_key(tree_id, c_idx)
            })
            .collect();

        let depth = match node.parent {
            None => 0,
            Some(p) => {
                let p_idx = *index_of.get(&p).unwrap();
                nodes[p_idx].depth + 1
            }
        };

        let is_leaf = node.children.is_empty();
        if is_leaf {
            num_leaves += 1;
        }

        nodes.push(PersistedNode {
            id: key,
            tree_id: tree_id.to_string(),
            label: node.name.clone(),
            parent_id,
            child_ids,
            depth,
            branch_length: node.length.unwrap_or(0.0),
            is_leaf,
            position_embedding: None,
            metadata: None,
        });
    }

    Ok(GraphSummary {
        num_nodes: nodes.len(),
        num_leaves,
        nodes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_graph_basic() {
        let tree = Tree::from_newick("((A:0.1,B:0.1):0.3,(C:0.2,D:0.2):0.2);").unwrap();
        let summary = build_graph(&tree, "t1").unwrap();

        assert_eq!(summary.num_leaves, 4);
        assert_eq!(summary.num_nodes, 7);

        let root = &summary.nodes[0];
        assert!(root.parent_id.is_none());
        assert_eq!(root.depth, 0);
        assert_eq!(root.child_ids.len(), 2);

        for n in &summary.nodes[1..] {
            assert_eq!(n.depth, {
                let parent = summary
                    .nodes
                    .iter()
                    .find(|p| Some(&p.id) == n.parent_id.as_ref())
                    .unwrap();
                parent.depth + 1
            });
        }
    }

    #[test]
    fn test_parent_child_consistency() {
        let tree = Tree::from_newick("((A,B),C);").unwrap();
        let summary = build_graph(&tree, "t2").unwrap();

        for n in &summary.nodes {
            if let Some(parent_id) = &n.parent_id {
                let parent = summary.nodes.iter().find(|p| &p.id == parent_id).unwrap();
                assert_eq!(parent.child_ids.iter().filter(|c| *c == &n.id).count(), 1);
            }
        }
    }

    #[test]
    fn test_deterministic_ids() {
        let tree_a = Tree::from_newick("(A,B)Root;").unwrap();
        let tree_b = Tree::from_newick("(A,B)Root;").unwrap();
        let sa = build_graph(&tree_a, "same-id").unwrap();
        let sb = build_graph(&tree_b, "same-id").unwrap();
        for (a, b) in sa.nodes.iter().zip(sb.nodes.iter()) {
            assert_eq!(a.id, b.id);
        }
    }

    #[test]
    fn test_multifurcating_node_keeps_all_children() {
        let tree = Tree::from_newick("(A,B,C)Root;").unwrap();
        let summary = build_graph(&tree, "t3").unwrap();
        assert_eq!(summary.nodes[0].child_ids.len(), 3);
        assert_eq!(summary.nodes[0].left_child_id(), Some(&summary.nodes[1].id));
        assert_eq!(summary.nodes[0].right_child_id(), Some(&summary.nodes[2].id));
    }
}
