use super::corpus::{default_tree_id, PersistedTree};
use super::error::TreeError;
use super::fingerprint::{compute_fingerprint, compute_position_embeddings};
use super::graph::{build_graph, PersistedNode};
use super::tree::Tree;
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// Everything `ingest_tree` (spec.md §6) needs to commit a tree: parse,
/// build the node graph, compute the fingerprint and per-node position
/// embeddings, and assemble the persisted records. Does not touch a
/// `Corpus` itself, so callers can decide atomicity (`Corpus::insert`
/// does the actual commit).
pub fn ingest_tree(
    newick: &str,
    name: &str,
    id: Option<String>,
    metadata: Option<BTreeMap<String, String>>,
    created_at: OffsetDateTime,
) -> Result<(PersistedTree, Vec<PersistedNode>), TreeError> {
    let tree = Tree::from_newick(newick)?;
    let id = id.unwrap_or_else(|| default_tree_id(name, newick));

    let summary = build_graph(&tree, &id)?;
    let fingerprint = compute_fingerprint(&tree, true);
    let embeddings = compute_position_embeddings(&tree);

    let order = tree
        .preorder(&tree.get_root().ok_or_else(|| {
            TreeError::InvalidArgument("tree has no root".to_string())
        })?)?;

    let mut nodes = summary.nodes;
    for (node, &arena_id) in nodes.iter_mut().zip(order.iter()) {
        node.position_embedding = embeddings.get(&arena_id).copied();
    }

    let persisted = PersistedTree {
        id,
        name: name.to_string(),
        newick: newick.to_string(),
        fingerprint,
        num_leaves: summary.num_leaves,
        num_nodes: summary.num_nodes,
        metadata,
        created_at,
    };

    Ok((persisted, nodes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_basic() {
        let (tree, nodes) = ingest_tree(
            "((A:0.1,B:0.1):0.3,(C:0.2,D:0.2):0.2);",
            "t1",
            Some("t1".to_string()),
            None,
            OffsetDateTime::UNIX_EPOCH,
        )
        .unwrap();
        assert_eq!(tree.num_leaves, 4);
        assert_eq!(tree.num_nodes, 7);
        assert_eq!(nodes.len(), 7);
        assert!(nodes.iter().all(|n| n.position_embedding.is_some()));
    }

    #[test]
    fn test_ingest_default_id_is_deterministic() {
        let (t1, _) = ingest_tree("(A,B);", "same", None, None, OffsetDateTime::UNIX_EPOCH).unwrap();
        let (t2, _) = ingest_tree("(A,B);", "same", None, None, OffsetDateTime::UNIX_EPOCH).unwrap();
        assert_eq!(t1.id, t2.id);
    }

    #[test]
    fn test_ingest_parse_error_propagates() {
        let result = ingest_tree("(A,B", "bad", None, None, OffsetDateTime::UNIX_EPOCH);
        assert!(result.is_err());
    }
}
