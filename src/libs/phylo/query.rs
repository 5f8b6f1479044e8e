use super::error::TreeError;
use super::graph::PersistedNode;
use std::collections::{HashMap, HashSet, VecDeque};

/// A `node_id -> Node` map built once per request by scanning
/// `Corpus::nodes_of(tree_id)` (spec.md §4.F). All traversal ops below
/// operate purely against this map, so they never touch the corpus lock
/// directly — the caller materialises it once and reuses it across calls.
pub type NodeMap = HashMap<String, PersistedNode>;

pub fn build_node_map(nodes: &[PersistedNode]) -> NodeMap {
    nodes.iter().map(|n| (n.id.clone(), n.clone())).collect()
}

#[derive(Debug, Clone)]
pub struct AncestorsResult {
    pub node_id: String,
    pub ancestors: Vec<PersistedNode>,
    pub path_length: usize,
}

/// Walk `parent_id` links from `node_id`'s parent up to the root. A missing
/// `node_id` is not an error (spec.md §4.F): it yields an empty list with
/// `path_length = 0`. `max_depth` truncates the returned list from the
/// near-node end (keeps the closest ancestors, drops the far/root end).
pub fn ancestors(nodes: &NodeMap, node_id: &str, max_depth: Option<usize>) -> AncestorsResult {
    let mut chain = Vec::new();
    if let Some(start) = nodes.get(node_id) {
        let mut cursor = start.parent_id.clone();
        while let Some(pid) = cursor {
            match nodes.get(&pid) {
                Some(p) => {
                    chain.push(p.clone());
                    cursor = p.parent_id.clone();
                }
                None => break,
            }
        }
    }
    if let Some(max) = max_depth {
        chain.truncate(max);
    }
    AncestorsResult {
        node_id: node_id.to_string(),
        path_length: chain.len(),
        ancestors: chain,
    }
}

#[derive(Debug, Clone)]
pub struct DescendantsResult {
    pub node_id: String,
    pub descendants: Vec<PersistedNode>,
    pub total_count: usize,
}

/// BFS from `node_id`, not including itself. `max_depth` is a relative bound
/// in edges; `leaves_only` filters the result (but traversal still descends
/// through internal nodes to reach deeper leaves). A visited set guards
/// against cycles defensively, though a well-formed tree has none.
pub fn descendants(
    nodes: &NodeMap,
    node_id: &str,
    max_depth: Option<usize>,
    leaves_only: bool,
) -> DescendantsResult {
    let mut result = Vec::new();
    if let Some(start) = nodes.get(node_id) {
        let mut visited = HashSet::new();
        visited.insert(start.id.clone());
        let mut queue: VecDeque<(String, usize)> =
            start.child_ids.iter().map(|c| (c.clone(), 1)).collect();

        while let Some((id, depth)) = queue.pop_front() {
            if visited.contains(&id) {
                continue;
            }
            visited.insert(id.clone());
            let Some(node) = nodes.get(&id) else { continue };

            if max_depth.is_some_and(|m| depth > m) {
                continue;
            }
            if !leaves_only || node.is_leaf {
                result.push(node.clone());
            }
            if !max_depth.is_some_and(|m| depth >= m) {
                for c in &node.child_ids {
                    queue.push_back((c.clone(), depth + 1));
                }
            }
        }
    }
    DescendantsResult {
        node_id: node_id.to_string(),
        total_count: result.len(),
        descendants: result,
    }
}

/// Lowest common ancestor of `a` and `b` (spec.md §4.F): ancestor set of `a`
/// (including `a`), then walk `b`'s ancestors (including `b`) for the first
/// intersection. `None` if either node is absent.
pub fn lca(nodes: &NodeMap, a: &str, b: &str) -> Option<PersistedNode> {
    nodes.get(a)?;
    nodes.get(b)?;

    let mut a_ancestors: HashSet<String> = HashSet::new();
    a_ancestors.insert(a.to_string());
    let mut cursor = nodes.get(a).unwrap().parent_id.clone();
    while let Some(pid) = cursor {
        a_ancestors.insert(pid.clone());
        cursor = nodes.get(&pid).and_then(|n| n.parent_id.clone());
    }

    let mut walker = Some(b.to_string());
    while let Some(id) = walker {
        if a_ancestors.contains(&id) {
            return nodes.get(&id).cloned();
        }
        walker = nodes.get(&id).and_then(|n| n.parent_id.clone());
    }
    None
}

#[derive(Debug, Clone)]
pub struct SubtreeNewick {
    pub newick: String,
    pub node_ids: Vec<String>,
}

/// Remove Newick's structural delimiters from a label and fold spaces into
/// underscores (spec.md §4.F).
fn sanitize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !"(),:;".contains(*c))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

/// Post-order build of the subtree rooted at `node_id` as a Newick string
/// (spec.md §4.F). Leaves render as `label[:bl]`; internal nodes as
/// `(c1,c2,...)label[:bl]`. The terminating `;` is appended once, at the top.
pub fn subtree_to_newick(
    nodes: &NodeMap,
    node_id: &str,
    include_branch_lengths: bool,
) -> Result<SubtreeNewick, TreeError> {
    let start = nodes
        .get(node_id)
        .ok_or_else(|| TreeError::NotFound(format!("node '{}'", node_id)))?;
    let mut node_ids = Vec::new();
    let body = build_newick_recursive(nodes, start, include_branch_lengths, &mut node_ids)?;
    Ok(SubtreeNewick {
        newick: format!("{};", body),
        node_ids,
    })
}

fn build_newick_recursive(
    nodes: &NodeMap,
    node: &PersistedNode,
    include_bl: bool,
    acc: &mut Vec<String>,
) -> Result<String, TreeError> {
    acc.push(node.id.clone());
    let bl_suffix = |bl: f64| -> String {
        if include_bl && bl > 0.0 {
            format!(":{}", bl)
        } else {
            String::new()
        }
    };
    let label = node.label.as_deref().map(sanitize_label).unwrap_or_default();

    if node.is_leaf {
        Ok(format!("{}{}", label, bl_suffix(node.branch_length)))
    } else {
        let mut parts = Vec::with_capacity(node.child_ids.len());
        for cid in &node.child_ids {
            let child = nodes
                .get(cid)
                .ok_or_else(|| TreeError::Internal(format!("child '{}' missing from node map", cid)))?;
            parts.push(build_newick_recursive(nodes, child, include_bl, acc)?);
        }
        Ok(format!(
            "({}){}{}",
            parts.join(","),
            label,
            bl_suffix(node.branch_length)
        ))
    }
}

#[derive(Debug, Clone)]
pub struct RelatedLeaf {
    pub node_id: String,
    pub label: Option<String>,
    pub edge_distance: usize,
    pub branch_distance: f64,
}

/// Undirected BFS over parent/child edges from `node_id`, collecting every
/// reached leaf within `max_distance` edges, excluding the start itself
/// (spec.md §4.F / SPEC_FULL.md §11 supplement #2). The accumulated branch
/// length is the sum of edge lengths crossed along the BFS path — equal to
/// the sum of the two root-ward walks from the start and the found leaf to
/// their connecting point, per `tree_search.py::find_related_sequences`'s own
/// note that this is an approximation of true weighted distance, not exact.
/// Sorted by `(edge_distance asc, branch_distance asc)`.
pub fn related_leaves(nodes: &NodeMap, node_id: &str, max_distance: usize) -> Vec<RelatedLeaf> {
    let mut result = Vec::new();
    if nodes.get(node_id).is_none() {
        return result;
    }

    let mut visited = HashSet::new();
    visited.insert(node_id.to_string());
    let mut queue: VecDeque<(String, usize, f64)> = VecDeque::new();
    queue.push_back((node_id.to_string(), 0, 0.0));

    while let Some((id, dist, blen)) = queue.pop_front() {
        if dist > 0 {
            if let Some(n) = nodes.get(&id) {
                if n.is_leaf {
                    result.push(RelatedLeaf {
                        node_id: id.clone(),
                        label: n.label.clone(),
                        edge_distance: dist,
                        branch_distance: blen,
                    });
                }
            }
        }
        if dist >= max_distance {
            continue;
        }
        let Some(n) = nodes.get(&id) else { continue };

        for c in &n.child_ids {
            if visited.insert(c.clone()) {
                if let Some(cn) = nodes.get(c) {
                    queue.push_back((c.clone(), dist + 1, blen + cn.branch_length));
                }
            }
        }
        if let Some(pid) = &n.parent_id {
            if visited.insert(pid.clone()) {
                queue.push_back((pid.clone(), dist + 1, blen + n.branch_length));
            }
        }
    }

    result.sort_by(|a, b| {
        a.edge_distance
            .cmp(&b.edge_distance)
            .then(a.branch_distance.partial_cmp(&b.branch_distance).unwrap())
    });
    result
}

/// Downward-only BFS collecting every node id in the subtree rooted at
/// `node_id`, including itself.
pub fn subtree_node_ids(nodes: &NodeMap, node_id: &str) -> Vec<String> {
    let mut result = Vec::new();
    if nodes.get(node_id).is_none() {
        return result;
    }
    let mut visited = HashSet::new();
    visited.insert(node_id.to_string());
    let mut queue = VecDeque::new();
    queue.push_back(node_id.to_string());

    while let Some(id) = queue.pop_front() {
        result.push(id.clone());
        if let Some(n) = nodes.get(&id) {
            for c in &n.child_ids {
                if visited.insert(c.clone()) {
                    queue.push_back(c.clone());
                }
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::phylo::graph::build_graph;
    use crate::libs::phylo::tree::Tree;

    fn map_for(newick: &str) -> (NodeMap, String) {
        let tree = Tree::from_newick(newick).unwrap();
        let summary = build_graph(&tree, "t").unwrap();
        let root_id = summary.nodes[0].id.clone();
        (build_node_map(&summary.nodes), root_id)
    }

    #[test]
    fn test_ancestors_and_lca() {
        let (nodes, root_id) = map_for("((A:0.1,B:0.1):0.3,(C:0.2,D:0.2):0.2);");
        let a_id = nodes
            .values()
            .find(|n| n.label.as_deref() == Some("A"))
            .unwrap()
            .id
            .clone();
        let c_id = nodes
            .values()
            .find(|n| n.label.as_deref() == Some("C"))
            .unwrap()
            .id
            .clone();

        let anc = ancestors(&nodes, &a_id, None);
        assert_eq!(anc.path_length, 2); // internal parent, root

        let common = lca(&nodes, &a_id, &c_id).unwrap();
        assert_eq!(common.id, root_id);

        assert_eq!(lca(&nodes, &a_id, &a_id).unwrap().id, a_id);
    }

    #[test]
    fn test_ancestors_missing_node_is_empty_not_error() {
        let (nodes, _) = map_for("(A,B);");
        let result = ancestors(&nodes, "does-not-exist", None);
        assert_eq!(result.path_length, 0);
        assert!(result.ancestors.is_empty());
    }

    #[test]
    fn test_descendants_leaves_only() {
        let (nodes, root_id) = map_for("((A,B),(C,D));");
        let result = descendants(&nodes, &root_id, None, true);
        assert_eq!(result.total_count, 4);
        assert!(result.descendants.iter().all(|n| n.is_leaf));
    }

    #[test]
    fn test_subtree_to_newick() {
        let (nodes, _) = map_for("((A,B),C);");
        let ab = nodes
            .values()
            .find(|n| n.child_ids.len() == 2 && n.parent_id.is_some())
            .unwrap();
        let result = subtree_to_newick(&nodes, &ab.id, false).unwrap();
        assert_eq!(result.newick, "(A,B);");
        assert_eq!(result.node_ids.len(), 3);
    }

    #[test]
    fn test_subtree_node_ids_downward_only() {
        let (nodes, root_id) = map_for("((A,B),C);");
        let ids = subtree_node_ids(&nodes, &root_id);
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_related_leaves_excludes_start() {
        let (nodes, root_id) = map_for("((A,B),(C,D));");
        let related = related_leaves(&nodes, &root_id, 10);
        assert_eq!(related.len(), 4);
        assert!(related.iter().all(|r| r.node_id != root_id));
        // sorted by edge distance ascending
        assert!(related.windows(2).all(|w| w[0].edge_distance <= w[1].edge_distance));
    }
}
