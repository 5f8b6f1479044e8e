use super::node::NodeId;
use super::tree::Tree;
use std::collections::HashMap;

/// Dimensionality of the tree-level fingerprint (spec.md §4.C).
pub const FINGERPRINT_DIM: usize = 256;

/// Dimensionality of a per-node position embedding (spec.md §6 schema field
/// `position_embedding?[64]`, filled per `examples/original_source/catalog/tree_embeddings.py`).
pub const POSITION_EMBEDDING_DIM: usize = 64;

/// Branch-length terms are pre-scaled by this factor so they cannot swamp
/// the topology groups after L2-normalisation (spec.md §9: "a tuning knob,
/// not a correctness concern" — kept as a compile-time constant rather than
/// a CLI flag so callers cannot defeat the topology-dominance invariant).
const BRANCH_LENGTH_SCALE: f32 = 0.1;

/// Produce the 256-dimensional fingerprint of `tree` (spec.md §4.C).
///
/// `normalize = true` L2-normalises the result (the default for storage);
/// `false` is used by the explanation engine, which works with raw metrics.
/// Degenerate trees (`n_leaves < 2`) return the all-zero vector.
pub fn compute_fingerprint(tree: &Tree, normalize: bool) -> [f32; FINGERPRINT_DIM] {
    let mut v = [0f32; FINGERPRINT_DIM];

    let root = match tree.get_root() {
        Some(r) => r,
        None => return v,
    };
    let order = match tree.preorder(&root) {
        Ok(o) => o,
        Err(_) => return v,
    };

    let depths = compute_depths(tree, root);
    let leaf_depths: Vec<usize> = order
        .iter()
        .filter(|&&id| tree.get_node(id).map(|n| n.is_leaf()).unwrap_or(false))
        .map(|&id| depths[&id])
        .collect();

    let n_leaves = leaf_depths.len();
    if n_leaves < 2 {
        return v; // spec.md §4.C: degenerate input skips normalisation entirely
    }
    let n_total = order.len();
    let n_internal = n_total - n_leaves;

    let max_depth = *leaf_depths.iter().max().unwrap_or(&0);
    let mean_depth = leaf_depths.iter().sum::<usize>() as f64 / n_leaves as f64;

    // Group 0: basic stats
    v[0] = n_leaves as f32 / 100.0;
    v[1] = n_internal as f32 / 100.0;
    v[2] = n_total as f32 / 100.0;
    v[3] = max_depth as f32 / 20.0;
    v[4] = mean_depth as f32 / 20.0;

    // Group 1: leaf-depth histogram
    let max_d = max_depth.max(1) as f64;
    for &d in &leaf_depths {
        let idx = ((d as f64 / max_d) * 31.0).floor().clamp(0.0, 31.0) as usize;
        v[32 + idx] += 1.0 / n_leaves as f32;
    }

    // Leaf counts per subtree, needed by groups 2 and 3.
    let leaf_counts = compute_leaf_counts(tree, &order);

    // Group 2: subtree sizes (internal nodes only), ascending, first 32
    let mut internal_sizes: Vec<usize> = order
        .iter()
        .filter(|&&id| !tree.get_node(id).unwrap().is_leaf())
        .map(|&id| leaf_counts[&id])
        .collect();
    internal_sizes.sort_unstable();
    for (i, &size) in internal_sizes.iter().take(32).enumerate() {
        v[64 + i] = size as f32 / n_leaves.max(1) as f32;
    }

    // Group 3: split patterns, sorted (min, max) pairs for child-order invariance
    // (spec.md §9 open question: sorted pairs are required, not raw source order).
    let mut written = 0usize;
    for &id in &order {
        if written >= 32 {
            break;
        }
        let node = tree.get_node(id).unwrap();
        if node.children.len() < 2 {
            continue; // leaf or unary internal node: no split to report
        }
        let l = leaf_counts[&node.children[0]];
        let r: usize = node.children[1..].iter().map(|c| leaf_counts[c]).sum();
        let total = (l + r).max(1);
        let (lo, hi) = if l <= r { (l, r) } else { (r, l) };
        v[96 + 2 * written] = lo as f32 / total as f32;
        v[96 + 2 * written + 1] = hi as f32 / total as f32;
        written += 1;
    }

    // Group 4: topology hash
    let signature = topology_signature(tree, root);
    let h = fxhash::hash64(&signature);
    for i in 0..64 {
        v[160 + i] = (((h >> i) & 1) as f32) * 0.5;
    }

    // Group 5: branch lengths (over non-zero lengths only)
    let lengths: Vec<f64> = order
        .iter()
        .filter_map(|&id| tree.get_node(id).and_then(|n| n.length))
        .filter(|&l| l > 0.0)
        .collect();
    if !lengths.is_empty() {
        let mean = lengths.iter().sum::<f64>() / lengths.len() as f64;
        let variance =
            lengths.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / lengths.len() as f64;
        let stddev = variance.sqrt();
        let max = lengths.iter().cloned().fold(f64::MIN, f64::max);
        let min = lengths.iter().cloned().fold(f64::MAX, f64::min);
        v[224] = BRANCH_LENGTH_SCALE * mean as f32;
        v[225] = BRANCH_LENGTH_SCALE * stddev as f32;
        v[226] = BRANCH_LENGTH_SCALE * max as f32;
        v[227] = BRANCH_LENGTH_SCALE * min as f32;
    }

    if normalize {
        l2_normalize(&mut v);
    }

    v
}

/// L2 norm of a fingerprint; exposed so callers can assert `‖v‖₂ ∈ {0, 1}`
/// without duplicating the reduction.
pub fn l2_norm(v: &[f32; FINGERPRINT_DIM]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

fn l2_normalize(v: &mut [f32; FINGERPRINT_DIM]) {
    let norm = l2_norm(v);
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Canonical topology signature (GLOSSARY): `"L"` for a leaf, otherwise
/// `"(" + sorted(child signatures).join(",") + ")"`. Isomorphism-invariant
/// under child reordering by construction.
pub fn topology_signature(tree: &Tree, id: NodeId) -> String {
    let node = tree.get_node(id).unwrap();
    if node.is_leaf() {
        "L".to_string()
    } else {
        let mut child_sigs: Vec<String> = node
            .children
            .iter()
            .map(|&c| topology_signature(tree, c))
            .collect();
        child_sigs.sort();
        format!("({})", child_sigs.join(","))
    }
}

fn compute_depths(tree: &Tree, root: NodeId) -> HashMap<NodeId, usize> {
    let mut depths = HashMap::new();
    let mut stack = vec![(root, 0usize)];
    while let Some((id, d)) = stack.pop() {
        depths.insert(id, d);
        if let Some(node) = tree.get_node(id) {
            for &child in &node.children {
                stack.push((child, d + 1));
            }
        }
    }
    depths
}

fn compute_leaf_counts(tree: &Tree, preorder: &[NodeId]) -> HashMap<NodeId, usize> {
    let mut counts = HashMap::new();
    for &id in preorder.iter().rev() {
        let node = tree.get_node(id).unwrap();
        let count = if node.is_leaf() {
            1
        } else {
            node.children.iter().map(|c| counts[c]).sum()
        };
        counts.insert(id, count);
    }
    counts
}

/// Per-node position embeddings (64-dim), grounded on
/// `catalog/tree_embeddings.py::compute_position_embedding`: a 16-dim
/// sinusoidal encoding of depth, a 32-dim encoding of the root-to-node
/// left/right path, and a 16-dim sinusoidal encoding of the accumulated
/// branch length from root — each L2-normalised as a whole 64-vector.
pub fn compute_position_embeddings(
    tree: &Tree,
) -> HashMap<NodeId, [f32; POSITION_EMBEDDING_DIM]> {
    let mut out = HashMap::new();
    if let Some(root) = tree.get_root() {
        embed_recursive(tree, root, &[], 0.0, &mut out);
    }
    out
}

fn embed_recursive(
    tree: &Tree,
    id: NodeId,
    path: &[bool],
    accum_length: f64,
    out: &mut HashMap<NodeId, [f32; POSITION_EMBEDDING_DIM]>,
) {
    let mut emb = [0f32; POSITION_EMBEDDING_DIM];

    sinusoidal_encode(path.len() as f64, &mut emb[0..16]);

    for (i, &went_right) in path.iter().enumerate().take(32) {
        let weight = 1.0 / (i as f32 + 1.0); // nearer to root weighted higher
        emb[16 + i] = if went_right { weight } else { -weight };
    }

    sinusoidal_encode(accum_length, &mut emb[48..64]);

    let norm = emb.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in emb.iter_mut() {
            *x /= norm;
        }
    }
    out.insert(id, emb);

    if let Some(node) = tree.get_node(id) {
        for (child_index, &child) in node.children.iter().enumerate() {
            let mut child_path = path.to_vec();
            // 0 = reached via the first (left) child, 1 = any later (right) child.
            child_path.push(child_index >= 1);
            let child_length = tree.get_node(child).and_then(|n| n.length).unwrap_or(0.0);
            embed_recursive(tree, child, &child_path, accum_length + child_length, out);
        }
    }
}

/// Transformer-style sinusoidal encoding of a scalar into `out` (even indices
/// get `sin`, odd indices get `cos`, at geometrically spaced frequencies).
fn sinusoidal_encode(value: f64, out: &mut [f32]) {
    let dim = out.len();
    let half = dim / 2;
    for i in 0..half {
        let freq = 1.0 / 10000f64.powf((2 * i) as f64 / dim as f64);
        let angle = value * freq;
        out[2 * i] = angle.sin() as f32;
        if 2 * i + 1 < dim {
            out[2 * i + 1] = angle.cos() as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_single_leaf() {
        let tree = Tree::from_newick("A;").unwrap();
        let v = compute_fingerprint(&tree, true);
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_fingerprint_length_and_norm() {
        let tree = Tree::from_newick("((A:0.1,B:0.1):0.3,(C:0.2,D:0.2):0.2);").unwrap();
        let v = compute_fingerprint(&tree, true);
        assert_eq!(v.len(), 256);
        assert!((l2_norm(&v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_self_similarity() {
        let tree = Tree::from_newick("(((A,B),C),D);").unwrap();
        let v1 = compute_fingerprint(&tree, true);
        let v2 = compute_fingerprint(&tree, true);
        let dot: f32 = v1.iter().zip(v2.iter()).map(|(a, b)| a * b).sum();
        assert!(dot >= 0.999);
    }

    #[test]
    fn test_child_order_invariance() {
        let t1 = Tree::from_newick("(A,B);").unwrap();
        let t2 = Tree::from_newick("(B,A);").unwrap();
        let v1 = compute_fingerprint(&t1, true);
        let v2 = compute_fingerprint(&t2, true);
        assert_eq!(v1, v2);
    }

    #[test]
    fn test_child_order_invariance_nested() {
        let t1 = Tree::from_newick("((A,B),(C,D));").unwrap();
        let t2 = Tree::from_newick("((D,C),(B,A));").unwrap();
        let v1 = compute_fingerprint(&t1, true);
        let v2 = compute_fingerprint(&t2, true);
        assert_eq!(v1, v2);
    }

    #[test]
    fn test_topology_dominates_branch_length() {
        let t1 = Tree::from_newick("((A:0.1,B:0.1):0.3,(C:0.2,D:0.2):0.2);").unwrap();
        let t2 = Tree::from_newick("((A:0.5,B:0.5):0.3,(C:0.5,D:0.5):0.3);").unwrap();
        let v1 = compute_fingerprint(&t1, true);
        let v2 = compute_fingerprint(&t2, true);
        let dot: f32 = v1.iter().zip(v2.iter()).map(|(a, b)| a * b).sum();
        assert!(dot >= 0.95);
    }

    #[test]
    fn test_position_embeddings_dimension_and_norm() {
        let tree = Tree::from_newick("((A:0.1,B:0.2):0.3,C:0.4);").unwrap();
        let embeddings = compute_position_embeddings(&tree);
        assert_eq!(embeddings.len(), tree.len());
        for emb in embeddings.values() {
            let norm: f32 = emb.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5 || norm == 0.0);
        }
    }
}
