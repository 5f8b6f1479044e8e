use super::error::TreeError;
use super::fingerprint::topology_signature;
use super::tree::Tree;

/// Per-tree metrics extracted for the explanation engine (spec.md §4.D).
#[derive(Debug, Clone)]
pub struct TreeMetrics {
    pub n_leaves: usize,
    pub n_internal: usize,
    pub max_depth: usize,
    pub min_depth: usize,
    pub avg_depth: f64,
    pub depth_variance: f64,
    pub balances: Vec<f64>,
    pub mean_balance: f64,
    pub branch_mean: f64,
    pub branch_total: f64,
    pub topology_signature: String,
    pub leaf_depths_sorted: Vec<usize>,
}

/// One weighted category score in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct FeatureScore {
    pub category: &'static str,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonKind {
    Summary,
    Match,
    Similar,
    Different,
}

#[derive(Debug, Clone)]
pub struct Reason {
    pub kind: ReasonKind,
    pub category: &'static str,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct Explanation {
    /// Overall weighted score in `[0, 1]` (spec.md §4.D). The CLI boundary
    /// scales this to `[0, 100]` per spec.md §6's `explain_similarity` response.
    pub overall: f64,
    pub feature_breakdown: Vec<FeatureScore>,
    pub query_metrics: TreeMetrics,
    pub result_metrics: TreeMetrics,
    pub reasons: Vec<Reason>,
}

const WEIGHT_SIZE: f64 = 0.2;
const WEIGHT_DEPTH: f64 = 0.2;
const WEIGHT_BALANCE: f64 = 0.2;
const WEIGHT_TOPOLOGY: f64 = 0.3;
const WEIGHT_BRANCHES: f64 = 0.1;

/// Extract the metrics spec.md §4.D lists from a parsed tree.
pub fn extract_metrics(tree: &Tree) -> Result<TreeMetrics, TreeError> {
    let root = tree
        .get_root()
        .ok_or_else(|| TreeError::InvalidArgument("tree has no root".to_string()))?;
    let order = tree.preorder(&root)?;

    let mut depths = std::collections::HashMap::new();
    let mut stack = vec![(root, 0usize)];
    while let Some((id, d)) = stack.pop() {
        depths.insert(id, d);
        if let Some(node) = tree.get_node(id) {
            for &child in &node.children {
                stack.push((child, d + 1));
            }
        }
    }

    let mut leaf_counts = std::collections::HashMap::new();
    for &id in order.iter().rev() {
        let node = tree.get_node(id).unwrap();
        let count = if node.is_leaf() {
            1
        } else {
            node.children.iter().map(|c| leaf_counts[c]).sum()
        };
        leaf_counts.insert(id, count);
    }

    let leaf_depths: Vec<usize> = order
        .iter()
        .filter(|&&id| tree.get_node(id).unwrap().is_leaf())
        .map(|&id| depths[&id])
        .collect();
    let n_leaves = leaf_depths.len();
    let n_internal = order.len() - n_leaves;

    let max_depth = leaf_depths.iter().copied().max().unwrap_or(0);
    let min_depth = leaf_depths.iter().copied().min().unwrap_or(0);
    let avg_depth = if n_leaves > 0 {
        leaf_depths.iter().sum::<usize>() as f64 / n_leaves as f64
    } else {
        0.0
    };
    let depth_variance = (max_depth.saturating_sub(min_depth)) as f64;

    let mut balances = Vec::new();
    for &id in &order {
        let node = tree.get_node(id).unwrap();
        if node.children.len() < 2 {
            continue;
        }
        let sizes: Vec<usize> = node.children.iter().map(|c| leaf_counts[c]).collect();
        let min_c = *sizes.iter().min().unwrap() as f64;
        let max_c = *sizes.iter().max().unwrap() as f64;
        if max_c > 0.0 {
            balances.push(min_c / max_c);
        }
    }
    let mean_balance = if balances.is_empty() {
        1.0
    } else {
        balances.iter().sum::<f64>() / balances.len() as f64
    };

    let lengths: Vec<f64> = order
        .iter()
        .filter_map(|&id| tree.get_node(id).and_then(|n| n.length))
        .filter(|&l| l > 0.0)
        .collect();
    let branch_total: f64 = lengths.iter().sum();
    let branch_mean = if lengths.is_empty() {
        0.0
    } else {
        branch_total / lengths.len() as f64
    };

    let mut leaf_depths_sorted = leaf_depths;
    leaf_depths_sorted.sort_unstable();

    Ok(TreeMetrics {
        n_leaves,
        n_internal,
        max_depth,
        min_depth,
        avg_depth,
        depth_variance,
        balances,
        mean_balance,
        branch_mean,
        branch_total,
        topology_signature: topology_signature(tree, root),
        leaf_depths_sorted,
    })
}

fn ratio_score(a: f64, b: f64) -> f64 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if hi == 0.0 {
        1.0
    } else {
        lo / hi
    }
}

fn delta_score(a: f64, b: f64) -> f64 {
    let denom = a.max(b);
    if denom == 0.0 {
        1.0
    } else {
        1.0 - (a - b).abs() / denom
    }
}

fn score_size(q: &TreeMetrics, r: &TreeMetrics) -> f64 {
    let leaves = ratio_score(q.n_leaves as f64, r.n_leaves as f64);
    let internal = ratio_score(q.n_internal as f64, r.n_internal as f64);
    (leaves + internal) / 2.0
}

fn score_depth(q: &TreeMetrics, r: &TreeMetrics) -> f64 {
    let t1 = delta_score(q.max_depth as f64, r.max_depth as f64);
    let t2 = delta_score(q.avg_depth, r.avg_depth);
    let t3 = delta_score(q.depth_variance, r.depth_variance);
    (t1 + t2 + t3) / 3.0
}

fn score_balance(q: &TreeMetrics, r: &TreeMetrics) -> f64 {
    (1.0 - (q.mean_balance - r.mean_balance).abs()).max(0.0)
}

fn score_topology(q: &TreeMetrics, r: &TreeMetrics) -> f64 {
    if q.topology_signature == r.topology_signature {
        return 1.0;
    }
    let l = q.leaf_depths_sorted.len().max(r.leaf_depths_sorted.len());
    if l == 0 {
        return 1.0;
    }
    let pad = |v: &[usize]| -> Vec<f64> {
        let mut out: Vec<f64> = v.iter().map(|&x| x as f64).collect();
        out.resize(l, 0.0);
        out
    };
    let dq = pad(&q.leaf_depths_sorted);
    let dr = pad(&r.leaf_depths_sorted);
    let diff: f64 = dq.iter().zip(dr.iter()).map(|(a, b)| (a - b).abs()).sum();
    let max_d = q
        .leaf_depths_sorted
        .iter()
        .chain(r.leaf_depths_sorted.iter())
        .copied()
        .max()
        .unwrap_or(0)
        .max(1) as f64;
    (1.0 - diff / (l as f64 * max_d)).max(0.0)
}

fn score_branches(q: &TreeMetrics, r: &TreeMetrics) -> f64 {
    if q.branch_total == 0.0 || r.branch_total == 0.0 {
        return 0.5;
    }
    (1.0 - (q.branch_mean - r.branch_mean).abs() / q.branch_mean.max(r.branch_mean).max(0.001))
        .max(0.0)
}

fn level_word(score: f64) -> &'static str {
    if score >= 0.8 {
        "strong"
    } else if score >= 0.6 {
        "moderate"
    } else if score >= 0.4 {
        "some"
    } else {
        "limited"
    }
}

fn build_reasons(
    overall: f64,
    q: &TreeMetrics,
    r: &TreeMetrics,
    scores: &[FeatureScore],
) -> Vec<Reason> {
    let mut reasons = Vec::new();

    reasons.push(Reason {
        kind: ReasonKind::Summary,
        category: "overall",
        text: format!("{} similarity (score: {:.2})", level_word(overall), overall),
    });

    if q.n_leaves == r.n_leaves {
        reasons.push(Reason {
            kind: ReasonKind::Match,
            category: "size",
            text: format!("identical leaf counts ({})", q.n_leaves),
        });
    }
    if q.topology_signature == r.topology_signature {
        reasons.push(Reason {
            kind: ReasonKind::Match,
            category: "topology",
            text: "identical canonical topology".to_string(),
        });
    }

    for fs in scores {
        if fs.score >= 0.8 {
            reasons.push(Reason {
                kind: ReasonKind::Similar,
                category: fs.category,
                text: format!("{} strongly similar ({:.2})", fs.category, fs.score),
            });
        } else if fs.score >= 0.7 {
            reasons.push(Reason {
                kind: ReasonKind::Similar,
                category: fs.category,
                text: format!("{} moderately similar ({:.2})", fs.category, fs.score),
            });
        } else if fs.score < 0.5 {
            reasons.push(Reason {
                kind: ReasonKind::Different,
                category: fs.category,
                text: format!("{} differs noticeably ({:.2})", fs.category, fs.score),
            });
        }
    }

    reasons
}

/// Parse `query_newick` and `result_newick`, extract metrics for both, and
/// compute the five weighted category scores plus the overall score and
/// human-readable reasons (spec.md §4.D).
pub fn explain_similarity(query_newick: &str, result_newick: &str) -> Result<Explanation, TreeError> {
    let query_tree = Tree::from_newick(query_newick)?;
    let result_tree = Tree::from_newick(result_newick)?;

    let q = extract_metrics(&query_tree)?;
    let r = extract_metrics(&result_tree)?;

    let scores = vec![
        FeatureScore {
            category: "size",
            score: score_size(&q, &r),
        },
        FeatureScore {
            category: "depth",
            score: score_depth(&q, &r),
        },
        FeatureScore {
            category: "balance",
            score: score_balance(&q, &r),
        },
        FeatureScore {
            category: "topology",
            score: score_topology(&q, &r),
        },
        FeatureScore {
            category: "branches",
            score: score_branches(&q, &r),
        },
    ];

    let overall = WEIGHT_SIZE * scores[0].score
        + WEIGHT_DEPTH * scores[1].score
        + WEIGHT_BALANCE * scores[2].score
        + WEIGHT_TOPOLOGY * scores[3].score
        + WEIGHT_BRANCHES * scores[4].score;

    let reasons = build_reasons(overall, &q, &r, &scores);

    Ok(Explanation {
        overall,
        feature_breakdown: scores,
        query_metrics: q,
        result_metrics: r,
        reasons,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explain_identical_trees() {
        let nwk = "((A:0.1,B:0.1):0.3,(C:0.2,D:0.2):0.2);";
        let e = explain_similarity(nwk, nwk).unwrap();
        assert!(e.overall >= 0.95);
        assert!(e
            .reasons
            .iter()
            .any(|r| r.category == "topology" && r.kind == ReasonKind::Match));
    }

    #[test]
    fn test_explain_caterpillar_vs_balanced() {
        // spec.md §8 scenario 3
        let caterpillar = "(((A,B),C),D);";
        let balanced = "((A,B),(C,D));";
        let e = explain_similarity(caterpillar, balanced).unwrap();

        let topology = e
            .feature_breakdown
            .iter()
            .find(|f| f.category == "topology")
            .unwrap();
        let balance = e
            .feature_breakdown
            .iter()
            .find(|f| f.category == "balance")
            .unwrap();
        let size = e
            .feature_breakdown
            .iter()
            .find(|f| f.category == "size")
            .unwrap();

        assert!(topology.score < 0.8);
        assert!(balance.score < 0.7);
        assert_eq!(size.score, 1.0);
    }

    #[test]
    fn test_explain_no_branch_lengths_gives_half_score() {
        let a = "(A,B);";
        let b = "(A,C);";
        let e = explain_similarity(a, b).unwrap();
        let branches = e
            .feature_breakdown
            .iter()
            .find(|f| f.category == "branches")
            .unwrap();
        assert_eq!(branches.score, 0.5);
    }
}
