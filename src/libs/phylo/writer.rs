use super::node::NodeId;
use super::tree::Tree;

/// Serialize the tree to a Newick string (compact format).
///
/// # Example
/// ```
/// use nwkix::libs::phylo::tree::Tree;
/// use nwkix::libs::phylo::writer;
/// let mut tree = Tree::new();
/// let root = tree.add_node();
/// tree.set_root(root);
/// tree.get_node_mut(root).unwrap().set_name("A");
/// assert_eq!(writer::write_newick(&tree), "A;");
/// ```
pub fn write_newick(tree: &Tree) -> String {
    write_newick_with_format(tree, "")
}

/// Serialize the tree to a Newick string with optional indentation.
/// An empty `indent` produces compact (single-line) output.
pub fn write_newick_with_format(tree: &Tree, indent: &str) -> String {
    if let Some(root) = tree.get_root() {
        let mut s = to_newick_recursive(tree, root, indent, 0);
        s.push(';');
        s
    } else {
        ";".to_string()
    }
}

fn to_newick_recursive(tree: &Tree, node_id: NodeId, indent: &str, depth: usize) -> String {
    let node = tree.get_node(node_id).unwrap();
    let is_pretty = !indent.is_empty();

    let my_indent = if is_pretty {
        indent.repeat(depth)
    } else {
        String::new()
    };

    let mut node_info = String::new();

    if let Some(name) = &node.name {
        node_info.push_str(&quote_label(name));
    }

    if let Some(len) = node.length {
        node_info.push_str(&format!(":{}", len));
    }

    if let Some(props) = &node.properties {
        if !props.is_empty() {
            node_info.push_str("[&&NHX");
            for (k, v) in props {
                node_info.push_str(&format!(":{}={}", k, v));
            }
            node_info.push(']');
        }
    }

    if node.children.is_empty() {
        format!("{}{}", my_indent, node_info)
    } else {
        let children_strs: Vec<String> = node
            .children
            .iter()
            .map(|&child| to_newick_recursive(tree, child, indent, depth + 1))
            .collect();

        if is_pretty {
            format!(
                "{}(\n{}\n{}){}",
                my_indent,
                children_strs.join(",\n"),
                my_indent,
                node_info
            )
        } else {
            format!("({}){}", children_strs.join(","), node_info)
        }
    }
}

/// Serialize the tree to a Graphviz DOT string, for visual debugging.
pub fn write_dot(tree: &Tree) -> String {
    let mut s = String::from("digraph Tree {\n");
    s.push_str("    node [shape=box];\n");

    if let Some(root) = tree.get_root() {
        if let Ok(nodes) = tree.preorder(&root) {
            for &node_id in &nodes {
                let node = tree.get_node(node_id).unwrap();

                let label = node.name.as_deref().unwrap_or("");
                let label_attr = if label.is_empty() {
                    format!("label=\"{}\"", node_id)
                } else {
                    format!("label=\"{}\"", label)
                };
                s.push_str(&format!("    {} [{}];\n", node_id, label_attr));

                for &child_id in &node.children {
                    let child = tree.get_node(child_id).unwrap();
                    let edge_attr_str = match child.length {
                        Some(len) => format!(" [label=\"{}\"]", len),
                        None => String::new(),
                    };
                    s.push_str(&format!("    {} -> {}{};\n", node_id, child_id, edge_attr_str));
                }
            }
        }
    }

    s.push_str("}\n");
    s
}

fn quote_label(label: &str) -> String {
    let needs_quote = label.chars().any(|c| "(),:;[] \t\n".contains(c));
    if needs_quote {
        format!("'{}'", label)
    } else {
        label.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_newick() {
        let mut tree = Tree::new();
        let n0 = tree.add_node();
        let n1 = tree.add_node();
        let n2 = tree.add_node();

        tree.set_root(n0);
        tree.add_child(n0, n1).unwrap();
        tree.add_child(n0, n2).unwrap();

        tree.get_node_mut(n0).unwrap().set_name("Root");
        tree.get_node_mut(n1).unwrap().set_name("A");
        tree.get_node_mut(n1).unwrap().length = Some(0.1);
        tree.get_node_mut(n2).unwrap().set_name("B");
        tree.get_node_mut(n2).unwrap().length = Some(0.2);

        assert_eq!(write_newick(&tree), "(A:0.1,B:0.2)Root;");

        let expected_pretty = "(\n  A:0.1,\n  B:0.2\n)Root;";
        assert_eq!(write_newick_with_format(&tree, "  "), expected_pretty);
    }

    #[test]
    fn test_to_newick_special_chars() {
        let mut tree = Tree::new();
        let n0 = tree.add_node();
        tree.set_root(n0);
        tree.get_node_mut(n0).unwrap().set_name("Homo sapiens");

        assert_eq!(write_newick(&tree), "'Homo sapiens';");
    }

    #[test]
    fn test_to_dot() {
        let mut tree = Tree::new();
        let n0 = tree.add_node();
        let n1 = tree.add_node();

        tree.set_root(n0);
        tree.add_child(n0, n1).unwrap();

        tree.get_node_mut(n0).unwrap().set_name("Root");
        tree.get_node_mut(n1).unwrap().set_name("A");
        tree.get_node_mut(n1).unwrap().length = Some(0.1);

        let dot = write_dot(&tree);
        assert!(dot.contains("digraph Tree {"));
        assert!(dot.contains(&format!("{} -> {} [label=\"0.1\"];", n0, n1)));
    }
}
