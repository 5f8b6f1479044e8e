use std::collections::BTreeMap;

/// NodeId is an index into the Tree's node vector.
/// It is lightweight (Copy) and safe (no pointers).
pub type NodeId = usize;

#[derive(Debug, Clone)]
pub struct Node {
    /// Unique identifier for the node (index in the arena)
    pub id: NodeId,

    /// Parent node ID (None for root)
    pub parent: Option<NodeId>,

    /// List of child node IDs, in Newick source order
    pub children: Vec<NodeId>,

    // --- Payload ---
    /// Node name/label (e.g., "human", "internal_1")
    pub name: Option<String>,

    /// Branch length to parent
    /// In rooted trees, edge length is an attribute of the child node.
    pub length: Option<f64>,

    /// Structured properties (e.g., NHX tags like [&&NHX:S=human])
    /// Using BTreeMap ensures deterministic output order.
    pub properties: Option<BTreeMap<String, String>>,
}

impl Node {
    /// Create a new empty node with a specific ID
    ///
    /// # Example
    /// ```
    /// use nwkix::libs::phylo::node::Node;
    /// let node = Node::new(1);
    /// assert_eq!(node.id, 1);
    /// assert!(node.children.is_empty());
    /// assert!(node.name.is_none());
    /// ```
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            parent: None,
            children: Vec::new(),
            name: None,
            length: None,
            properties: None,
        }
    }

    /// Set the name of the node
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Set the name of the node (builder pattern)
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the branch length (builder pattern)
    pub fn with_length(mut self, length: f64) -> Self {
        self.length = Some(length);
        self
    }

    /// Add a property (key-value pair)
    pub fn add_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        if self.properties.is_none() {
            self.properties = Some(BTreeMap::new());
        }
        self.properties
            .as_mut()
            .unwrap()
            .insert(key.into(), value.into());
    }

    /// Get the value of a property by key.
    pub fn get_property(&self, key: &str) -> Option<&String> {
        self.properties.as_ref().and_then(|p| p.get(key))
    }

    /// Check if the node is a leaf (no children)
    ///
    /// # Example
    /// ```
    /// use nwkix::libs::phylo::node::Node;
    /// let mut node = Node::new(1);
    /// assert!(node.is_leaf());
    /// node.children.push(2);
    /// assert!(!node.is_leaf());
    /// ```
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
