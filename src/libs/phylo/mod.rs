pub mod corpus;
pub mod error;
pub mod explain;
pub mod fingerprint;
pub mod graph;
pub mod ingest;
pub mod node;
pub mod parser;
pub mod query;
pub mod reader;
pub mod tree;
pub mod writer;

pub use corpus::{Corpus, PersistedTree, SearchHit, TreeType};
pub use error::TreeError;
pub use graph::{build_graph, GraphSummary, NodeKey, PersistedNode};
pub use node::{Node, NodeId};
pub use tree::Tree;
