use std::fmt;

/// Error kinds produced by the core (parser, graph builder, encoder, corpus,
/// traversal). The CLI layer wraps these in `anyhow::Error` at the boundary;
/// nothing below `src/cmd_nwkix` should use `anyhow`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Malformed Newick input.
    ParseError {
        /// A human-readable message explaining the error
        message: String,
        /// The line number (1-based)
        line: usize,
        /// The column number (1-based)
        column: usize,
        /// The snippet of input where the error occurred
        snippet: String,
    },
    /// A referenced `tree_id` or `node_id` is absent from the corpus.
    NotFound(String),
    /// The caller supplied an argument the operation cannot act on
    /// (e.g. neither `newick` nor a known tree id; a negative limit).
    InvalidArgument(String),
    /// An invariant was violated (e.g. an orphaned node found mid-traversal).
    /// Recovery is manual; the core never retries.
    Internal(String),
    /// Logical error in low-level arena operations (cycle, bad parent/child).
    LogicError(String),
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::ParseError {
                message,
                line,
                column,
                snippet,
            } => {
                write!(
                    f,
                    "Parse error at line {}, column {}:\n{}\nSnippet: \"{}\"",
                    line, column, message, snippet
                )
            }
            TreeError::NotFound(msg) => write!(f, "Not found: {}", msg),
            TreeError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            TreeError::Internal(msg) => write!(f, "Internal error: {}", msg),
            TreeError::LogicError(msg) => write!(f, "Tree logic error: {}", msg),
        }
    }
}

impl std::error::Error for TreeError {}
