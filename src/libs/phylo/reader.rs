use super::error::TreeError;
use super::tree::Tree;
use std::io::Read;

/// Read every semicolon-terminated Newick tree out of a file (or `-`/`stdin`
/// for standard input), exactly as `intspan::reader` is used throughout
/// `cmd_pgr::nwk::*` for file/stdin handling (SPEC_FULL.md §10).
pub fn from_file(infile: &str) -> Result<Vec<Tree>, TreeError> {
    Ok(from_file_spans(infile)?
        .into_iter()
        .map(|(t, _)| t)
        .collect())
}

/// Like `from_file`, pairing each tree with its own verbatim source slice
/// (spec.md §3: "newick ... preserved verbatim").
pub fn from_file_spans(infile: &str) -> Result<Vec<(Tree, String)>, TreeError> {
    let mut reader = intspan::reader(infile);
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .map_err(|e| TreeError::Internal(format!("reading '{}': {}", infile, e)))?;
    Tree::from_newick_multi_spans(content.trim())
}

/// Read a single Newick tree from a file, erroring if the file holds more
/// than one or none at all.
pub fn single_from_file(infile: &str) -> Result<Tree, TreeError> {
    let mut trees = from_file(infile)?;
    match trees.len() {
        0 => Err(TreeError::ParseError {
            message: "no tree found in input".to_string(),
            line: 0,
            column: 0,
            snippet: String::new(),
        }),
        1 => Ok(trees.remove(0)),
        n => Err(TreeError::InvalidArgument(format!(
            "expected a single tree, found {}",
            n
        ))),
    }
}
