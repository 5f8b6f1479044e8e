//! Shared argument builders and small helpers used by several `cmd_nwkix`
//! subcommands, following the shape of `cmd_pgr::nwk::utils` in the teacher
//! crate (one `utils.rs` per command family, holding only cross-cutting glue).

use clap::Arg;
use std::io::Read;

/// The positional argument every subcommand that needs a corpus takes: a
/// single Newick file, a directory of `.nwk`/`.newick` files, or `-`/`stdin`.
/// See `corpus_io::load_corpus`.
pub fn corpus_arg() -> Arg {
    Arg::new("corpus")
        .required(true)
        .num_args(1)
        .index(1)
        .help("Input Newick file, directory of Newick files, or [stdin]")
}

pub fn outfile_arg() -> Arg {
    Arg::new("outfile")
        .short('o')
        .long("outfile")
        .num_args(1)
        .default_value("stdout")
        .help("Output filename. [stdout] for screen")
}

/// Read a Newick tree supplied either as `--query <path>` (an existing file,
/// or `-`/`stdin`) or as a literal Newick string on the command line —
/// whichever the caller finds more convenient when re-submitting a subtree
/// extracted by `get_subtree_newick` (spec.md §1, item 2).
pub fn read_newick_arg(value: &str) -> anyhow::Result<String> {
    if value == "-" || value == "stdin" || std::path::Path::new(value).is_file() {
        let mut reader = intspan::reader(value);
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Ok(content.trim().to_string())
    } else {
        Ok(value.trim().to_string())
    }
}

/// Resolve a user-supplied node reference against a tree's node map: first as
/// an exact node id (the 16-hex-character key), then, failing that, as an
/// exact label match (first hit in insertion/preorder order). Convenience
/// only — the external API (spec.md §6) addresses nodes by id.
pub fn resolve_node_id<'a>(
    nodes: &'a nwkix::libs::phylo::query::NodeMap,
    reference: &str,
) -> Option<&'a str> {
    if let Some(n) = nodes.get(reference) {
        return Some(n.id.as_str());
    }
    nodes
        .values()
        .find(|n| n.label.as_deref() == Some(reference))
        .map(|n| n.id.as_str())
}
