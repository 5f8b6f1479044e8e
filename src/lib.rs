//! `nwkix` — a phylogenetic tree similarity index.
//!
//! Parses Newick trees, builds a node graph with stable identifiers, encodes
//! each tree into a 256-dimensional fingerprint, and answers structural
//! similarity, subtree, and explanation queries against an in-memory corpus.
//! See `src/cmd_nwkix` for the CLI that wraps this library.

pub mod libs;
