//! Shared helper for building a fresh, ephemeral `Corpus` from the command
//! line (SPEC_FULL.md §0): the CLI is not a persistence engine, so every
//! subcommand that needs to look a tree up by id loads its corpus anew from
//! a directory of `.nwk`/`.newick` files or a single multi-tree Newick file.

use anyhow::{Context, Result};
use nwkix::libs::phylo::corpus::Corpus;
use nwkix::libs::phylo::ingest::ingest_tree;
use nwkix::libs::phylo::reader;
use std::path::Path;
use time::OffsetDateTime;

/// Load every tree reachable from `path` into a fresh `Corpus`.
///
/// * A directory: every `*.nwk`/`*.newick` file, sorted by name. A file
///   holding a single tree names it after its stem; a file holding several
///   names them `<stem>#<index>`.
/// * A file (or `-`/`stdin`): same single-vs-multi naming rule.
pub fn load_corpus(path: &str) -> Result<Corpus> {
    let corpus = Corpus::new();
    let p = Path::new(path);

    if path != "-" && path != "stdin" && p.is_dir() {
        let mut entries: Vec<_> = std::fs::read_dir(p)
            .with_context(|| format!("reading directory '{}'", path))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                matches!(
                    p.extension().and_then(|e| e.to_str()),
                    Some("nwk") | Some("newick") | Some("nw")
                )
            })
            .collect();
        entries.sort();

        for entry in entries {
            let stem = entry
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("tree")
                .to_string();
            ingest_file(&corpus, entry.to_str().unwrap(), &stem)?;
        }
    } else {
        let stem = if path == "-" || path == "stdin" {
            "stdin".to_string()
        } else {
            p.file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("tree")
                .to_string()
        };
        ingest_file(&corpus, path, &stem)?;
    }

    Ok(corpus)
}

/// The file stem used as a default tree/node name when the caller doesn't
/// supply one explicitly (e.g. `nwkix ingest`).
pub fn stem_of(path: &str) -> String {
    if path == "-" || path == "stdin" {
        return "stdin".to_string();
    }
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("tree")
        .to_string()
}

fn ingest_file(corpus: &Corpus, path: &str, stem: &str) -> Result<()> {
    let trees = reader::from_file_spans(path).map_err(|e| anyhow::anyhow!(e))?;
    let multi = trees.len() > 1;
    for (i, (_tree, newick)) in trees.iter().enumerate() {
        // The file (or file#index) stem IS the tree id here: spec.md §3 leaves
        // the id "chosen by caller", and for a CLI that loads trees from named
        // files, the filename is the natural caller-chosen identifier.
        let name = if multi {
            format!("{}#{}", stem, i)
        } else {
            stem.to_string()
        };
        let (persisted, nodes) = ingest_tree(
            newick,
            &name,
            Some(name.clone()),
            None,
            OffsetDateTime::now_utc(),
        )
        .map_err(|e| anyhow::anyhow!(e))?;
        corpus
            .insert(persisted, nodes)
            .map_err(|e| anyhow::anyhow!(e))?;
    }
    Ok(())
}
