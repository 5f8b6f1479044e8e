extern crate clap;
use clap::*;

mod cmd_nwkix;

fn main() -> anyhow::Result<()> {
    let app = Command::new("nwkix")
        .version(crate_version!())
        .author(crate_authors!())
        .about("A phylogenetic tree similarity index")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .subcommand(cmd_nwkix::ingest::make_subcommand())
        .subcommand(cmd_nwkix::list::make_subcommand())
        .subcommand(cmd_nwkix::tree::make_subcommand())
        .subcommand(cmd_nwkix::nodes::make_subcommand())
        .subcommand(cmd_nwkix::root::make_subcommand())
        .subcommand(cmd_nwkix::search::make_subcommand())
        .subcommand(cmd_nwkix::explain::make_subcommand())
        .subcommand(cmd_nwkix::ancestors::make_subcommand())
        .subcommand(cmd_nwkix::descendants::make_subcommand())
        .subcommand(cmd_nwkix::lca::make_subcommand())
        .subcommand(cmd_nwkix::related::make_subcommand())
        .subcommand(cmd_nwkix::subtree::make_subcommand())
        .subcommand(cmd_nwkix::delete::make_subcommand())
        .after_help(
            r###"
`nwkix` ingests Newick trees, fingerprints each one into a 256-dimensional
structural vector, and answers similarity, subtree, and explanation queries
against an in-memory corpus built fresh from its command-line input.

Subcommand groups:

* Ingest:
    * ingest

* Inspect a corpus:
    * list / tree / nodes / root

* Similarity:
    * search / explain

* Traversal:
    * ancestors / descendants / lca / related / subtree

* Mutate (ephemeral corpus only):
    * delete
"###,
        );

    match app.get_matches().subcommand() {
        Some(("ingest", sub_matches)) => cmd_nwkix::ingest::execute(sub_matches),
        Some(("list", sub_matches)) => cmd_nwkix::list::execute(sub_matches),
        Some(("tree", sub_matches)) => cmd_nwkix::tree::execute(sub_matches),
        Some(("nodes", sub_matches)) => cmd_nwkix::nodes::execute(sub_matches),
        Some(("root", sub_matches)) => cmd_nwkix::root::execute(sub_matches),
        Some(("search", sub_matches)) => cmd_nwkix::search::execute(sub_matches),
        Some(("explain", sub_matches)) => cmd_nwkix::explain::execute(sub_matches),
        Some(("ancestors", sub_matches)) => cmd_nwkix::ancestors::execute(sub_matches),
        Some(("descendants", sub_matches)) => cmd_nwkix::descendants::execute(sub_matches),
        Some(("lca", sub_matches)) => cmd_nwkix::lca::execute(sub_matches),
        Some(("related", sub_matches)) => cmd_nwkix::related::execute(sub_matches),
        Some(("subtree", sub_matches)) => cmd_nwkix::subtree::execute(sub_matches),
        Some(("delete", sub_matches)) => cmd_nwkix::delete::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}
