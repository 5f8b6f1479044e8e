use super::corpus_io::load_corpus;
use super::utils::{corpus_arg, outfile_arg, resolve_node_id};
use clap::*;
use nwkix::libs::phylo::query::{build_node_map, subtree_to_newick};

pub fn make_subcommand() -> Command {
    Command::new("subtree")
        .about("Extracts the subtree rooted at a node as Newick")
        .after_help(
            r###"
Implements `get_subtree_newick` (spec.md §6 / §4.F): a post-order rebuild of
the subtree rooted at `--node`, suitable for re-submission to `search` or
`explain` (spec.md §1, item 2).

Examples:
1. Extract the subtree at an internal node, branch lengths included:
   nwkix subtree trees/ --tree p001 --node 0123456789abcdef --branch-lengths

2. By label instead of node id:
   nwkix subtree trees/ --tree p001 --node Hominini
"###,
        )
        .arg(corpus_arg())
        .arg(
            Arg::new("tree")
                .long("tree")
                .num_args(1)
                .required(true)
                .help("Tree id"),
        )
        .arg(
            Arg::new("node")
                .long("node")
                .num_args(1)
                .required(true)
                .help("Node id or label"),
        )
        .arg(
            Arg::new("branch-lengths")
                .long("branch-lengths")
                .action(ArgAction::SetTrue)
                .help("Include branch lengths in the output Newick"),
        )
        .arg(outfile_arg())
}

pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());
    let corpus = load_corpus(args.get_one::<String>("corpus").unwrap())?;
    let tree_id = args.get_one::<String>("tree").unwrap();
    let node_ref = args.get_one::<String>("node").unwrap();
    let include_bl = args.get_flag("branch-lengths");

    let nodes = corpus.nodes_of(tree_id).map_err(|e| anyhow::anyhow!(e))?;
    let node_map = build_node_map(&nodes);
    let node_id = resolve_node_id(&node_map, node_ref)
        .ok_or_else(|| anyhow::anyhow!("node '{}' not found in tree '{}'", node_ref, tree_id))?
        .to_string();

    let result =
        subtree_to_newick(&node_map, &node_id, include_bl).map_err(|e| anyhow::anyhow!(e))?;

    writer.write_fmt(format_args!("newick\t{}\n", result.newick))?;
    writer.write_fmt(format_args!("node_ids\t{}\n", result.node_ids.join(",")))?;

    Ok(())
}
