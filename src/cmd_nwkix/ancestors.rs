use super::corpus_io::load_corpus;
use super::utils::{corpus_arg, outfile_arg, resolve_node_id};
use clap::*;
use nwkix::libs::phylo::query::{ancestors, build_node_map};

pub fn make_subcommand() -> Command {
    Command::new("ancestors")
        .about("Lists the ancestor chain of a node, nearest first")
        .after_help(
            r###"
Implements `get_ancestors` (spec.md §6 / §4.F): walks `parent_id` links from
`--node`'s parent up to the root. A node that cannot be found yields an empty
list with `path_length = 0`, not an error.

Examples:
1. Ancestors of leaf "A" in tree "p001":
   nwkix ancestors trees/ --tree p001 --node A

2. Only the two nearest ancestors:
   nwkix ancestors trees/ --tree p001 --node A --max-depth 2
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
            Arg::new("max-depth")
                .long("max-depth")
                .num_args(1)
                .value_parser(value_parser!(usize))
                .help("Truncate the chain to at most this many ancestors"),
        )
        .arg(outfile_arg())
}

pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());
    let corpus = load_corpus(args.get_one::<String>("corpus").unwrap())?;
    let tree_id = args.get_one::<String>("tree").unwrap();
    let node_ref = args.get_one::<String>("node").unwrap();
    let max_depth = args.get_one::<usize>("max-depth").copied();

    let nodes = corpus.nodes_of(tree_id).map_err(|e| anyhow::anyhow!(e))?;
    let node_map = build_node_map(&nodes);
    let node_id = resolve_node_id(&node_map, node_ref).unwrap_or(node_ref.as_str());

    let result = ancestors(&node_map, node_id, max_depth);

    writer.write_fmt(format_args!("path_length\t{}\n", result.path_length))?;
    for n in &result.ancestors {
        writer.write_fmt(format_args!(
            "{}\t{}\t{}\n",
            n.id,
            n.label.as_deref().unwrap_or(""),
            n.depth
        ))?;
    }

    Ok(())
}
