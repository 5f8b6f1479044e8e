use super::corpus_io::load_corpus;
use super::utils::{corpus_arg, outfile_arg, resolve_node_id};
use clap::*;
use nwkix::libs::phylo::query::{build_node_map, related_leaves};

pub fn make_subcommand() -> Command {
    Command::new("related")
        .about("Finds leaves within a given edge-distance of a node")
        .after_help(
            r###"
Implements the "Related" traversal (spec.md §4.F; SPEC_FULL.md §11
supplement #2, grounded on `catalog/tree_search.py::find_related_sequences`):
an undirected BFS over parent/child edges, collecting every reached leaf
within `--max-distance` edges, excluding the start node. Sorted by
(edge-distance ascending, summed branch length ascending).

Examples:
1. Leaves within 4 edges of an internal node:
   nwkix related trees/ --tree p001 --node Hominini --max-distance 4
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
            Arg::new("max-distance")
                .long("max-distance")
                .num_args(1)
                .value_parser(value_parser!(usize))
                .default_value("5")
                .help("Maximum edge distance to search"),
        )
        .arg(outfile_arg())
}

pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());
    let corpus = load_corpus(args.get_one::<String>("corpus").unwrap())?;
    let tree_id = args.get_one::<String>("tree").unwrap();
    let node_ref = args.get_one::<String>("node").unwrap();
    let max_distance = *args.get_one::<usize>("max-distance").unwrap();

    let nodes = corpus.nodes_of(tree_id).map_err(|e| anyhow::anyhow!(e))?;
    let node_map = build_node_map(&nodes);
    let node_id = resolve_node_id(&node_map, node_ref).unwrap_or(node_ref.as_str());

    let related = related_leaves(&node_map, node_id, max_distance);

    writer.write_fmt(format_args!(
        "node_id\tlabel\tedge_distance\tbranch_distance\n"
    ))?;
    for r in &related {
        writer.write_fmt(format_args!(
            "{}\t{}\t{}\t{}\n",
            r.node_id,
            r.label.as_deref().unwrap_or(""),
            r.edge_distance,
            r.branch_distance
        ))?;
    }

    Ok(())
}
