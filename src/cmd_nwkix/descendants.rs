use super::corpus_io::load_corpus;
use super::utils::{corpus_arg, outfile_arg, resolve_node_id};
use clap::*;
use nwkix::libs::phylo::query::{build_node_map, descendants};

pub fn make_subcommand() -> Command {
    Command::new("descendants")
        .about("Lists the nodes reachable downward from a node (BFS)")
        .after_help(
            r###"
Implements `get_descendants` (spec.md §6 / §4.F): BFS from `--node`, not
including itself. `--max-depth` is a relative bound in edges.

Examples:
1. Every descendant of the root of tree "p001":
   nwkix descendants trees/ --tree p001 --node <root-id>

2. Only the leaves within 3 edges:
   nwkix descendants trees/ --tree p001 --node <root-id> --max-depth 3 --leaves-only
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
                .help("Relative bound on BFS depth, in edges"),
        )
        .arg(
            Arg::new("leaves-only")
                .long("leaves-only")
                .action(ArgAction::SetTrue)
                .help("Only report leaf descendants"),
        )
        .arg(outfile_arg())
}

pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());
    let corpus = load_corpus(args.get_one::<String>("corpus").unwrap())?;
    let tree_id = args.get_one::<String>("tree").unwrap();
    let node_ref = args.get_one::<String>("node").unwrap();
    let max_depth = args.get_one::<usize>("max-depth").copied();
    let leaves_only = args.get_flag("leaves-only");

    let nodes = corpus.nodes_of(tree_id).map_err(|e| anyhow::anyhow!(e))?;
    let node_map = build_node_map(&nodes);
    let node_id = resolve_node_id(&node_map, node_ref).unwrap_or(node_ref.as_str());

    let result = descendants(&node_map, node_id, max_depth, leaves_only);

    writer.write_fmt(format_args!("total_count\t{}\n", result.total_count))?;
    for n in &result.descendants {
        writer.write_fmt(format_args!(
            "{}\t{}\t{}\t{}\n",
            n.id,
            n.label.as_deref().unwrap_or(""),
            n.depth,
            n.is_leaf
        ))?;
    }

    Ok(())
}
