use super::corpus_io::load_corpus;
use super::utils::{corpus_arg, outfile_arg, resolve_node_id};
use clap::*;
use nwkix::libs::phylo::query::build_node_map;

pub fn make_subcommand() -> Command {
    Command::new("lca")
        .about("Finds the lowest common ancestor of two nodes")
        .after_help(
            r###"
Implements `lca` (spec.md §6 / §4.F). Prints nothing but a not-found marker
if either node is absent.

Examples:
1. LCA of leaves "A" and "C" in tree "p001":
   nwkix lca trees/ --tree p001 --node1 A --node2 C
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
            Arg::new("node1")
                .long("node1")
                .num_args(1)
                .required(true)
                .help("First node id or label"),
        )
        .arg(
            Arg::new("node2")
                .long("node2")
                .num_args(1)
                .required(true)
                .help("Second node id or label"),
        )
        .arg(outfile_arg())
}

pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());
    let corpus = load_corpus(args.get_one::<String>("corpus").unwrap())?;
    let tree_id = args.get_one::<String>("tree").unwrap();
    let r1 = args.get_one::<String>("node1").unwrap();
    let r2 = args.get_one::<String>("node2").unwrap();

    let nodes = corpus.nodes_of(tree_id).map_err(|e| anyhow::anyhow!(e))?;
    let node_map = build_node_map(&nodes);
    let id1 = resolve_node_id(&node_map, r1).unwrap_or(r1.as_str());
    let id2 = resolve_node_id(&node_map, r2).unwrap_or(r2.as_str());

    match nwkix::libs::phylo::query::lca(&node_map, id1, id2) {
        Some(n) => {
            writer.write_fmt(format_args!("node_id\t{}\n", n.id))?;
            writer.write_fmt(format_args!(
                "label\t{}\n",
                n.label.as_deref().unwrap_or("")
            ))?;
            writer.write_fmt(format_args!("depth\t{}\n", n.depth))?;
        }
        None => {
            writer.write_fmt(format_args!("not_found\ttrue\n"))?;
        }
    }

    Ok(())
}
