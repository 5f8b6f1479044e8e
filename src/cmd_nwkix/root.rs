use super::corpus_io::load_corpus;
use super::utils::{corpus_arg, outfile_arg};
use clap::*;

pub fn make_subcommand() -> Command {
    Command::new("root")
        .about("Prints the root node of a tree")
        .after_help(
            r###"
Implements the `get_root` operation (spec.md §6): the unique node with
`parent_id = None` and `depth = 0` (spec.md §3).

Examples:
1. Print the root of tree "p001":
   nwkix root trees/ --id p001
"###,
        )
        .arg(corpus_arg())
        .arg(
            Arg::new("id")
                .long("id")
                .num_args(1)
                .required(true)
                .help("Tree id"),
        )
        .arg(outfile_arg())
}

pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());
    let corpus = load_corpus(args.get_one::<String>("corpus").unwrap())?;
    let id = args.get_one::<String>("id").unwrap();

    let nodes = corpus.nodes_of(id).map_err(|e| anyhow::anyhow!(e))?;
    let root = nodes
        .iter()
        .find(|n| n.parent_id.is_none())
        .ok_or_else(|| anyhow::anyhow!("tree '{}' has no root node", id))?;

    writer.write_fmt(format_args!("node_id\t{}\n", root.id))?;
    writer.write_fmt(format_args!(
        "label\t{}\n",
        root.label.as_deref().unwrap_or("")
    ))?;
    writer.write_fmt(format_args!("depth\t{}\n", root.depth))?;
    writer.write_fmt(format_args!("is_leaf\t{}\n", root.is_leaf))?;
    writer.write_fmt(format_args!(
        "children\t{}\n",
        root.child_ids.join(",")
    ))?;

    Ok(())
}
