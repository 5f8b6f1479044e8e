use super::corpus_io::load_corpus;
use super::utils::{corpus_arg, outfile_arg};
use clap::*;

pub fn make_subcommand() -> Command {
    Command::new("nodes")
        .about("Lists every node of a tree")
        .after_help(
            r###"
Implements the `get_nodes` operation (spec.md §6): one row per `Node`
(spec.md §3), in the preorder they were built.

Examples:
1. List every node of tree "p001":
   nwkix nodes trees/ --id p001
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

    writer.write_fmt(format_args!(
        "node_id\tlabel\tparent_id\tdepth\tbranch_length\tis_leaf\n"
    ))?;
    for n in &nodes {
        writer.write_fmt(format_args!(
            "{}\t{}\t{}\t{}\t{}\t{}\n",
            n.id,
            n.label.as_deref().unwrap_or(""),
            n.parent_id.as_deref().unwrap_or(""),
            n.depth,
            n.branch_length,
            n.is_leaf,
        ))?;
    }

    Ok(())
}
