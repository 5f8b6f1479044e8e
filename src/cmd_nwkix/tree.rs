use super::corpus_io::load_corpus;
use super::utils::{corpus_arg, outfile_arg};
use clap::*;

pub fn make_subcommand() -> Command {
    Command::new("tree")
        .about("Prints a single tree's summary and Newick string")
        .after_help(
            r###"
Implements the `get_tree` operation (spec.md §6).

Examples:
1. Look a tree up by id:
   nwkix tree trees/ --id p001
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

    let tree = corpus.get_tree(id).map_err(|e| anyhow::anyhow!(e))?;
    let nodes = corpus.nodes_of(id).map_err(|e| anyhow::anyhow!(e))?;

    writer.write_fmt(format_args!("id\t{}\n", tree.id))?;
    writer.write_fmt(format_args!("name\t{}\n", tree.name))?;
    writer.write_fmt(format_args!("type\t{}\n", tree.tree_type(&nodes)))?;
    writer.write_fmt(format_args!("num_leaves\t{}\n", tree.num_leaves))?;
    writer.write_fmt(format_args!("num_nodes\t{}\n", tree.num_nodes))?;
    writer.write_fmt(format_args!(
        "created_at\t{}\n",
        tree.created_at
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "unknown".to_string()),
    ))?;
    writer.write_fmt(format_args!("newick\t{}\n", tree.newick))?;

    Ok(())
}
