use super::corpus_io::load_corpus;
use super::utils::{corpus_arg, outfile_arg};
use clap::*;

pub fn make_subcommand() -> Command {
    Command::new("list")
        .about("Lists the trees ingested into the corpus")
        .after_help(
            r###"
Implements the `list_trees` operation (spec.md §6): every tree reachable from
the input, in insertion order, one row per tree.

Examples:
1. List every tree in a directory of Newick files:
   nwkix list trees/

2. Keep only the first 10:
   nwkix list trees/ --limit 10
"###,
        )
        .arg(corpus_arg())
        .arg(
            Arg::new("limit")
                .long("limit")
                .num_args(1)
                .value_parser(value_parser!(usize))
                .default_value("1000")
                .help("Maximum number of trees to list"),
        )
        .arg(outfile_arg())
}

pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());
    let corpus = load_corpus(args.get_one::<String>("corpus").unwrap())?;
    let limit = *args.get_one::<usize>("limit").unwrap();

    writer.write_fmt(format_args!(
        "id\tname\ttype\tnum_leaves\tnum_nodes\tcreated_at\n"
    ))?;
    for tree in corpus.list_trees(limit).map_err(|e| anyhow::anyhow!(e))? {
        let nodes = corpus
            .nodes_of(&tree.id)
            .map_err(|e| anyhow::anyhow!(e))?;
        let tree_type = tree.tree_type(&nodes);
        writer.write_fmt(format_args!(
            "{}\t{}\t{}\t{}\t{}\t{}\n",
            tree.id,
            tree.name,
            tree_type,
            tree.num_leaves,
            tree.num_nodes,
            tree.created_at
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_else(|_| "unknown".to_string()),
        ))?;
    }

    Ok(())
}
