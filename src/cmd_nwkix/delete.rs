use super::corpus_io::load_corpus;
use super::utils::{corpus_arg, outfile_arg};
use clap::*;

pub fn make_subcommand() -> Command {
    Command::new("delete")
        .about("Removes a tree and its nodes from an ephemeral corpus")
        .after_help(
            r###"
Implements `delete_tree` (spec.md §6 / §4.E). Since the CLI builds a fresh
in-memory corpus per invocation (SPEC_FULL.md §0), this command is mostly a
way to exercise and demonstrate the operation: it loads the corpus, deletes
the named tree, and reports how many node records were removed.

Examples:
1. Delete tree "p001" from a freshly loaded corpus:
   nwkix delete trees/ --id p001
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

    let removed = corpus.delete(id).map_err(|e| anyhow::anyhow!(e))?;
    writer.write_fmt(format_args!("deleted\t{}\n", id))?;
    writer.write_fmt(format_args!("nodes_removed\t{}\n", removed))?;

    Ok(())
}
