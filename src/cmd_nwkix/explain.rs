use super::corpus_io::load_corpus;
use super::utils::{corpus_arg, outfile_arg, read_newick_arg};
use clap::*;
use nwkix::libs::phylo::explain::explain_similarity;

pub fn make_subcommand() -> Command {
    Command::new("explain")
        .about("Explains the similarity between a query and a stored tree")
        .after_help(
            r###"
Implements `explain_similarity` (spec.md §6 / §4.D): parses `--query` and the
tree named by `--result`, extracts per-category metrics, and prints the five
weighted category scores plus the overall score and a short reasons list.

Examples:
1. Explain why "p001" is similar to a query tree:
   nwkix explain trees/ --query query.nwk --result p001
"###,
        )
        .arg(corpus_arg())
        .arg(
            Arg::new("query")
                .long("query")
                .num_args(1)
                .required(true)
                .help("Query Newick: file path, -/stdin, or a literal string"),
        )
        .arg(
            Arg::new("result")
                .long("result")
                .num_args(1)
                .required(true)
                .help("Id of the stored tree to compare against"),
        )
        .arg(outfile_arg())
}

pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());
    let corpus = load_corpus(args.get_one::<String>("corpus").unwrap())?;

    let query_raw = args.get_one::<String>("query").unwrap();
    let query_newick = read_newick_arg(query_raw)?;
    let result_id = args.get_one::<String>("result").unwrap();
    let result_tree = corpus
        .get_tree(result_id)
        .map_err(|e| anyhow::anyhow!(e))?;

    let explanation =
        explain_similarity(&query_newick, &result_tree.newick).map_err(|e| anyhow::anyhow!(e))?;

    writer.write_fmt(format_args!(
        "overall_similarity\t{:.1}\n",
        explanation.overall * 100.0
    ))?;
    for fs in &explanation.feature_breakdown {
        writer.write_fmt(format_args!("{}\t{:.4}\n", fs.category, fs.score))?;
    }
    for reason in &explanation.reasons {
        writer.write_fmt(format_args!(
            "reason\t{:?}\t{}\t{}\n",
            reason.kind, reason.category, reason.text
        ))?;
    }

    Ok(())
}
