use super::corpus_io::load_corpus;
use super::utils::{corpus_arg, outfile_arg, read_newick_arg};
use clap::*;
use nwkix::libs::phylo::fingerprint::compute_fingerprint;
use nwkix::libs::phylo::tree::Tree;

pub fn make_subcommand() -> Command {
    Command::new("search")
        .about("Finds the K most structurally similar trees to a query")
        .after_help(
            r###"
Implements `search_similar` (spec.md §6 / §4.E): parses `--query`, encodes
its fingerprint, and returns the top-K trees in the corpus by cosine
similarity.

`--query` accepts an existing file path, `-`/`stdin`, or a literal Newick
string on the command line.

Examples:
1. Search a directory of trees for the 5 closest to a query tree:
   nwkix search trees/ --query query.nwk -k 5

2. Query with a literal Newick string:
   nwkix search trees/ --query "(A,(B,C));"
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
            Arg::new("limit")
                .short('k')
                .long("limit")
                .num_args(1)
                .value_parser(value_parser!(usize))
                .default_value("10")
                .help("Number of results to return"),
        )
        .arg(outfile_arg())
}

pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());
    let corpus = load_corpus(args.get_one::<String>("corpus").unwrap())?;
    let k = *args.get_one::<usize>("limit").unwrap();

    let query_raw = args.get_one::<String>("query").unwrap();
    let query_newick = read_newick_arg(query_raw)?;
    let query_tree = Tree::from_newick(&query_newick).map_err(|e| anyhow::anyhow!(e))?;
    let query_fp = compute_fingerprint(&query_tree, true);

    let hits = corpus.search(&query_fp, k).map_err(|e| anyhow::anyhow!(e))?;

    writer.write_fmt(format_args!(
        "query_num_leaves\t{}\n",
        query_tree
            .preorder(&query_tree.get_root().unwrap())?
            .iter()
            .filter(|&&id| query_tree.get_node(id).unwrap().is_leaf())
            .count()
    ))?;
    writer.write_fmt(format_args!("tree_id\ttree_name\tsimilarity\tnum_leaves\tnewick\n"))?;
    for hit in hits {
        let tree = corpus
            .get_tree(&hit.tree_id)
            .map_err(|e| anyhow::anyhow!(e))?;
        writer.write_fmt(format_args!(
            "{}\t{}\t{:.4}\t{}\t{}\n",
            tree.id, tree.name, hit.score, tree.num_leaves, tree.newick
        ))?;
    }

    Ok(())
}
