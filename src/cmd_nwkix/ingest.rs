use clap::*;
use nwkix::libs::phylo::ingest::ingest_tree;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub fn make_subcommand() -> Command {
    Command::new("ingest")
        .about("Parses a Newick tree and prints its persisted summary")
        .after_help(
            r###"
Implements the `ingest_tree` operation (spec.md §6): parses a single Newick
tree, builds its node graph, computes the 256-dim fingerprint, and prints the
record that would be committed to a corpus. The CLI holds no state between
invocations (SPEC_FULL.md §0) — use a directory/multi-tree file with the
other subcommands to query across several trees in one call.

Examples:
1. Ingest a tree from a file:
   nwkix ingest tree.nwk --name primates

2. Ingest with an explicit id (otherwise derived deterministically):
   nwkix ingest tree.nwk --name primates --id p001
"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Input filename holding a single Newick tree. [stdin] for standard input"),
        )
        .arg(
            Arg::new("name")
                .long("name")
                .num_args(1)
                .help("Tree name [default: input file stem]"),
        )
        .arg(
            Arg::new("id")
                .long("id")
                .num_args(1)
                .help("Tree id [default: deterministic hash of name+newick]"),
        )
        .arg(
            Arg::new("outfile")
                .short('o')
                .long("outfile")
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        )
}

pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());
    let infile = args.get_one::<String>("infile").unwrap();

    let name = args
        .get_one::<String>("name")
        .cloned()
        .unwrap_or_else(|| super::corpus_io::stem_of(infile));
    let id = args.get_one::<String>("id").cloned();

    let tree = nwkix::libs::phylo::reader::single_from_file(infile).map_err(|e| anyhow::anyhow!(e))?;
    let newick = nwkix::libs::phylo::writer::write_newick(&tree);

    let created_at = OffsetDateTime::now_utc();
    let (persisted, _nodes) =
        ingest_tree(&newick, &name, id, None, created_at).map_err(|e| anyhow::anyhow!(e))?;

    writer.write_fmt(format_args!("id\t{}\n", persisted.id))?;
    writer.write_fmt(format_args!("name\t{}\n", persisted.name))?;
    writer.write_fmt(format_args!("num_leaves\t{}\n", persisted.num_leaves))?;
    writer.write_fmt(format_args!("num_nodes\t{}\n", persisted.num_nodes))?;
    writer.write_fmt(format_args!(
        "created_at\t{}\n",
        persisted
            .created_at
            .format(&Rfc3339)
            .unwrap_or_else(|_| "unknown".to_string())
    ))?;

    Ok(())
}
