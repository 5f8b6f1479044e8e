use assert_cmd::Command;

#[test]
fn command_search_self_and_branch_length_variant() -> anyhow::Result<()> {
    // spec.md §8 scenario 2: T2 differs from T1 only in branch lengths, and
    // should still score >= 0.95 against it.
    let mut cmd = Command::cargo_bin("nwkix")?;
    let output = cmd
        .arg("search")
        .arg("tests/newick/corpus")
        .arg("--query")
        .arg("tests/newick/corpus/t1.nwk")
        .arg("-k")
        .arg("2")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;
    let lines: Vec<&str> = stdout.lines().collect();

    // line 0: query_num_leaves, line 1: header, line 2+: hits
    assert_eq!(lines[0], "query_num_leaves\t4");
    let hit1: Vec<&str> = lines[2].split('\t').collect();
    assert_eq!(hit1[0], "t1");
    let score1: f64 = hit1[2].parse()?;
    assert!(score1 >= 0.999);

    let hit2: Vec<&str> = lines[3].split('\t').collect();
    assert_eq!(hit2[0], "t2");
    let score2: f64 = hit2[2].parse()?;
    assert!(score2 >= 0.95);

    Ok(())
}

#[test]
fn command_search_literal_newick_query() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("nwkix")?;
    let output = cmd
        .arg("search")
        .arg("tests/newick/corpus")
        .arg("--query")
        .arg("(A,B);")
        .arg("-k")
        .arg("1")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("query_num_leaves\t2"));

    Ok(())
}
