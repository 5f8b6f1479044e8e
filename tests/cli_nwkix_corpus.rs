use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn command_list_directory() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("nwkix")?;
    let output = cmd.arg("list").arg("tests/newick/corpus").output()?;
    let stdout = String::from_utf8(output.stdout)?;

    // header + t1 + t2, insertion order (sorted by filename in load_corpus)
    assert_eq!(stdout.lines().count(), 3);
    assert!(stdout.lines().nth(1).unwrap().starts_with("t1\t"));
    assert!(stdout.lines().nth(2).unwrap().starts_with("t2\t"));

    Ok(())
}

#[test]
fn command_list_respects_limit() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("nwkix")?;
    cmd.arg("list")
        .arg("tests/newick/corpus")
        .arg("--limit")
        .arg("1")
        .assert()
        .success()
        .stdout(predicate::str::contains("t1\t"))
        .stdout(predicate::str::contains("t2\t").not());

    Ok(())
}

#[test]
fn command_tree_summary() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("nwkix")?;
    cmd.arg("tree")
        .arg("tests/newick/corpus")
        .arg("--id")
        .arg("t1")
        .assert()
        .success()
        .stdout(predicate::str::contains("num_leaves\t4"))
        .stdout(predicate::str::contains("type\tphylogram"));

    Ok(())
}

#[test]
fn command_tree_not_found() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("nwkix")?;
    cmd.arg("tree")
        .arg("tests/newick/corpus")
        .arg("--id")
        .arg("does-not-exist")
        .assert()
        .failure();

    Ok(())
}

#[test]
fn command_nodes_and_root() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("nwkix")?;
    let output = cmd
        .arg("nodes")
        .arg("tests/newick/corpus")
        .arg("--id")
        .arg("t1")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;
    // header + 7 nodes (4 leaves + 3 internal, spec.md §8 scenario 1)
    assert_eq!(stdout.lines().count(), 8);

    let mut cmd = Command::cargo_bin("nwkix")?;
    cmd.arg("root")
        .arg("tests/newick/corpus")
        .arg("--id")
        .arg("t1")
        .assert()
        .success()
        .stdout(predicate::str::contains("depth\t0"));

    Ok(())
}
