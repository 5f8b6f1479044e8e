use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn command_delete_removes_tree_and_reports_node_count() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("nwkix")?;
    cmd.arg("delete")
        .arg("tests/newick/corpus")
        .arg("--id")
        .arg("t1")
        .assert()
        .success()
        .stdout(predicate::str::contains("deleted\tt1"))
        .stdout(predicate::str::contains("nodes_removed\t7"));

    Ok(())
}

#[test]
fn command_delete_unknown_id_fails() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("nwkix")?;
    cmd.arg("delete")
        .arg("tests/newick/corpus")
        .arg("--id")
        .arg("does-not-exist")
        .assert()
        .failure();

    Ok(())
}
