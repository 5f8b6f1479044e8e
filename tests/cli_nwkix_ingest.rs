use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn command_ingest_basic() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("nwkix")?;
    cmd.arg("ingest")
        .arg("tests/newick/corpus/t1.nwk")
        .assert()
        .success()
        .stdout(predicate::str::contains("num_leaves\t4"))
        .stdout(predicate::str::contains("num_nodes\t7"));

    Ok(())
}

#[test]
fn command_ingest_explicit_id() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("nwkix")?;
    cmd.arg("ingest")
        .arg("tests/newick/corpus/t1.nwk")
        .arg("--id")
        .arg("p001")
        .assert()
        .success()
        .stdout(predicate::str::contains("id\tp001"));

    Ok(())
}

#[test]
fn command_ingest_rejects_malformed_newick() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("nwkix")?;
    cmd.arg("ingest")
        .arg("-")
        .arg("--name")
        .arg("bad")
        .write_stdin("(A,B")
        .assert()
        .failure();

    Ok(())
}
