use assert_cmd::Command;
use predicates::prelude::*;

const T1: &str = "tests/newick/corpus/t1.nwk";

fn node_id_for(label: &str) -> anyhow::Result<String> {
    let mut cmd = Command::cargo_bin("nwkix")?;
    let output = cmd.arg("nodes").arg(T1).arg("--id").arg("t1").output()?;
    let stdout = String::from_utf8(output.stdout)?;
    for line in stdout.lines().skip(1) {
        let cols: Vec<&str> = line.split('\t').collect();
        if cols[1] == label {
            return Ok(cols[0].to_string());
        }
    }
    anyhow::bail!("label '{}' not found", label)
}

fn root_id() -> anyhow::Result<String> {
    let mut cmd = Command::cargo_bin("nwkix")?;
    let output = cmd.arg("nodes").arg(T1).arg("--id").arg("t1").output()?;
    let stdout = String::from_utf8(output.stdout)?;
    for line in stdout.lines().skip(1) {
        let cols: Vec<&str> = line.split('\t').collect();
        // parent_id column is empty for the root
        if cols[2].is_empty() {
            return Ok(cols[0].to_string());
        }
    }
    anyhow::bail!("root not found")
}

#[test]
fn command_ancestors_of_leaf() -> anyhow::Result<()> {
    // t1 = ((A:0.1,B:0.1):0.3,(C:0.2,D:0.2):0.2); A's ancestor chain is its
    // AB clade, then the root: path_length == 2.
    let mut cmd = Command::cargo_bin("nwkix")?;
    cmd.arg("ancestors")
        .arg(T1)
        .arg("--tree")
        .arg("t1")
        .arg("--node")
        .arg("A")
        .assert()
        .success()
        .stdout(predicate::str::contains("path_length\t2"));

    Ok(())
}

#[test]
fn command_ancestors_max_depth_truncates() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("nwkix")?;
    cmd.arg("ancestors")
        .arg(T1)
        .arg("--tree")
        .arg("t1")
        .arg("--node")
        .arg("A")
        .arg("--max-depth")
        .arg("1")
        .assert()
        .success()
        .stdout(predicate::str::contains("path_length\t1"));

    Ok(())
}

#[test]
fn command_descendants_of_root() -> anyhow::Result<()> {
    let root = root_id()?;
    let mut cmd = Command::cargo_bin("nwkix")?;
    cmd.arg("descendants")
        .arg(T1)
        .arg("--tree")
        .arg("t1")
        .arg("--node")
        .arg(&root)
        .assert()
        .success()
        // 7 nodes total minus the root itself
        .stdout(predicate::str::contains("total_count\t6"));

    Ok(())
}

#[test]
fn command_descendants_leaves_only() -> anyhow::Result<()> {
    let root = root_id()?;
    let mut cmd = Command::cargo_bin("nwkix")?;
    cmd.arg("descendants")
        .arg(T1)
        .arg("--tree")
        .arg("t1")
        .arg("--node")
        .arg(&root)
        .arg("--leaves-only")
        .assert()
        .success()
        .stdout(predicate::str::contains("total_count\t4"));

    Ok(())
}

#[test]
fn command_lca_of_two_leaves_across_clades() -> anyhow::Result<()> {
    let root = root_id()?;
    let mut cmd = Command::cargo_bin("nwkix")?;
    let output = cmd
        .arg("lca")
        .arg(T1)
        .arg("--tree")
        .arg("t1")
        .arg("--node1")
        .arg("A")
        .arg("--node2")
        .arg("C")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains(&format!("node_id\t{}", root)));

    Ok(())
}

#[test]
fn command_lca_within_same_clade() -> anyhow::Result<()> {
    let a = node_id_for("A")?;
    let mut cmd = Command::cargo_bin("nwkix")?;
    let output = cmd
        .arg("lca")
        .arg(T1)
        .arg("--tree")
        .arg("t1")
        .arg("--node1")
        .arg("A")
        .arg("--node2")
        .arg("B")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;
    assert!(!stdout.contains(&format!("node_id\t{}", a)));
    assert!(stdout.starts_with("node_id\t"));

    Ok(())
}

#[test]
fn command_subtree_rebuilds_newick() -> anyhow::Result<()> {
    let root = root_id()?;
    let mut cmd = Command::cargo_bin("nwkix")?;
    let output = cmd
        .arg("subtree")
        .arg(T1)
        .arg("--tree")
        .arg("t1")
        .arg("--node")
        .arg(&root)
        .arg("--branch-lengths")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;
    let first_line = stdout.lines().next().unwrap();
    assert!(first_line.starts_with("newick\t"));
    let newick = &first_line["newick\t".len()..];
    assert!(newick.contains("A:0.1"));
    assert!(newick.contains("D:0.2"));

    Ok(())
}

#[test]
fn command_related_leaves_from_internal_node() -> anyhow::Result<()> {
    let ab_clade = {
        // the parent of A is the (A,B) clade
        let mut cmd = Command::cargo_bin("nwkix")?;
        let output = cmd
            .arg("ancestors")
            .arg(T1)
            .arg("--tree")
            .arg("t1")
            .arg("--node")
            .arg("A")
            .arg("--max-depth")
            .arg("1")
            .output()?;
        let stdout = String::from_utf8(output.stdout)?;
        stdout.lines().nth(1).unwrap().split('\t').next().unwrap().to_string()
    };

    let mut cmd = Command::cargo_bin("nwkix")?;
    cmd.arg("related")
        .arg(T1)
        .arg("--tree")
        .arg("t1")
        .arg("--node")
        .arg(&ab_clade)
        .arg("--max-distance")
        .arg("1")
        .assert()
        .success()
        // within 1 edge of the (A,B) clade: exactly A and B
        .stdout(predicate::str::contains("A\t1"))
        .stdout(predicate::str::contains("B\t1"))
        .stdout(predicate::str::contains("C\t").not());

    Ok(())
}
