use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn input_file(contents: &str) -> Result<NamedTempFile, Box<dyn std::error::Error>> {
    let mut tmp = NamedTempFile::new()?;
    write!(tmp, "{}", contents)?;
    Ok(tmp)
}

#[test]
fn help_works() -> Result<(), Box<dyn std::error::Error>> {
    Command::new(assert_cmd::cargo::cargo_bin!("safejson"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--mask-key"));
    Ok(())
}

#[test]
fn prints_tab_indented_json() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = input_file("{\"hello\":\"world\",\"n\":[1,2]}")?;
    let output = Command::new(assert_cmd::cargo::cargo_bin!("safejson"))
        .arg(tmp.path())
        .output()?;
    assert!(output.status.success());
    let out = String::from_utf8(output.stdout)?;
    assert_eq!(out, "{\n\t\"hello\": \"world\",\n\t\"n\": [\n\t\t1,\n\t\t2\n\t]\n}\n");
    Ok(())
}

#[test]
fn reads_stdin() -> Result<(), Box<dyn std::error::Error>> {
    assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("safejson"))
        .write_stdin("[true, null]")
        .assert()
        .success()
        .stdout("[\n\ttrue,\n\tnull\n]\n");
    Ok(())
}

#[test]
fn secure_masks_sensitive_keys() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = input_file("{\"user\":\"ann\",\"password\":\"hunter2-hunter2\",\"pin\":\"4321\"}")?;
    let output = Command::new(assert_cmd::cargo::cargo_bin!("safejson"))
        .arg("--mask-key")
        .arg("pin")
        .arg(tmp.path())
        .output()?;
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(v["user"], "ann");
    assert_eq!(v["password"], "*".repeat(32));
    assert_eq!(v["pin"], "*".repeat(32));
    Ok(())
}

#[test]
fn writes_output_file() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = input_file("{\"a\":1}")?;
    let dir = tempfile::tempdir()?;
    let out_path = dir.path().join("out.json");
    Command::new(assert_cmd::cargo::cargo_bin!("safejson"))
        .arg("--indent")
        .arg("2")
        .arg("--output")
        .arg(&out_path)
        .arg(tmp.path())
        .assert()
        .success()
        .stdout("");
    assert_eq!(std::fs::read_to_string(&out_path)?, "{\n  \"a\": 1\n}\n");
    Ok(())
}

#[test]
fn rejects_invalid_json() -> Result<(), Box<dyn std::error::Error>> {
    assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("safejson"))
        .write_stdin("{not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("input is not valid JSON"));
    Ok(())
}
