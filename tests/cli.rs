use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const ENV_KEYS: &[&str] = &[
    "SUMMARIZE_CONFIG_FILE",
    "SUMMARIZE_IGNORE_CONTAINS",
    "SUMMARIZE_INCLUDE_EXT",
    "SUMMARIZE_EXCLUDE_EXT",
    "SUMMARIZE_ALWAYS_WRITE",
    "SUMMARIZE_ALWAYS_PRINT",
    "SUMMARIZE_ALWAYS_JSON",
    "SUMMARIZE_ALWAYS_COMPRESS",
];

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn fixture(root: &Path) {
    write_file(&root.join("main.go"), "package main\n\nfunc main() {}\n");
    write_file(&root.join("util/util.go"), "package util\n");
    write_file(&root.join("README.md"), "# readme\n");
    write_file(&root.join("node_modules/dep/index.go"), "package dep\n");
}

fn summarize(root: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("summarize"));
    for key in ENV_KEYS {
        cmd.env_remove(key);
    }
    cmd.arg(root);
    cmd
}

#[test]
fn write_creates_summary_under_source_dir() {
    let temp = tempdir().unwrap();
    fixture(temp.path());

    summarize(temp.path())
        .args(["-i", "go", "-f", "out.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Summary generated:"))
        .stdout(predicate::str::contains("out.md"));

    let out = fs::read_to_string(temp.path().join("summaries/out.md")).unwrap();
    assert!(out.starts_with("# Project Summary - out.md\n"));
    assert!(out.contains("### Workspace"));
    assert!(out.contains("## main.go"));
    assert!(out.contains("## util.go"));
    assert!(!out.contains("## README.md"));
    assert!(!out.contains("## index.go"));
}

#[test]
fn write_refuses_existing_output() {
    let temp = tempdir().unwrap();
    fixture(temp.path());

    summarize(temp.path())
        .args(["-i", "go", "-f", "out.md"])
        .assert()
        .success();
    summarize(temp.path())
        .args(["-i", "go", "-f", "out.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn output_dir_flag_is_honored() {
    let temp = tempdir().unwrap();
    let out_dir = tempdir().unwrap();
    fixture(temp.path());

    summarize(temp.path())
        .args(["-i", "go", "-f", "s.md", "-o"])
        .arg(out_dir.path())
        .assert()
        .success();

    assert!(out_dir.path().join("s.md").is_file());
    assert!(!temp.path().join("summaries").exists());
}

#[test]
fn print_writes_report_to_stdout_only() {
    let temp = tempdir().unwrap();
    fixture(temp.path());

    summarize(temp.path())
        .args(["-i", "go", "--print"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Project Summary"))
        .stdout(predicate::str::contains("## main.go"))
        .stdout(predicate::str::contains("Summary generated:").not());

    assert!(!temp.path().join("summaries").exists());
}

#[test]
fn print_passes_non_utf8_bytes_through() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("main.go"), b"package main // \xff\xfe\n").unwrap();

    let assert = summarize(temp.path())
        .args(["-i", "go", "--print", "--write", "-f", "raw.md"])
        .assert()
        .success();
    let stdout = &assert.get_output().stdout;
    let written = fs::read(temp.path().join("summaries/raw.md")).unwrap();
    assert_eq!(stdout, &written);
    assert!(stdout.windows(2).any(|w| w == [0xff, 0xfe]));
}

#[test]
fn print_json_envelope() {
    let temp = tempdir().unwrap();
    fixture(temp.path());

    let assert = summarize(temp.path())
        .args(["-i", "md", "--print", "--json", "-f", "j.md"])
        .assert()
        .success();
    let v: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    let contents = v["contents"].as_str().unwrap();
    assert!(contents.contains("## README.md"));
    assert_eq!(v["size"].as_u64().unwrap() as usize, contents.len());
    assert!(v["path"].as_str().unwrap().ends_with("j.md"));
}

#[test]
fn json_completion_message() {
    let temp = tempdir().unwrap();
    fixture(temp.path());

    let assert = summarize(temp.path())
        .args(["-i", "go", "--json", "-f", "m.md"])
        .assert()
        .success();
    let v: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    let message = v["message"].as_str().unwrap();
    assert!(message.starts_with("Summary generated: "));
    assert!(message.ends_with("m.md"));
}

#[test]
fn gz_writes_compressed_file() {
    let temp = tempdir().unwrap();
    fixture(temp.path());

    summarize(temp.path())
        .args(["-i", "go", "--gz", "-f", "out.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("out.md.gz"));

    let gz = fs::read(temp.path().join("summaries/out.md.gz")).unwrap();
    let text = summarize::engine::decompress(&gz).unwrap();
    let text = String::from_utf8(text).unwrap();
    assert!(text.contains("## main.go"));
}

#[test]
fn expand_prints_deduplicated_lists() {
    let temp = tempdir().unwrap();

    summarize(temp.path())
        .args(["--expand", "-i", "go,md,go", "-s", "vendor/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("include: go, md\n"))
        .stdout(predicate::str::contains("skip: vendor/\n"));

    assert!(!temp.path().join("summaries").exists());
}

#[test]
fn env_list_extends_cli_list() {
    let temp = tempdir().unwrap();

    summarize(temp.path())
        .env("SUMMARIZE_INCLUDE_EXT", "rs, go")
        .args(["--expand", "-i", "go"])
        .assert()
        .success()
        .stdout(predicate::str::contains("include: go, rs\n"));
}

#[test]
fn config_file_sets_include() {
    let temp = tempdir().unwrap();
    fixture(temp.path());
    write_file(
        &temp.path().join(".summarize.toml"),
        "[settings]\ninclude = [\"md\"]\nprint = true\n",
    );

    summarize(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("## README.md"))
        .stdout(predicate::str::contains("## main.go").not());
}

#[test]
fn cli_overrides_config_file() {
    let temp = tempdir().unwrap();
    fixture(temp.path());
    write_file(
        &temp.path().join(".summarize.toml"),
        "[settings]\ninclude = [\"md\"]\n",
    );

    summarize(temp.path())
        .args(["-i", "go", "--print"])
        .assert()
        .success()
        .stdout(predicate::str::contains("## main.go"))
        .stdout(predicate::str::contains("## README.md").not());
}

#[test]
fn max_files_out_of_range_fails() {
    let temp = tempdir().unwrap();

    summarize(temp.path())
        .args(["--mf", "0", "--print"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--max-files"));
}

#[test]
fn missing_dir_fails() {
    let temp = tempdir().unwrap();

    summarize(&temp.path().join("nope"))
        .arg("--print")
        .assert()
        .failure();
}
