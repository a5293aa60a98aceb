//! CLI tests for `lytest store`, `lytest run` and `lytest diff`.
//!
//! Layout generators and the XOR engine are small shell scripts: the engine
//! treats byte-identical files as matching layouts.

#![cfg(unix)]

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use lytest::exit_codes;
use lytest::test_support::write_file;

const CONFIG: &str = r#"
[xor]
command = ["sh", "-c", 'test "$(cat "$0")" = "$(cat "$1")"', "{{ reference }}", "{{ test }}"]

[viewer]
command = []
"#;

fn module(shape: &str) -> String {
    format!(
        "[test_foo]\ncommand = [\"sh\", \"-c\", 'printf {shape} > \"$0\"', \"{{{{ output }}}}\"]\n"
    )
}

fn lytest(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lytest"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("spawn lytest")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn store_then_run_prints_success() {
    let work = tempfile::tempdir().expect("work");
    write_file(work.path(), "lytest.toml", CONFIG).expect("config");
    write_file(work.path(), "mytest.toml", &module("ring")).expect("module");

    let stored = lytest(work.path(), &["store", "mytest.toml", "test_foo"]);
    assert_eq!(stored.status.code(), Some(exit_codes::OK), "{stored:?}");
    assert_eq!(stdout(&stored), "Success\n");
    let reference = work.path().join("ref_layouts/test_foo.gds");
    assert_eq!(fs::read_to_string(reference).expect("reference"), "ring");

    let ran = lytest(work.path(), &["run", "mytest.toml", "foo"]);
    assert_eq!(ran.status.code(), Some(exit_codes::OK), "{ran:?}");
    assert_eq!(stdout(&ran), "Success\n");
    assert!(work.path().join("run_layouts/test_foo.gds").is_file());
}

#[test]
fn run_with_changed_geometry_fails() {
    let work = tempfile::tempdir().expect("work");
    write_file(work.path(), "lytest.toml", CONFIG).expect("config");
    write_file(work.path(), "mytest.toml", &module("ring")).expect("module");
    let stored = lytest(work.path(), &["store", "mytest.toml", "test_foo"]);
    assert_eq!(stored.status.code(), Some(exit_codes::OK), "{stored:?}");

    write_file(work.path(), "mytest.toml", &module("disk")).expect("module");
    let ran = lytest(work.path(), &["run", "mytest.toml", "foo"]);

    assert_eq!(ran.status.code(), Some(exit_codes::FAILURE));
    assert!(stdout(&ran).is_empty());
    assert!(String::from_utf8_lossy(&ran.stderr).contains("Layouts differ"));
}

#[test]
fn run_without_test_shaped_name_fails() {
    let work = tempfile::tempdir().expect("work");
    write_file(work.path(), "lytest.toml", CONFIG).expect("config");
    write_file(work.path(), "mytest.toml", &module("ring")).expect("module");

    let ran = lytest(work.path(), &["run", "mytest.toml", "bar"]);

    assert_eq!(ran.status.code(), Some(exit_codes::FAILURE));
    assert!(String::from_utf8_lossy(&ran.stderr).contains("No test-shaped version of bar"));
    assert!(!work.path().join("run_layouts").exists());
}

#[test]
fn broken_module_reports_load_error() {
    let work = tempfile::tempdir().expect("work");
    write_file(work.path(), "lytest.toml", CONFIG).expect("config");
    write_file(work.path(), "broken.toml", "[test_foo\n").expect("module");

    let ran = lytest(work.path(), &["run", "broken.toml", "foo"]);

    assert_eq!(ran.status.code(), Some(exit_codes::FAILURE));
    assert!(String::from_utf8_lossy(&ran.stderr).contains("Error loading broken.toml"));
}

#[test]
fn diff_reports_different_layouts() {
    let work = tempfile::tempdir().expect("work");
    write_file(work.path(), "lytest.toml", CONFIG).expect("config");
    write_file(work.path(), "a.gds", "ring").expect("a");
    write_file(work.path(), "b.gds", "disk").expect("b");
    write_file(work.path(), "c.GDS", "ring").expect("c");

    let different = lytest(work.path(), &["diff", "a.gds", "b.gds", "1"]);
    assert_eq!(different.status.code(), Some(exit_codes::OK), "{different:?}");
    assert_eq!(stdout(&different), "These layouts are different.\n");

    let same = lytest(work.path(), &["diff", "a.gds", "c.GDS"]);
    assert_eq!(same.status.code(), Some(exit_codes::OK), "{same:?}");
    assert!(stdout(&same).is_empty());
}

#[test]
fn diff_tolerance_unused_by_engine_command_is_an_error() {
    let work = tempfile::tempdir().expect("work");
    write_file(work.path(), "lytest.toml", CONFIG).expect("config");
    write_file(work.path(), "a.gds", "ring").expect("a");
    write_file(work.path(), "b.gds", "ring").expect("b");

    let output = lytest(work.path(), &["diff", "a.gds", "b.gds", "500"]);

    assert_eq!(output.status.code(), Some(exit_codes::FAILURE));
    assert!(stdout(&output).is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("tolerance 500"));
}

#[test]
fn diff_rejects_unknown_format() {
    let work = tempfile::tempdir().expect("work");
    write_file(work.path(), "lytest.toml", CONFIG).expect("config");
    write_file(work.path(), "a.gds", "ring").expect("a");
    write_file(work.path(), "notes.txt", "ring").expect("notes");

    let output = lytest(work.path(), &["diff", "a.gds", "notes.txt"]);

    assert_eq!(output.status.code(), Some(exit_codes::FAILURE));
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("Unrecognized layout format: notes.txt")
    );
}
