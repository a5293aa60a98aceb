//! CLI tests for the git integration commands.
//!
//! Spawns the lytest binary the way git and users do and checks stdout,
//! exit codes, and the files written.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use lytest::exit_codes;
use lytest::git_diff::REFUSE_SIMILAR_MSG;
use lytest::test_support::{TestRepo, write_file};

/// Config whose XOR engine cannot run, so any comparison fails loudly.
const NO_ENGINE_CONFIG: &str = "[xor]\ncommand = [\"lytest-missing-xor-engine\"]\n\n[viewer]\ncommand = []\n";

fn lytest(dir: &Path, home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lytest"))
        .current_dir(dir)
        .env("HOME", home)
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("GIT_CONFIG_GLOBAL")
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .args(args)
        .output()
        .expect("spawn lytest")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn git_config_local_twice_appends_twice() {
    let repo = TestRepo::new().expect("repo");
    let home = tempfile::tempdir().expect("home");

    for _ in 0..2 {
        let output = lytest(repo.path(), home.path(), &["git-config", "--local"]);
        assert_eq!(output.status.code(), Some(exit_codes::OK), "{output:?}");
    }

    let attributes =
        fs::read_to_string(repo.path().join(".git/info/attributes")).expect("read attributes");
    for ext in ["gds", "GDS", "oas", "OAS", "kicad_pcb"] {
        let line = format!("*.{ext}  diff=lytest");
        assert_eq!(attributes.matches(&line).count(), 2, "{line}");
    }
    let config = fs::read_to_string(repo.path().join(".git/config")).expect("read config");
    assert!(config.contains("[diff \"lytest\"]"));
    assert!(config.contains("command = lytest git-diff"));
    assert!(config.contains("binary = true"));
}

#[test]
fn git_config_global_writes_user_files() {
    let work = tempfile::tempdir().expect("work");
    let home = tempfile::tempdir().expect("home");

    let output = lytest(work.path(), home.path(), &["git-config"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK), "{output:?}");

    let gitconfig = fs::read_to_string(home.path().join(".gitconfig")).expect("read gitconfig");
    assert!(gitconfig.contains("[diff \"lytest\"]"));
    let attributes = fs::read_to_string(home.path().join(".config/git/attributes"))
        .expect("read global attributes");
    assert!(attributes.contains("*.OAS  diff=lytest\n"));
}

#[test]
fn git_diff_refuses_similar_files_without_engine() {
    let work = tempfile::tempdir().expect("work");
    write_file(work.path(), "lytest.toml", NO_ENGINE_CONFIG).expect("config");

    let output = lytest(
        work.path(),
        work.path(),
        &[
            "git-diff", "path", "x.gds", "h1", "100644", "y.gds", "h2", "100644", "90",
            "rename.gds",
        ],
    );

    assert_eq!(output.status.code(), Some(exit_codes::OK), "{output:?}");
    let out = stdout(&output);
    assert!(out.starts_with(REFUSE_SIMILAR_MSG));
    assert!(out.contains("rename.gds"));
}

#[test]
fn git_diff_refuses_deleted_file_without_engine() {
    let work = tempfile::tempdir().expect("work");
    write_file(work.path(), "lytest.toml", NO_ENGINE_CONFIG).expect("config");

    let output = lytest(
        work.path(),
        work.path(),
        &[
            "git-diff", "ring.gds", "old.gds", "h1", "100644", "/dev/null", ".", ".",
        ],
    );

    assert_eq!(output.status.code(), Some(exit_codes::OK), "{output:?}");
    assert!(stdout(&output).contains("does not exist on both commits"));
}

#[test]
fn git_diff_accepts_path_starting_with_hyphen() {
    let work = tempfile::tempdir().expect("work");
    write_file(work.path(), "lytest.toml", NO_ENGINE_CONFIG).expect("config");

    let output = lytest(
        work.path(),
        work.path(),
        &[
            "git-diff", "-ring.gds", "-ring.gds", "h1", "100644", "/dev/null", ".", ".",
        ],
    );

    assert_eq!(output.status.code(), Some(exit_codes::OK), "{output:?}");
    assert!(stdout(&output).contains("File -ring.gds does not exist on both commits"));
}

#[test]
fn git_diff_engine_failure_is_fatal() {
    let work = tempfile::tempdir().expect("work");
    write_file(work.path(), "lytest.toml", NO_ENGINE_CONFIG).expect("config");

    let output = lytest(
        work.path(),
        work.path(),
        &[
            "git-diff", "ring.gds", "old.gds", "h1", "100644", "new.gds", "h2", "100644",
        ],
    );

    assert_eq!(output.status.code(), Some(exit_codes::FAILURE));
    assert!(String::from_utf8_lossy(&output.stderr).contains("lytest-missing-xor-engine"));
}

#[test]
fn version_flag_prints_version() {
    let work = tempfile::tempdir().expect("work");
    for flag in ["-v", "--version"] {
        let output = lytest(work.path(), work.path(), &[flag]);
        assert_eq!(output.status.code(), Some(exit_codes::OK));
        assert_eq!(
            stdout(&output),
            format!("lytest {}\n", env!("CARGO_PKG_VERSION"))
        );
    }
}

#[test]
fn unknown_command_is_a_usage_error() {
    let work = tempfile::tempdir().expect("work");
    let output = lytest(work.path(), work.path(), &["frobnicate"]);
    assert_eq!(output.status.code(), Some(2));
}
