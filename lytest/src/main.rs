//! Layout regression testing from the command line.
//!
//! Stores reference layouts, re-runs layout tests against them with an XOR
//! engine, and acts as git's external diff driver for layout files.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::debug;

use lytest::core::git_request::GitDiffRequest;
use lytest::diff::{DEFAULT_TOLERANCE, diff_files};
use lytest::exit_codes;
use lytest::git_config::{HomeDirs, install_git_driver};
use lytest::git_diff::git_diff;
use lytest::io::config::{DEFAULT_CONFIG_FILE, LytestConfig, load_config};
use lytest::io::git::{ConfigScope, Git};
use lytest::io::harness::LayoutHarness;
use lytest::io::loader::TestLoader;
use lytest::io::viewer::CommandViewer;
use lytest::io::xor::CommandDiffEngine;
use lytest::logging;
use lytest::run::run_test;
use lytest::store::store_reference;

#[derive(Parser)]
#[command(
    name = "lytest",
    version,
    disable_version_flag = true,
    about = "Layout regression testing with XOR diffs and git integration"
)]
struct Cli {
    /// Print version.
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: Option<bool>,

    /// Configuration file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Store a new reference layout.
    Store(TestArgs),
    /// XOR two layout files.
    Diff(DiffArgs),
    /// Run one XOR test.
    Run(TestArgs),
    /// One time setup for git integration.
    GitConfig(GitConfigArgs),
    /// External diff driver called by git.
    GitDiff(GitDiffArgs),
}

#[derive(Args)]
struct TestArgs {
    /// The test module in which the test resides.
    testfile: PathBuf,
    /// Name of the test.
    testname: String,
}

#[derive(Args)]
struct DiffArgs {
    /// First layout file (reference).
    lyfile1: PathBuf,
    /// Second layout file (test).
    lyfile2: PathBuf,
    /// Tolerance in database units (usually nanometers).
    #[arg(default_value_t = DEFAULT_TOLERANCE)]
    tolerance: u32,
}

#[derive(Args)]
struct GitConfigArgs {
    /// Install in the local git repository instead of globally.
    #[arg(long)]
    local: bool,
}

#[derive(Args)]
struct GitDiffArgs {
    /// Repository path; may start with `-`.
    #[arg(allow_hyphen_values = true)]
    path: String,
    #[arg(allow_hyphen_values = true)]
    old_file: Option<String>,
    old_hex: Option<String>,
    old_mode: Option<String>,
    #[arg(allow_hyphen_values = true)]
    new_file: Option<String>,
    new_hex: Option<String>,
    new_mode: Option<String>,
    /// Rename/copy details git appends for similar files.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    similarity: Vec<String>,
}

impl From<GitDiffArgs> for GitDiffRequest {
    fn from(args: GitDiffArgs) -> Self {
        Self {
            path: args.path,
            old_file: args.old_file,
            old_hex: args.old_hex,
            old_mode: args.old_mode,
            new_file: args.new_file,
            new_hex: args.new_hex,
            new_mode: args.new_mode,
            similarity: args.similarity,
        }
    }
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::FAILURE);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    dispatch(cli.command, &config, &mut out)?;
    out.flush().context("flush stdout")?;
    Ok(())
}

fn dispatch(command: Command, config: &LytestConfig, out: &mut dyn Write) -> Result<()> {
    let engine = CommandDiffEngine::new(config.xor.clone());
    let viewer = CommandViewer::new(config.viewer.clone());
    match command {
        Command::Store(args) => {
            debug!(command = "store", testfile = %args.testfile.display(), "dispatch");
            let harness =
                LayoutHarness::new(config.layouts.clone(), config.tests.clone(), &engine);
            store_reference(
                &mut TestLoader::new(),
                &harness,
                &args.testfile,
                &args.testname,
                out,
            )
        }
        Command::Run(args) => {
            debug!(command = "run", testfile = %args.testfile.display(), "dispatch");
            let harness =
                LayoutHarness::new(config.layouts.clone(), config.tests.clone(), &engine);
            run_test(
                &mut TestLoader::new(),
                &harness,
                &args.testfile,
                &args.testname,
                out,
            )
        }
        Command::Diff(args) => {
            debug!(command = "diff", "dispatch");
            diff_files(
                &engine,
                &viewer,
                &args.lyfile1,
                &args.lyfile2,
                args.tolerance,
                out,
            )?;
            Ok(())
        }
        Command::GitConfig(args) => {
            debug!(command = "git-config", local = args.local, "dispatch");
            let scope = if args.local {
                ConfigScope::Local
            } else {
                ConfigScope::Global
            };
            let cwd = std::env::current_dir().context("resolve current directory")?;
            install_git_driver(&Git::new(cwd), scope, &config.git, &HomeDirs::from_env())?;
            Ok(())
        }
        Command::GitDiff(args) => {
            debug!(command = "git-diff", path = %args.path, "dispatch");
            git_diff(&engine, &viewer, &GitDiffRequest::from(args), out)?;
            Ok(())
        }
    }
}
