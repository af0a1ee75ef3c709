// Copyright 2025 Stairwell, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{
    ffi::OsString,
    io::IsTerminal,
    num::NonZeroUsize,
    path::PathBuf,
    process::{self, Command},
};

use anyhow::{Context, Result};
use clap::Parser;
use disappearing_dir::Builder;
use tracing_subscriber::EnvFilter;

const DEFAULT_PREFIX: &str = env!("DISAPPEAR_DEFAULT_PREFIX");

/// Run a command inside a scratch directory that is removed when it exits
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Directory in which to create the scratch directory [default: system temp dir]
    #[arg(env = "DISAPPEAR_BASE", long)]
    base: Option<PathBuf>,

    /// Scratch directory name prefix
    #[arg(env = "DISAPPEAR_PREFIX", default_value_t = DEFAULT_PREFIX.into(), long)]
    prefix: String,

    /// Give up after this many name collisions
    #[arg(long)]
    max_attempts: Option<NonZeroUsize>,

    /// Leave the directory behind and print its path
    #[arg(short, long)]
    keep: bool,

    /// Command to run, with the scratch directory as its working directory
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<OsString>,
}

fn main() {
    init_logging();
    match run(Args::parse()) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("disappear: {:#}", e);
            process::exit(125);
        }
    }
}

// The directory must be dropped before `process::exit`, which skips destructors.
fn run(args: Args) -> Result<i32> {
    let mut builder = Builder::new().prefix(args.prefix);
    if let Some(max) = args.max_attempts {
        builder = builder.max_attempts(max);
    }
    let dir = match &args.base {
        Some(base) => builder.create_in(base),
        None => builder.create_in_temp(),
    }
    .context("failed to create scratch directory")?;
    tracing::info!("scratch directory {}", dir.path().display());

    let (program, rest) = args.command.split_first().context("no command given")?;
    let status = Command::new(program)
        .args(rest)
        .current_dir(&dir)
        .env("DISAPPEAR_DIR", dir.path())
        .status()
        .with_context(|| format!("failed to spawn {}", program.to_string_lossy()))?;

    if args.keep {
        println!("{}", dir.keep().display());
    }
    match status.code() {
        Some(code) => Ok(code),
        None => anyhow::bail!("{}: {}", program.to_string_lossy(), status),
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env("DISAPPEAR_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

#[cfg(all(test, unix))]
mod tests {
    use std::{fs, path::Path};

    use super::*;

    fn args(base: &Path, rest: &[&str]) -> Args {
        let mut argv = vec!["disappear", "--base", base.to_str().unwrap()];
        argv.extend_from_slice(rest);
        Args::try_parse_from(argv).unwrap()
    }

    fn entries(base: &Path) -> Vec<PathBuf> {
        fs::read_dir(base)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect()
    }

    #[test]
    fn exits_with_child_code_and_cleans_up() {
        let base = tempfile::tempdir().unwrap();
        let script = ["--max-attempts", "3", "sh", "-c", "touch f; exit 7"];
        let code = run(args(base.path(), &script)).unwrap();
        assert_eq!(code, 7);
        assert!(entries(base.path()).is_empty());
    }

    #[test]
    fn child_runs_inside_exported_directory() {
        let base = tempfile::tempdir().unwrap();
        let script = r#"test "$DISAPPEAR_DIR" = "$(pwd -P)" && touch marker"#;
        let code = run(args(base.path(), &["--keep", "sh", "-c", script])).unwrap();
        assert_eq!(code, 0);

        let kept = entries(base.path());
        assert_eq!(kept.len(), 1);
        assert!(kept[0].join("marker").is_file());
    }

    #[test]
    fn keep_leaves_directory_behind() {
        let base = tempfile::tempdir().unwrap();
        let code = run(args(base.path(), &["-k", "--prefix", "kept.", "true"])).unwrap();
        assert_eq!(code, 0);

        let kept = entries(base.path());
        assert_eq!(kept.len(), 1);
        assert!(kept[0].is_dir());
        assert!(kept[0]
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("kept."));
    }

    #[test]
    fn spawn_failure_removes_directory() {
        let base = tempfile::tempdir().unwrap();
        let err = run(args(base.path(), &["./no-such-program-here"])).unwrap_err();
        assert!(err.to_string().contains("failed to spawn"), "{err:#}");
        assert!(entries(base.path()).is_empty());
    }

    #[test]
    fn missing_base_is_an_error() {
        let base = tempfile::tempdir().unwrap();
        let err = run(args(&base.path().join("missing"), &["true"])).unwrap_err();
        assert!(
            err.to_string().contains("failed to create scratch directory"),
            "{err:#}"
        );
    }
}
