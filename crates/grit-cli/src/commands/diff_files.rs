use std::io::{self, Write};

use anyhow::Result;
use clap::Args;
use grit_diff::{diff_files, format_raw};
use grit_index::IndexPath;

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct DiffFilesArgs {
    /// Paths to limit the diff to
    #[arg(value_name = "path")]
    paths: Vec<String>,
}

pub fn run(args: &DiffFilesArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;

    let paths = args
        .paths
        .iter()
        .map(|p| IndexPath::new(p.as_str()))
        .collect::<Result<Vec<_>, _>>()?;

    let diffs = diff_files(&repo, &paths)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write!(out, "{}", format_raw(&diffs))?;

    Ok(0)
}
