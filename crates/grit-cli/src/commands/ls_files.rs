use std::io::{self, Write};

use anyhow::Result;
use clap::Args;
use grit_index::{ls_files, IndexPath, LsFilesOptions};

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct LsFilesArgs {
    /// Show tracked files (default when no other filter is given)
    #[arg(short = 'c', long)]
    cached: bool,

    /// Show deleted files
    #[arg(short = 'd', long)]
    deleted: bool,

    /// Show modified files
    #[arg(short = 'm', long)]
    modified: bool,

    /// Show untracked (other) files
    #[arg(short = 'o', long)]
    others: bool,

    /// Show staged metadata (mode, object id, path)
    #[arg(short = 's', long)]
    stage: bool,

    /// Paths to limit the listing to
    #[arg(value_name = "path")]
    paths: Vec<String>,
}

pub fn run(args: &LsFilesArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;
    let work_tree = repo.require_work_tree()?.to_path_buf();
    let index = repo.index()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let paths = args
        .paths
        .iter()
        .map(|p| IndexPath::new(p.as_str()))
        .collect::<Result<Vec<_>, _>>()?;

    let opts = LsFilesOptions {
        cached: args.cached
            || args.stage
            || (!args.deleted && !args.modified && !args.others),
        deleted: args.deleted,
        modified: args.modified,
        others: args.others,
    };

    let files = ls_files(&index, &work_tree, opts, &paths)?;
    for file in &files {
        match (&file.entry, args.stage) {
            (Some(entry), true) => writeln!(
                out,
                "{:06o} {} 0\t{}",
                entry.mode.raw(),
                entry.oid.to_hex(),
                file.path
            )?,
            _ => writeln!(out, "{}", file.path)?,
        }
    }

    Ok(0)
}
