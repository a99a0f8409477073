use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use grit_repo::Repository;

#[derive(Args)]
pub struct InitArgs {
    /// Where to create the repository (default: current directory)
    #[arg(value_name = "directory")]
    directory: Option<PathBuf>,
}

pub fn run(args: &InitArgs) -> Result<i32> {
    let target = args
        .directory
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&target)?;

    let repo = Repository::init(&target)?;
    println!(
        "Initialized empty repository in {}",
        repo.git_dir().display()
    );
    Ok(0)
}
