use anyhow::Result;
use clap::Args;
use grit_index::write_tree;

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct WriteTreeArgs {}

pub fn run(_args: &WriteTreeArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;
    let index = repo.index()?;
    let tree_id = write_tree(&index, repo.odb())?;
    println!("{}", tree_id.to_hex());
    Ok(0)
}
