use std::io::Read;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use grit_hash::Hasher;
use grit_object::ObjectType;

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct HashObjectArgs {
    /// Write the object into the object database
    #[arg(short = 'w')]
    write: bool,

    /// Read the object from standard input
    #[arg(long)]
    stdin: bool,

    /// Files to hash
    #[arg(value_name = "file")]
    files: Vec<PathBuf>,
}

pub fn run(args: &HashObjectArgs, cli: &Cli) -> Result<i32> {
    // The object database is only needed when writing.
    let repo = if args.write { Some(open_repo(cli)?) } else { None };

    if args.stdin {
        let mut data = Vec::new();
        std::io::stdin().lock().read_to_end(&mut data)?;
        let oid = match &repo {
            Some(repo) => repo.odb().write_raw(ObjectType::Blob, &data)?.0,
            None => Hasher::hash_object("blob", &data)?,
        };
        println!("{}", oid.to_hex());
    }

    for file in &args.files {
        let oid = match &repo {
            Some(repo) => {
                let data = std::fs::read(file)?;
                repo.odb().write_raw(ObjectType::Blob, &data)?.0
            }
            None => Hasher::hash_file("blob", file)?.0,
        };
        println!("{}", oid.to_hex());
    }

    Ok(0)
}
