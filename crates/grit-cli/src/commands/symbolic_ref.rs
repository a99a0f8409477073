use std::io::{self, Write};

use anyhow::Result;
use bstr::ByteSlice;
use clap::Args;
use grit_ref::RefName;

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct SymbolicRefArgs {
    /// Suppress the error message when the ref is not symbolic
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Shorten the ref output (e.g. `master` for `refs/heads/master`)
    #[arg(long)]
    short: bool,

    /// Name of the symbolic ref (e.g. HEAD)
    name: String,

    /// Target ref to set; omit to read the current target
    target: Option<String>,
}

pub fn run(args: &SymbolicRefArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;
    let name = RefName::new(args.name.as_str())?;

    if let Some(ref target_str) = args.target {
        let target = RefName::new(target_str.as_str())?;
        repo.set_symbolic_ref(&name, &target)?;
        return Ok(0);
    }

    match repo.symbolic_ref(&name)? {
        Some(target) => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            if args.short {
                writeln!(out, "{}", target.short_name().to_str_lossy())?;
            } else {
                writeln!(out, "{}", target)?;
            }
            Ok(0)
        }
        None => {
            if !args.quiet {
                eprintln!("fatal: ref {} is not a symbolic ref", args.name);
            }
            Ok(1)
        }
    }
}
