use std::io::{self, Write};

use anyhow::Result;
use clap::Args;
use grit_repo::{RepoError, ShowRefOptions, ShownRef};

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct ShowRefArgs {
    /// Show the HEAD reference, even if it would be filtered out
    #[arg(long)]
    head: bool,

    /// Only show heads (refs/heads/)
    #[arg(long)]
    heads: bool,

    /// Only show tags (refs/tags/)
    #[arg(long)]
    tags: bool,

    /// Dereference tags into object IDs
    #[arg(short = 'd', long)]
    dereference: bool,

    /// Enable stricter reference checking: patterns must name existing refs
    #[arg(long)]
    verify: bool,

    /// Do not print results to stdout (useful with --verify)
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Only show the OID, not the ref name
    #[arg(short = 's', long = "sha1-only")]
    sha1_only: bool,

    /// Abbreviate object names to the given number of hex digits
    #[arg(long, value_name = "n", num_args = 0..=1, require_equals = true, default_missing_value = "7")]
    abbrev: Option<usize>,

    /// Do not print refs whose name begins with this prefix
    #[arg(long = "exclude-existing", value_name = "prefix")]
    exclude_existing: Option<String>,

    /// Patterns to match refs against
    #[arg(value_name = "pattern")]
    patterns: Vec<String>,
}

pub fn run(args: &ShowRefArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;

    let opts = ShowRefOptions {
        include_head: args.head,
        heads: args.heads,
        tags: args.tags,
        dereference: args.dereference,
        verify: args.verify,
        abbrev: args.abbrev.unwrap_or(0),
        quiet: args.quiet,
        sha1_only: args.sha1_only,
        exclude_existing: args.exclude_existing.clone(),
    };

    let shown = match repo.show_refs(&opts, &args.patterns) {
        Ok(shown) => shown,
        Err(RepoError::VerifyFailed(pattern)) => {
            if !args.quiet {
                eprintln!("fatal: '{pattern}' - not a valid ref");
            }
            return Ok(128);
        }
        Err(e) => return Err(e.into()),
    };

    if !opts.quiet {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for entry in &shown {
            print_ref(&mut out, &opts, entry)?;
        }
    }

    // The exit code reflects presence even when output is suppressed.
    Ok(if shown.is_empty() { 1 } else { 0 })
}

fn print_ref(out: &mut impl Write, opts: &ShowRefOptions, entry: &ShownRef) -> Result<()> {
    let mut hex = entry.oid.to_hex();
    if opts.abbrev > 0 && opts.abbrev < hex.len() {
        hex.truncate(opts.abbrev);
    }

    if opts.sha1_only {
        writeln!(out, "{hex}")?;
    } else {
        writeln!(out, "{hex} {}", entry.name)?;
    }
    Ok(())
}
