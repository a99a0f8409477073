use std::path::PathBuf;

use anyhow::Result;
use bstr::BString;
use clap::Args;
use grit_repo::signature_from_env;

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct CommitArgs {
    /// Use the given message (repeatable)
    #[arg(short = 'm', value_name = "message")]
    messages: Vec<String>,

    /// Take the message from the given file (repeatable)
    #[arg(short = 'F', value_name = "file")]
    files: Vec<PathBuf>,
}

pub fn run(args: &CommitArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;

    let fragments = gather_fragments(args)?;

    let author = signature_from_env("GIT_AUTHOR");
    let committer = signature_from_env("GIT_COMMITTER");

    let commit_id = repo.commit(&fragments, author, committer)?;
    println!("{}", commit_id.to_hex());
    Ok(0)
}

/// Collect `-m` and `-F` fragments in their command-line order.
///
/// Clap groups repeated options per flag, losing the relative order of
/// `-m`/`-F` interleavings, so the raw argument list decides which queue
/// each fragment is drawn from.
fn gather_fragments(args: &CommitArgs) -> Result<Vec<BString>> {
    let mut messages = args.messages.iter();
    let mut files = args.files.iter();
    let mut fragments = Vec::new();

    for raw in std::env::args() {
        match raw.as_str() {
            "-m" => {
                if let Some(msg) = messages.next() {
                    fragments.push(BString::from(msg.as_str()));
                }
            }
            "-F" => {
                if let Some(file) = files.next() {
                    fragments.push(BString::from(std::fs::read(file)?));
                }
            }
            _ => {}
        }
    }

    // Squashed forms (-mMSG) never hit the raw scan; append any leftovers
    // in per-flag order.
    for msg in messages {
        fragments.push(BString::from(msg.as_str()));
    }
    for file in files {
        fragments.push(BString::from(std::fs::read(file)?));
    }

    Ok(fragments)
}
