use anyhow::Result;
use clap::Args;
use grit_hash::ObjectId;
use grit_ref::RefName;
use grit_repo::signature_from_env;

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct UpdateRefArgs {
    /// Reason recorded in the reflog
    #[arg(short = 'm', value_name = "reason")]
    message: Option<String>,

    /// Reference name
    #[arg(value_name = "ref")]
    refname: String,

    /// New value
    #[arg(value_name = "new-oid")]
    new_value: String,
}

pub fn run(args: &UpdateRefArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;

    let refname = RefName::new(args.refname.as_str())?;
    let new_oid = ObjectId::from_hex(&args.new_value)?;
    let reason = args.message.as_deref().unwrap_or("update-ref");
    let committer = signature_from_env("GIT_COMMITTER");

    repo.update_ref(reason, &refname, new_oid, &committer)?;
    Ok(0)
}
