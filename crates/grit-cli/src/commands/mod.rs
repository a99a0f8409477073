pub mod add;
pub mod commit;
pub mod diff_files;
pub mod hash_object;
pub mod init;
pub mod ls_files;
pub mod show_ref;
pub mod symbolic_ref;
pub mod update_ref;
pub mod write_tree;

use anyhow::Result;
use clap::Subcommand;

use crate::Cli;

#[derive(Subcommand)]
pub enum Commands {
    /// Create an empty repository
    Init(init::InitArgs),
    /// Compute object ID and optionally create a blob from a file
    HashObject(hash_object::HashObjectArgs),
    /// Add file contents to the index
    Add(add::AddArgs),
    /// Show information about files in the index and the working tree
    LsFiles(ls_files::LsFilesArgs),
    /// Create a tree object from the current index
    WriteTree(write_tree::WriteTreeArgs),
    /// Compare files in the working tree and the index
    DiffFiles(diff_files::DiffFilesArgs),
    /// List references in the repository
    ShowRef(show_ref::ShowRefArgs),
    /// Read or modify symbolic refs
    SymbolicRef(symbolic_ref::SymbolicRefArgs),
    /// Update the object name stored in a ref safely
    UpdateRef(update_ref::UpdateRefArgs),
    /// Record changes to the repository
    Commit(commit::CommitArgs),
}

/// Open the repository: an explicit --git-dir wins, otherwise discover
/// upward from the current directory.
pub fn open_repo(cli: &Cli) -> Result<grit_repo::Repository> {
    let repo = match cli.git_dir {
        Some(ref git_dir) => grit_repo::Repository::open(git_dir)?,
        None => grit_repo::Repository::discover(".")?,
    };
    Ok(repo)
}

pub fn run(cli: Cli) -> Result<i32> {
    match &cli.command {
        Commands::Init(args) => init::run(args),
        Commands::HashObject(args) => hash_object::run(args, &cli),
        Commands::Add(args) => add::run(args, &cli),
        Commands::LsFiles(args) => ls_files::run(args, &cli),
        Commands::WriteTree(args) => write_tree::run(args, &cli),
        Commands::DiffFiles(args) => diff_files::run(args, &cli),
        Commands::ShowRef(args) => show_ref::run(args, &cli),
        Commands::SymbolicRef(args) => symbolic_ref::run(args, &cli),
        Commands::UpdateRef(args) => update_ref::run(args, &cli),
        Commands::Commit(args) => commit::run(args, &cli),
    }
}
