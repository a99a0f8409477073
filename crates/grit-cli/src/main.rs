mod commands;

use std::path::PathBuf;
use std::process;

use clap::Parser;

use commands::Commands;

#[derive(Parser)]
#[command(name = "grit", about = "A content-addressed version control engine", version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Set the path to the repository's git directory
    #[arg(long = "git-dir", global = true)]
    git_dir: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let code = match commands::run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("fatal: {err:#}");
            128
        }
    };

    process::exit(code);
}
