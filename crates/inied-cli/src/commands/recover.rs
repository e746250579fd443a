//! `inied recover`

use clap::Args;
use std::path::PathBuf;

use inied_core::ops;
use inied_core::EditResult;

use super::single_file;

/// Arguments for `inied recover`
#[derive(Args, Debug)]
pub struct RecoverArgs {
    /// File whose interrupted commit should be undone, ex: 'config.ini'
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Replace the file even if it exists
    #[arg(long)]
    pub force: bool,

    /// Output more information
    #[arg(short, long)]
    pub verbose: bool,
}

/// Execute `inied recover`
pub fn execute(args: &RecoverArgs) -> EditResult<()> {
    let path = single_file(&args.files)?;
    let result = ops::run_recover(&path, args.force)?;
    if let Some(backup) = &result.restored_from {
        println!("Restored {} from {}", path.display(), backup.display());
    }
    Ok(())
}
