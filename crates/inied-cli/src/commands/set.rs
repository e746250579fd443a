//! `inied set`

use clap::Args;

use inied_core::display;
use inied_core::ops::{self, OperationResult, SetRequest};
use inied_core::{EditError, EditResult};

use super::CommonArgs;

/// Arguments for `inied set`
#[derive(Args, Debug)]
pub struct SetArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Item value, ex: '127.0.0.1'
    #[arg(long, allow_hyphen_values = true)]
    pub value: String,

    /// Force creation if section doesn't exist
    #[arg(long)]
    pub force: bool,

    /// Echo the section header and the new item
    #[arg(long)]
    pub print_section: bool,

    /// Create the file if it doesn't exist
    #[arg(long)]
    pub create: bool,

    /// Report the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl SetArgs {
    fn to_request(&self) -> EditResult<SetRequest> {
        let (Some(section), Some(item)) = (&self.common.section, &self.common.item) else {
            return Err(EditError::InvalidParameters(
                "set needs both --section and --item. Try --help".to_string(),
            ));
        };
        Ok(SetRequest {
            section: section.clone(),
            item: item.clone(),
            value: self.value.clone(),
            force_section: self.force,
            create_file: self.create,
        })
    }
}

/// Execute `inied set`
pub fn execute(args: &SetArgs) -> EditResult<()> {
    let path = args.common.target_file()?;
    let request = args.to_request()?;

    let result = match ops::run_set(&path, &request) {
        Ok(result) => result,
        Err(err @ EditError::SectionNotFound { .. }) => {
            eprintln!("Use --force to create the section.");
            return Err(err);
        }
        Err(err) => return Err(err),
    };

    if args.json {
        print!("{}", display::to_json(&result)?);
        return Ok(());
    }
    if args.common.verbose {
        print_commit_notes(&result);
    }
    if args.print_section {
        println!("[{}]", request.section);
        println!("{}{}{}", request.item, args.common.separator, request.value);
    }
    Ok(())
}

/// Verbose `;`-prefixed notes about how the file was written
pub fn print_commit_notes(result: &OperationResult) {
    match &result.commit {
        Some(commit) => {
            println!("; TEMPORARY FILENAME = {}", commit.temp_path.display());
            if let Some(backup) = &commit.leftover_backup {
                println!("; Backup left behind: {}", backup.display());
            }
        }
        None => println!("; No changes, {} not rewritten", result.path.display()),
    }
}
