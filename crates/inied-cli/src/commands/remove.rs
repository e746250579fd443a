//! `inied remove`

use clap::Args;

use inied_core::display;
use inied_core::ops::{self, RemoveRequest};
use inied_core::{EditResult, Removal};

use super::set::print_commit_notes;
use super::CommonArgs;

/// Arguments for `inied remove`
#[derive(Args, Debug)]
pub struct RemoveArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Report the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute `inied remove`
///
/// With both --section and --item only the item goes; with --section alone
/// the whole section goes. Missing targets are not errors.
pub fn execute(args: &RemoveArgs) -> EditResult<()> {
    let path = args.common.target_file()?;
    let request = RemoveRequest {
        section: args.common.section.clone(),
        item: args.common.item.clone(),
    };
    let result = ops::run_remove(&path, &request)?;

    if args.json {
        print!("{}", display::to_json(&result)?);
    } else if args.common.verbose {
        match &result.removal {
            Some(Removal::Item { section, item }) => {
                println!("; Removed item '{item}' from section '{section}'");
            }
            Some(Removal::Section(section)) => println!("; Removed section '{section}'"),
            Some(Removal::Nothing) | None => println!("; Nothing to remove"),
        }
        print_commit_notes(&result);
    }
    Ok(())
}
