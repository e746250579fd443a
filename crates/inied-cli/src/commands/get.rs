//! `inied get`

use clap::Args;

use inied_core::ops::{self, GetRequest};
use inied_core::EditResult;

use super::CommonArgs;

/// Arguments for `inied get`
#[derive(Args, Debug)]
pub struct GetArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Get section names
    #[arg(long)]
    pub get_sections: bool,

    /// Get item names only
    #[arg(long)]
    pub get_item_names: bool,

    /// Get value only (needs --section and --item)
    #[arg(long)]
    pub get_value: bool,

    /// Print section header, ex: '[defaults]'
    #[arg(long)]
    pub print_section: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl GetArgs {
    fn to_request(&self) -> GetRequest {
        GetRequest {
            section: self.common.section.clone(),
            item: self.common.item.clone(),
            sections_only: self.get_sections,
            names_only: self.get_item_names,
            value_only: self.get_value,
            print_section: self.print_section,
            separator: self.common.separator.clone(),
            json: self.json,
        }
    }
}

/// Execute `inied get`
pub fn execute(args: &GetArgs) -> EditResult<()> {
    let path = args.common.target_file()?;
    let output = ops::run_get(&path, &args.to_request())?;
    print!("{output}");
    Ok(())
}
