use crate::cli::{read_record, view};
use crate::error::Result;
use crate::resolver::{load_for_edit, recompute};

pub fn run(file: &str, json: bool) -> Result<()> {
    let record = recompute(&load_for_edit(&read_record(file)?));
    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("{}", view::format_breakdown(&record));
    }
    Ok(())
}
