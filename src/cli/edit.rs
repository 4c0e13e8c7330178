use crate::cli::{apply_edits, read_record, view, write_record};
use crate::error::Result;
use crate::resolver::load_for_edit;

pub fn run(file: &str, edits: &[String], output: Option<&str>, json: bool) -> Result<()> {
    let record = apply_edits(&load_for_edit(&read_record(file)?), edits)?;

    if let Some(path) = output {
        write_record(path, &record)?;
        eprintln!("Wrote {path}");
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("{}", view::format_breakdown(&record));
    }
    Ok(())
}
