use crate::cli::view;
use crate::db::{get_connection, list_records};
use crate::error::Result;
use crate::settings::{db_path, load_settings};
use crate::summary::summarize;

pub fn run() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let records: Vec<_> = list_records(&conn, None)?
        .into_iter()
        .map(|s| s.record)
        .collect();

    let agent = load_settings().agent_name;
    if !agent.is_empty() {
        println!("{agent}");
    }
    println!("{}", view::format_summary(&summarize(&records)));
    Ok(())
}
