use crate::cli::{apply_edits, read_record, view};
use crate::db::{delete_record, get_connection, get_record, insert_record, list_records, update_record};
use crate::error::Result;
use crate::resolver::load_for_edit;
use crate::settings::db_path;
use crate::summary::summarize;

pub fn add(file: &str) -> Result<()> {
    let record = read_record(file)?;
    let conn = get_connection(&db_path())?;
    let id = insert_record(&conn, &record)?;
    println!("Added record {id}");
    Ok(())
}

pub fn show(id: i64) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let stored = get_record(&conn, id)?;
    println!(
        "Record {id} (created {}, updated {})",
        stored.created_at, stored.updated_at
    );
    println!("{}", view::format_breakdown(&stored.record));
    Ok(())
}

/// A stored record always opens as a clean session, so earlier pins are
/// plain values that the next input edit recomputes.
pub fn update(id: i64, edits: &[String]) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let stored = get_record(&conn, id)?;
    let record = apply_edits(&load_for_edit(&stored.record), edits)?;
    update_record(&conn, id, &record)?;
    println!("Updated record {id}");
    println!("{}", view::format_breakdown(&record));
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let conn = get_connection(&db_path())?;
    delete_record(&conn, id)?;
    println!("Deleted record {id}");
    Ok(())
}

pub fn list(brokerage: Option<&str>) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let rows = list_records(&conn, brokerage)?;
    if rows.is_empty() {
        println!("No records.");
        return Ok(());
    }
    let records: Vec<_> = rows.iter().map(|s| s.record.clone()).collect();
    let totals = summarize(&records).overall;
    println!("{}", view::format_list(&rows, &totals));
    Ok(())
}
