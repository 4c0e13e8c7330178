use std::fs::File;

use crate::db::{get_connection, insert_record};
use crate::error::Result;
use crate::exchange::read_records;
use crate::settings::db_path;

pub fn run(file: &str) -> Result<()> {
    let records = read_records(File::open(file)?)?;
    let mut conn = get_connection(&db_path())?;
    let tx = conn.transaction()?;
    for record in &records {
        insert_record(&tx, record)?;
    }
    tx.commit()?;
    println!("Imported {} records", records.len());
    Ok(())
}
