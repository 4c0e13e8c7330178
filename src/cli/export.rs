use std::fs::File;
use std::path::PathBuf;

use crate::db::{get_connection, list_records, set_metadata};
use crate::error::Result;
use crate::exchange::write_records;
use crate::settings::{db_path, get_data_dir};

fn default_path() -> PathBuf {
    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    get_data_dir()
        .join("exports")
        .join(format!("transactions-{date}.csv"))
}

pub fn run(output: Option<String>) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let records: Vec<_> = list_records(&conn, None)?
        .into_iter()
        .map(|s| s.record)
        .collect();

    let path = output.map(PathBuf::from).unwrap_or_else(default_path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    write_records(File::create(&path)?, &records)?;
    set_metadata(&conn, "last_export", &chrono::Local::now().to_rfc3339())?;

    println!("Wrote {} ({} records)", path.display(), records.len());
    Ok(())
}
