use std::path::PathBuf;

use crate::db::{backup_ledger, get_connection};
use crate::error::{CommissionError, Result};
use crate::fmt::format_bytes;
use crate::settings::{get_data_dir, DB_FILE};

fn default_path(data_dir: &std::path::Path) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    data_dir.join("backups").join(format!("commission-{stamp}.db"))
}

pub fn run(output: Option<String>) -> Result<()> {
    let data_dir = get_data_dir();
    let ledger = data_dir.join(DB_FILE);
    if !ledger.exists() {
        return Err(CommissionError::LedgerNotFound(ledger.display().to_string()));
    }

    let dest = output.map(PathBuf::from).unwrap_or_else(|| default_path(&data_dir));
    if dest.exists() {
        return Err(CommissionError::Io(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("{} already exists", dest.display()),
        )));
    }
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let records = backup_ledger(&get_connection(&ledger)?, &dest)?;
    tracing::info!(dest = %dest.display(), records, "ledger backed up");

    let size = std::fs::metadata(&dest)?.len();
    println!("Backed up {records} records to {}", dest.display());
    println!("Size: {}", format_bytes(size));
    Ok(())
}
