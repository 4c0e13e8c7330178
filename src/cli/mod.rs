pub mod backup;
pub mod compute;
pub mod edit;
pub mod export;
pub mod import;
pub mod init;
pub mod ledger;
pub mod new;
pub mod status;
pub mod summary;
pub mod view;

use std::io::Read;
use std::path::Path;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::error::{CommissionError, Result};
use crate::models::{Field, TransactionRecord};
use crate::resolver::on_field_change;

/// Parse a `key=value` edit. The key may be camelCase or snake_case.
pub(crate) fn parse_edit(raw: &str) -> Result<(Field, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| CommissionError::InvalidEdit(raw.to_string()))?;
    let field = Field::from_key(key).ok_or_else(|| CommissionError::UnknownField(key.trim().to_string()))?;
    Ok((field, value.to_string()))
}

/// Parse every edit up front so a typo aborts before anything is applied.
pub(crate) fn apply_edits(record: &TransactionRecord, edits: &[String]) -> Result<TransactionRecord> {
    let parsed = edits
        .iter()
        .map(|e| parse_edit(e))
        .collect::<Result<Vec<_>>>()?;
    let mut current = record.clone();
    for (field, value) in parsed {
        current = on_field_change(&current, field, &value);
        info!(field = field.key(), value = %value, "applied edit");
    }
    if !current.overrides.is_empty() {
        let pinned: Vec<_> = current.overrides.iter().map(|f| f.key()).collect();
        info!(pinned = ?pinned, "session overrides");
    }
    Ok(current)
}

/// Read a record as JSON from a file, or from stdin when `path` is `-`.
pub(crate) fn read_record(path: &str) -> Result<TransactionRecord> {
    let content = if path == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(Path::new(path))?
    };
    Ok(serde_json::from_str(&content)?)
}

pub(crate) fn write_record(path: &str, record: &TransactionRecord) -> Result<()> {
    let json = serde_json::to_string_pretty(record)?;
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

#[derive(Parser)]
#[command(name = "commission", about = "Commission tracking CLI for real-estate agents.")]
pub struct Cli {
    /// Log engine decisions to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up: choose a data directory and initialize the ledger.
    Init {
        /// Path for ledger data (default: ~/Documents/commission)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Agent name shown on reports
        #[arg(long)]
        agent: Option<String>,
        /// Brokerage pre-selected on new records: KW, BDH or any name
        #[arg(long = "default-brokerage")]
        default_brokerage: Option<String>,
    },
    /// Print a blank record to fill in.
    New {
        /// Brokerage (default: the configured default brokerage)
        #[arg(long)]
        brokerage: Option<String>,
        /// Transaction type: Sale, ReferralReceived, ReferralPaid
        #[arg(long = "type")]
        transaction_type: Option<String>,
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<String>,
    },
    /// Compute every derived field of a record file.
    Compute {
        /// Record JSON file, or - for stdin
        file: String,
        /// Print the computed record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Apply field edits to a record file, in order.
    Edit {
        /// Record JSON file, or - for stdin
        file: String,
        /// Edit to apply, e.g. --set closedPrice=650000 --set royalty=1500
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
        /// Write the edited record to this file
        #[arg(long)]
        output: Option<String>,
        /// Print the edited record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Store a record file in the ledger as-is.
    Add {
        /// Record JSON file, or - for stdin
        file: String,
    },
    /// Show a stored record.
    Show {
        /// Record ID (shown in `commission list`)
        id: i64,
    },
    /// Edit a stored record and save it.
    Update {
        /// Record ID (shown in `commission list`)
        id: i64,
        /// Edit to apply, e.g. --set commissionPct=2.75
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },
    /// Delete a stored record.
    Delete {
        /// Record ID (shown in `commission list`)
        id: i64,
    },
    /// List stored records.
    List {
        /// Only records for this brokerage
        #[arg(long)]
        brokerage: Option<String>,
    },
    /// Totals by brokerage and transaction type.
    Summary,
    /// Export the ledger to CSV.
    Export {
        /// Output path (default: <data_dir>/exports/transactions-YYYY-MM-DD.csv)
        #[arg(long)]
        output: Option<String>,
    },
    /// Import records from a CSV written by `export`.
    Import {
        /// CSV file path
        file: String,
    },
    /// Back up the ledger database.
    Backup {
        /// Output path (default: <data_dir>/backups/commission-YYYYMMDD-HHMMSS.db)
        #[arg(long)]
        output: Option<String>,
    },
    /// Show settings, ledger location and record counts.
    Status,
}
