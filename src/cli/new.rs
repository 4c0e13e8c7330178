use crate::cli::write_record;
use crate::error::Result;
use crate::models::{Brokerage, TransactionRecord, TransactionType};
use crate::settings::load_settings;

pub fn run(
    brokerage: Option<String>,
    transaction_type: Option<String>,
    output: Option<String>,
) -> Result<()> {
    let mut record = TransactionRecord::blank();
    record.brokerage = match brokerage {
        Some(b) => Brokerage::parse(&b),
        None => load_settings().default_brokerage,
    };
    if let Some(t) = transaction_type {
        record.transaction_type = TransactionType::parse(&t);
    }

    match output {
        Some(path) => {
            write_record(&path, &record)?;
            println!("Wrote {path}");
        }
        None => println!("{}", serde_json::to_string_pretty(&record)?),
    }
    Ok(())
}
