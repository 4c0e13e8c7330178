use crate::db::{count_records, get_connection, get_metadata};
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::settings::{load_settings, DB_FILE};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = std::path::PathBuf::from(&settings.data_dir);
    let db_path = data_dir.join(DB_FILE);

    let or_unset = |s: &str| if s.is_empty() { "(not set)".to_string() } else { s.to_string() };
    println!("Agent:      {}", or_unset(&settings.agent_name));
    println!("Brokerage:  {}", or_unset(settings.default_brokerage.label()));
    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());

    if db_path.exists() {
        let size = std::fs::metadata(&db_path)?.len();
        println!("DB size:    {}", format_bytes(size));

        let conn = get_connection(&db_path)?;
        let records = count_records(&conn)?;
        let last_export = get_metadata(&conn, "last_export");

        println!();
        println!("Records:      {records}");
        println!("Last export:  {}", last_export.as_deref().unwrap_or("never"));
    } else {
        println!();
        println!("Database not found. Run `commission init` to set up.");
    }

    Ok(())
}
