use std::path::PathBuf;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::models::Brokerage;
use crate::settings::{
    load_settings, save_settings, settings_file_exists, shellexpand_path, DB_FILE,
};

pub fn run(
    data_dir: Option<String>,
    agent: Option<String>,
    default_brokerage: Option<String>,
) -> Result<()> {
    let mut settings = load_settings();

    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    } else if !settings_file_exists() {
        // First run: offer the default location
        println!("Data directory [{}]: ", settings.data_dir);
        let mut input = String::new();
        std::io::stdin().read_line(&mut input).ok();
        let chosen = input.trim();
        if !chosen.is_empty() {
            settings.data_dir = shellexpand_path(chosen);
        }
    }
    if let Some(name) = agent {
        settings.agent_name = name;
    }
    if let Some(b) = default_brokerage {
        settings.default_brokerage = Brokerage::parse(&b);
    }

    save_settings(&settings)?;

    let resolved = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&resolved)?;
    std::fs::create_dir_all(resolved.join("exports"))?;

    let conn = get_connection(&resolved.join(DB_FILE))?;
    init_db(&conn)?;

    tracing::info!(data_dir = %resolved.display(), "initialized ledger");
    println!("Initialized commission ledger at {}", resolved.display());
    Ok(())
}
