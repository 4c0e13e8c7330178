mod calculator;
mod cli;
mod db;
mod error;
mod exchange;
mod fmt;
mod logging;
mod models;
mod resolver;
mod settings;
mod summary;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init {
            data_dir,
            agent,
            default_brokerage,
        } => cli::init::run(data_dir, agent, default_brokerage),
        Commands::New {
            brokerage,
            transaction_type,
            output,
        } => cli::new::run(brokerage, transaction_type, output),
        Commands::Compute { file, json } => cli::compute::run(&file, json),
        Commands::Edit {
            file,
            set,
            output,
            json,
        } => cli::edit::run(&file, &set, output.as_deref(), json),
        Commands::Add { file } => cli::ledger::add(&file),
        Commands::Show { id } => cli::ledger::show(id),
        Commands::Update { id, set } => cli::ledger::update(id, &set),
        Commands::Delete { id } => cli::ledger::delete(id),
        Commands::List { brokerage } => cli::ledger::list(brokerage.as_deref()),
        Commands::Summary => cli::summary::run(),
        Commands::Export { output } => cli::export::run(output),
        Commands::Import { file } => cli::import::run(&file),
        Commands::Backup { output } => cli::backup::run(output),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
