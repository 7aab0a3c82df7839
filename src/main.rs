mod aliases;
mod cli;
mod db;
mod error;
mod fmt;
mod importer;
mod ledger;
mod models;
mod reports;
mod settings;
mod settlement;

use clap::Parser;

use cli::{Cli, Commands, LedgersCommands};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init {
            data_dir,
            denomination,
        } => cli::init::run(data_dir, denomination),
        Commands::Import(args) => cli::import::run(args),
        Commands::Ledgers { command } => match command {
            LedgersCommands::List => cli::ledgers::list(),
            LedgersCommands::Show { id, json } => cli::ledgers::show(id, json),
            LedgersCommands::Rename { id, name } => cli::ledgers::rename(id, &name),
            LedgersCommands::Delete { id } => cli::ledgers::delete(id),
        },
        Commands::Bankroll { player } => cli::bankroll::run(player),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
