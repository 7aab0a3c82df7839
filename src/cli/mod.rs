pub mod bankroll;
pub mod import;
pub mod init;
pub mod ledgers;
pub mod status;

use clap::{Args, Parser, Subcommand};
use rusqlite::Connection;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::{db_path, get_data_dir};

/// Open the ledger database, creating the data directory and schema on first use.
pub(crate) fn open_db() -> Result<Connection> {
    std::fs::create_dir_all(get_data_dir())?;
    let conn = get_connection(&db_path())?;
    init_db(&conn)?;
    Ok(conn)
}

#[derive(Parser)]
#[command(name = "homegame", about = "Settle up home poker games and track bankrolls.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for homegame data (default: ~/Documents/homegame)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Default denomination for imports: cents or dollars
        #[arg(long)]
        denomination: Option<String>,
    },
    /// Import a session CSV, reconcile aliases and compute settle-up payments.
    Import(ImportArgs),
    /// Manage saved ledgers.
    Ledgers {
        #[command(subcommand)]
        command: LedgersCommands,
    },
    /// Bankroll performance across all saved ledgers.
    Bankroll {
        /// Show session-by-session history for one player
        #[arg(long)]
        player: Option<String>,
    },
    /// Show settings and database counts.
    Status,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Path to the session CSV export
    pub file: String,
    /// Ledger name (default: file name)
    #[arg(long)]
    pub name: Option<String>,
    /// Session date: YYYY-MM-DD (default: today)
    #[arg(long)]
    pub date: Option<String>,
    /// Units of the CSV money columns: cents or dollars
    #[arg(long)]
    pub denomination: Option<String>,
    /// Grouping edit, applied in order: rename:IDX:NAME, split:IDX:NICK, merge:SRC:DST
    #[arg(long = "edit")]
    pub edits: Vec<String>,
    /// Save even if net positions do not sum to zero
    #[arg(long = "allow-unbalanced")]
    pub allow_unbalanced: bool,
    /// Persist the ledger (otherwise only preview it)
    #[arg(long)]
    pub save: bool,
}

#[derive(Subcommand)]
pub enum LedgersCommands {
    /// List saved ledgers, newest first.
    List,
    /// Show one ledger's players and payments.
    Show {
        id: i64,
        /// Print the ledger document as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rename a ledger.
    Rename { id: i64, name: String },
    /// Delete a ledger.
    Delete { id: i64 },
}
