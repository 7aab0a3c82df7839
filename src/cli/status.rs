use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::{db_path, load_settings};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let db_path = db_path();

    println!("Data dir:     {}", settings.data_dir);
    println!("Database:     {}", db_path.display());
    println!("Denomination: {}", settings.default_denomination);
    println!("Similarity:   {:.2}", settings.similarity_threshold);

    if db_path.exists() {
        let conn = get_connection(&db_path)?;
        init_db(&conn)?;
        let ledgers: i64 = conn.query_row("SELECT count(*) FROM ledgers", [], |r| r.get(0))?;
        let players: i64 = conn.query_row(
            "SELECT count(DISTINCT lower(name)) FROM ledger_players",
            [],
            |r| r.get(0),
        )?;

        println!();
        println!("Ledgers:      {ledgers}");
        println!("Players:      {players}");
    } else {
        println!();
        println!("Database not found. Run `homegame init` to set up.");
    }

    Ok(())
}
