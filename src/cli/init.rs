use std::path::PathBuf;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::models::Denomination;
use crate::settings::{load_settings, save_settings, shellexpand_path};

pub fn run(data_dir: Option<String>, denomination: Option<String>) -> Result<()> {
    let mut settings = load_settings();

    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    if let Some(d) = denomination {
        settings.default_denomination = d.parse::<Denomination>()?;
    }

    save_settings(&settings)?;

    let resolved = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&resolved)?;

    let conn = get_connection(&resolved.join("homegame.db"))?;
    init_db(&conn)?;

    println!("Initialized homegame at {}", resolved.display());
    println!("Default denomination: {}", settings.default_denomination);
    Ok(())
}
