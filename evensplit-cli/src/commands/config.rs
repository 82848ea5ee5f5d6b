//! Config command - show or update settings

use anyhow::{Context, Result};
use colored::Colorize;

use evensplit_core::config::{Config, SETTINGS_FILENAME};

use super::get_data_dir;
use crate::output;

pub fn run(currency_symbol: Option<String>, json: bool) -> Result<()> {
    let data_dir = get_data_dir()?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

    let mut config = Config::load(&data_dir)?;

    if let Some(symbol) = currency_symbol {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            anyhow::bail!("Currency symbol cannot be empty");
        }
        config.currency_symbol = symbol.to_string();
        config.save(&data_dir)?;
        if !json {
            output::success(&format!("Currency symbol set to {}", config.currency_symbol));
        }
    }

    if json {
        return output::json(&config);
    }

    println!("{}", "Settings".bold());
    let mut table = output::create_table();
    table.add_row(vec!["Data directory".to_string(), data_dir.display().to_string()]);
    table.add_row(vec![
        "Settings file".to_string(),
        data_dir.join(SETTINGS_FILENAME).display().to_string(),
    ]);
    table.add_row(vec!["Database file".to_string(), config.database_file.clone()]);
    table.add_row(vec!["Currency symbol".to_string(), config.currency_symbol.clone()]);
    println!("{}", table);

    Ok(())
}
