use anyhow::Result;
use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::config::{Config, VALID_KEYS};

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    let config = Config::load_or_default();
    println!("{} {}", "Config file:".bold(), path.display());
    if !path.exists() {
        println!("{}", "(not created yet, showing defaults)".dimmed());
    }
    println!();
    let yaml = serde_yaml::to_string(&config)?;
    if config.defaults.is_none() {
        println!("{}", "# no values set".dimmed());
    } else {
        print!("{yaml}");
    }
    println!();
    println!("{} {}", "Keys:".bold(), VALID_KEYS.join(", "));
    Ok(())
}

fn set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_or_default();
    config.set(key, value)?;
    let path = config.save()?;
    println!(
        "{} {} = {}",
        "Saved".green().bold(),
        key.cyan(),
        value
    );
    println!("{}", path.display().to_string().dimmed());
    Ok(())
}
