//! `builder config show`

use anyhow::{Context, Result};
use clap::Subcommand;

use builder_core::config;

use crate::home;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration (file, defaults and environment).
    Show,
}

pub fn run(cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => show(),
    }
}

fn show() -> Result<()> {
    let home = home()?;
    let path = config::config_path_at(&home);
    let effective = config::load_at(&home).context("failed to load config")?;

    if path.exists() {
        println!("# {}", path.display());
    } else {
        println!("# {} (not present, defaults)", path.display());
    }
    print!(
        "{}",
        serde_yaml::to_string(&effective).context("failed to serialize config")?
    );
    Ok(())
}
