//! Configuration management.

use clap::Subcommand;

use crate::db::SettingsRepository;

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Show a setting value
    Get { key: String },
    /// Set a setting value
    Set { key: String, value: String },
}

pub fn run<R: SettingsRepository>(repo: &R, action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => match repo.get_setting(&key)? {
            Some(value) => println!("{value}"),
            None => println!("(unset)"),
        },
        ConfigAction::Set { key, value } => {
            repo.set_setting(&key, &value)?;
            println!("{key} = {value}");
        }
    }
    Ok(())
}
