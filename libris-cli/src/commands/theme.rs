//! Theme command implementation

use crate::config::Config;
use anyhow::{Context, Result};
use clap::ValueEnum;
use libris_core::Theme;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeChoice {
    Dark,
    Light,
    Toggle,
}

/// Show the theme, or change it
pub fn theme(config: &Config, choice: Option<ThemeChoice>) -> Result<()> {
    let mut store = config.store();
    let current = Theme::load(&store);

    let next = match choice {
        None => {
            println!("{}", current);
            return Ok(());
        }
        Some(ThemeChoice::Dark) => Theme::Dark,
        Some(ThemeChoice::Light) => Theme::Light,
        Some(ThemeChoice::Toggle) => current.toggle(),
    };

    next.save(&mut store).context("Failed to save theme")?;
    println!("{}", next);
    Ok(())
}
