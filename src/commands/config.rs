// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Config command - print the effective configuration

use crate::config::Config;
use anyhow::{anyhow, Result};

/// Print one value, or the whole configuration as TOML
pub fn run(config: &Config, key: Option<&str>) -> Result<()> {
    match key {
        Some(key) => {
            let value = config
                .get(key)
                .ok_or_else(|| anyhow!("Unknown configuration key: {}", key))?;
            println!("{value}");
        }
        None => print!("{}", config.to_toml()?),
    }
    Ok(())
}
