// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Replay a recorded action log against the stored state

use super::Output;
use crate::config::Config;
use crate::store::{persist, Action, Outcome, Store};
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Arguments for the apply command
#[derive(Debug, Default)]
pub struct ApplyArgs {
    /// Show the outcome of each action without saving
    pub dry_run: bool,
    /// Fail if any action is rejected
    pub strict: bool,
}

#[derive(Debug, Serialize)]
struct Step {
    action: &'static str,
    outcome: String,
}

/// Read a JSON array of actions from `path`
pub fn read_actions(path: &Path) -> Result<Vec<Action>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse actions in {}", path.display()))
}

/// Run apply command
pub fn run(config: &Config, path: &Path, args: &ApplyArgs, out: Output) -> Result<()> {
    let actions = read_actions(path)?;
    info!("Applying {} action(s) from {}", actions.len(), path.display());

    let store = Store::new(persist::load(&config.data_dir)?);
    let mut steps = Vec::with_capacity(actions.len());
    let mut rejected = 0;

    for action in actions {
        let tag = action.tag();
        let outcome = store.dispatch(action);
        let text = match &outcome {
            Outcome::Applied => "applied".to_string(),
            Outcome::Missing(entity) => format!("skipped, {entity} not found"),
            Outcome::Duplicate(entity) => format!("skipped, {entity} already exists"),
        };
        if !outcome.is_applied() {
            rejected += 1;
        }
        steps.push(Step { action: tag, outcome: text });
    }

    if out.json {
        println!("{}", serde_json::to_string_pretty(&steps)?);
    } else {
        for (i, step) in steps.iter().enumerate() {
            let outcome = if step.outcome == "applied" {
                out.ok(&step.outcome)
            } else {
                out.warn(&step.outcome)
            };
            println!("  {:>3}. {:<40} {}", i + 1, step.action, outcome);
        }
    }

    if args.strict && rejected > 0 {
        bail!("{} action(s) were rejected, state not saved", rejected);
    }

    if args.dry_run {
        println!("Dry-run: state not saved");
        return Ok(());
    }

    persist::save(&config.data_dir, &store.state())?;
    if !out.json {
        println!(
            "Applied {} of {} action(s)",
            steps.len() - rejected,
            steps.len()
        );
    }
    Ok(())
}
