// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Topology commands - show, export, validate and import the topology

use super::Output;
use crate::config::Config;
use crate::graph::TopologyGraph;
use crate::store::persist;
use anyhow::{bail, Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    /// Graphviz DOT format
    Dot,
    /// Topology template JSON
    Json,
}

/// Print nodes, relationships and live modeling status
pub fn show(config: &Config, out: Output) -> Result<()> {
    let state = persist::load(&config.data_dir)?;
    let topology = &state.topology;

    if out.json {
        println!("{}", serde_json::to_string_pretty(topology.as_ref())?);
        return Ok(());
    }

    println!(
        "{} {} nodes, {} relationships",
        out.heading("Topology:"),
        topology.node_templates.len(),
        topology.relationship_templates.len()
    );

    if !topology.node_templates.is_empty() {
        println!();
        println!("{}", out.heading("Nodes"));
        for node in &topology.node_templates {
            let live = state
                .live_modeling
                .node_templates_data
                .iter()
                .find(|d| d.id == node.id)
                .and_then(|d| d.state)
                .map(|s| format!(" {s}"))
                .unwrap_or_default();
            println!(
                "  {:<20} {:<24} {} [{}..{}]{}",
                node.id,
                node.name,
                out.dim(&node.node_type),
                node.min_instances,
                node.max_instances,
                out.ok(&live)
            );
        }
    }

    if !topology.relationship_templates.is_empty() {
        println!();
        println!("{}", out.heading("Relationships"));
        for rel in &topology.relationship_templates {
            println!(
                "  {:<20} {} -> {}  {}",
                rel.id,
                rel.source_element.reference,
                rel.target_element.reference,
                out.dim(&rel.relationship_type)
            );
        }
    }

    println!();
    println!(
        "{} {}",
        out.heading("Live modeling:"),
        state.live_modeling.state
    );
    Ok(())
}

/// Write the topology as DOT or JSON to `output` or stdout
pub fn export(config: &Config, format: ExportFormat, output: Option<PathBuf>) -> Result<()> {
    info!("Exporting topology as {:?}", format);

    let state = persist::load(&config.data_dir)?;
    if state.topology.node_templates.is_empty() {
        eprintln!("Warning: Topology is empty. Run 'tosca-modeler topology import' first.");
    }

    let content = match format {
        ExportFormat::Dot => TopologyGraph::from_template(&state.topology).to_dot(),
        ExportFormat::Json => serde_json::to_string_pretty(state.topology.as_ref())
            .context("Failed to serialize topology")?,
    };

    match output {
        Some(path) => {
            fs::write(&path, &content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
            println!("Exported to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }

    Ok(())
}

/// Check ids and relationship references; fails when problems are found
pub fn validate(config: &Config, out: Output) -> Result<()> {
    let state = persist::load(&config.data_dir)?;
    let report = TopologyGraph::from_template(&state.topology).validate();

    if out.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.is_clean() {
        println!("{}", out.ok("Topology is valid"));
    } else {
        for id in &report.duplicate_ids {
            println!("{} duplicate id '{}'", out.error("error:"), id);
        }
        for rel in &report.dangling {
            println!(
                "{} relationship '{}' references missing node(s): {}",
                out.error("error:"),
                rel.id,
                rel.missing.join(", ")
            );
        }
    }

    if !report.is_clean() {
        bail!(
            "{} problem(s) found",
            report.duplicate_ids.len() + report.dangling.len()
        );
    }
    Ok(())
}

/// Replace the stored state with a topology document read from `path`
pub fn import(config: &Config, path: &Path) -> Result<()> {
    let state = persist::import_topology(path)?;
    let graph = TopologyGraph::from_template(&state.topology);
    let dangling = graph.dangling_relationships();
    if !dangling.is_empty() {
        eprintln!(
            "Warning: imported topology has {} dangling relationship(s)",
            dangling.len()
        );
    }

    persist::save(&config.data_dir, &state)?;
    println!(
        "Imported {} nodes and {} relationships from {}",
        graph.node_count(),
        state.topology.relationship_templates.len(),
        path.display()
    );
    Ok(())
}
