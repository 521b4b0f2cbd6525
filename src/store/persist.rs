// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Loading and saving the application state and topology documents

use crate::graph::TopologyGraph;
use crate::types::{ApplicationState, TopologyTemplate};
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// File name of the persisted state inside the data directory
pub const STATE_FILE: &str = "state.json";

/// Load state from `dir/state.json`, falling back to the initial state
pub fn load(dir: &Path) -> Result<ApplicationState> {
    let state_path = dir.join(STATE_FILE);
    if !state_path.exists() {
        return Ok(ApplicationState::default());
    }

    let content = fs::read_to_string(&state_path)
        .with_context(|| format!("Failed to read {}", state_path.display()))?;
    let state: ApplicationState = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", state_path.display()))?;
    ensure_unique_ids(&state.topology, &state_path)?;
    Ok(state)
}

/// Save state to `dir/state.json`
pub fn save(dir: &Path, state: &ApplicationState) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;

    let state_path = dir.join(STATE_FILE);
    let json = serde_json::to_string_pretty(state).context("Failed to serialize state")?;
    fs::write(&state_path, json)
        .with_context(|| format!("Failed to write {}", state_path.display()))?;

    Ok(())
}

/// Read a bare topology document (as exported by the repository) and wrap it
/// in an initial application state
pub fn import_topology(path: &Path) -> Result<ApplicationState> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let topology: TopologyTemplate = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse topology {}", path.display()))?;
    ensure_unique_ids(&topology, path)?;

    Ok(ApplicationState {
        topology: Arc::new(topology),
        ..ApplicationState::default()
    })
}

/// Node ids and relationship ids must each be unique
fn ensure_unique_ids(topology: &TopologyTemplate, source: &Path) -> Result<()> {
    let duplicates = TopologyGraph::from_template(topology).duplicate_ids();
    if !duplicates.is_empty() {
        bail!(
            "{} contains duplicate id(s): {}",
            source.display(),
            duplicates.join(", ")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NodeTemplate, Properties};
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_initial_state() {
        let dir = TempDir::new().unwrap();
        let state = load(dir.path()).unwrap();
        assert_eq!(state, ApplicationState::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut node = NodeTemplate::new("web", "Web", "{ns}Tomcat");
        node.properties = Some(Properties::from_typed("KV", json!({"Port": "8080"})));
        let state = ApplicationState {
            topology: Arc::new(TopologyTemplate {
                node_templates: vec![Arc::new(node)],
                relationship_templates: vec![],
            }),
            ..ApplicationState::default()
        };

        save(dir.path(), &state).unwrap();
        let loaded = load(dir.path()).unwrap();

        assert_eq!(loaded, state);
    }

    #[test]
    fn test_import_topology_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("topology.json");
        fs::write(
            &path,
            r#"{
                "nodeTemplates": [
                    {"id": "db", "name": "DB", "type": "{ns}MySQL", "minInstances": 1, "maxInstances": 2,
                     "properties": {"any": "<xml/>"}}
                ],
                "relationshipTemplates": []
            }"#,
        )
        .unwrap();

        let state = import_topology(&path).unwrap();
        let db = state.topology.node("db").unwrap();
        assert_eq!(db.max_instances, 2);
        assert_eq!(db.properties, Some(Properties::Any(json!("<xml/>"))));
    }

    #[test]
    fn test_import_rejects_duplicate_ids() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("topology.json");
        fs::write(
            &path,
            r#"{"nodeTemplates": [
                {"id": "a", "name": "A", "type": "{ns}T"},
                {"id": "a", "name": "A2", "type": "{ns}T"}
            ]}"#,
        )
        .unwrap();

        let err = import_topology(&path).unwrap_err();

        assert!(err.to_string().contains("duplicate id(s): a"));
    }

    #[test]
    fn test_load_rejects_duplicate_ids() {
        let dir = TempDir::new().unwrap();
        let node = Arc::new(NodeTemplate::new("a", "A", "{ns}T"));
        let state = ApplicationState {
            topology: Arc::new(TopologyTemplate {
                node_templates: vec![Arc::clone(&node), node],
                relationship_templates: vec![],
            }),
            ..ApplicationState::default()
        };
        save(dir.path(), &state).unwrap();

        assert!(load(dir.path()).is_err());
    }
}
