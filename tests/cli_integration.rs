// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Integration tests for the tosca-modeler CLI commands

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::MockServer;

/// tosca-modeler with an isolated data directory and no ambient overrides
fn modeler(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tosca-modeler").unwrap();
    cmd.env("TOSCA_MODELER_DATA_DIR", data_dir.path())
        .env_remove("TOSCA_MODELER_CONFIG")
        .env_remove("TOSCA_MODELER_CONTAINER_URL")
        .env_remove("RUST_LOG")
        .arg("--no-color");
    cmd
}

fn write_json(dir: &Path, name: &str, value: &Value) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

fn sample_topology() -> Value {
    json!({
        "nodeTemplates": [
            { "id": "web", "name": "Web", "type": "{http://example.org}WebServer" },
            { "id": "db", "name": "Database", "type": "{http://example.org}MySQL", "minInstances": 2 }
        ],
        "relationshipTemplates": [{
            "id": "con_1",
            "name": "con_1",
            "type": "{http://example.org}ConnectsTo",
            "sourceElement": { "ref": "web" },
            "targetElement": { "ref": "db" }
        }]
    })
}

fn import_sample(data_dir: &TempDir) {
    let file = write_json(data_dir.path(), "topology.json", &sample_topology());
    modeler(data_dir)
        .args(["topology", "import"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 nodes and 1 relationships"));
}

#[test]
fn test_import_show_and_export() {
    let data_dir = TempDir::new().unwrap();
    import_sample(&data_dir);

    modeler(&data_dir)
        .args(["topology", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 nodes, 1 relationships"))
        .stdout(predicate::str::contains("[2..1]"))
        .stdout(predicate::str::contains("Live modeling: DISABLED"));

    modeler(&data_dir)
        .args(["topology", "export", "--format", "dot"])
        .assert()
        .success()
        .stdout(predicate::str::contains("digraph topology"))
        .stdout(predicate::str::contains("\"web\" -> \"db\" [label=\"ConnectsTo\"];"));

    let output = modeler(&data_dir)
        .args(["topology", "export", "--format", "json"])
        .output()
        .unwrap();
    let exported: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(exported["nodeTemplates"].as_array().unwrap().len(), 2);
}

#[test]
fn test_validate_reports_dangling_relationship() {
    let data_dir = TempDir::new().unwrap();
    let mut topology = sample_topology();
    topology["relationshipTemplates"][0]["targetElement"]["ref"] = json!("cache");
    let file = write_json(data_dir.path(), "broken.json", &topology);

    modeler(&data_dir)
        .args(["topology", "import"])
        .arg(&file)
        .assert()
        .success()
        .stderr(predicate::str::contains("1 dangling relationship(s)"));

    modeler(&data_dir)
        .args(["topology", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("relationship 'con_1' references missing node(s): cache"));
}

#[test]
fn test_import_rejects_duplicate_ids() {
    let data_dir = TempDir::new().unwrap();
    let mut topology = sample_topology();
    topology["nodeTemplates"][1]["id"] = json!("web");
    let file = write_json(data_dir.path(), "dupes.json", &topology);

    modeler(&data_dir)
        .args(["topology", "import"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate id(s): web"));
    assert!(!data_dir.path().join("state.json").exists());
}

#[test]
fn test_apply_replays_actions() {
    let data_dir = TempDir::new().unwrap();
    import_sample(&data_dir);
    let actions = write_json(
        data_dir.path(),
        "actions.json",
        &json!([
            { "type": "INC_MAX_INSTANCES", "payload": { "id": "db" } },
            { "type": "DELETE_NODE_TEMPLATE", "payload": "web" },
            { "type": "CHANGE_NODE_NAME", "payload": { "id": "ghost", "new_name": "Boo" } }
        ]),
    );

    modeler(&data_dir)
        .arg("apply")
        .arg(&actions)
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped, node template 'ghost' not found"))
        .stdout(predicate::str::contains("Applied 2 of 3 action(s)"));

    let state: Value =
        serde_json::from_str(&fs::read_to_string(data_dir.path().join("state.json")).unwrap()).unwrap();
    let nodes = state["topology"]["nodeTemplates"].as_array().unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0]["maxInstances"], 2);
    assert!(state["topology"]["relationshipTemplates"].as_array().unwrap().is_empty());
}

#[test]
fn test_apply_strict_fails_on_rejected_action() {
    let data_dir = TempDir::new().unwrap();
    let actions = write_json(
        data_dir.path(),
        "actions.json",
        &json!([{ "type": "DELETE_RELATIONSHIP_TEMPLATE", "payload": "nope" }]),
    );

    modeler(&data_dir)
        .args(["apply", "--strict"])
        .arg(&actions)
        .assert()
        .failure()
        .stderr(predicate::str::contains("rejected"));
    assert!(!data_dir.path().join("state.json").exists());
}

#[test]
fn test_apply_rejects_unknown_action_type() {
    let data_dir = TempDir::new().unwrap();
    let actions = write_json(data_dir.path(), "actions.json", &json!([{ "type": "NOT_AN_ACTION" }]));

    modeler(&data_dir)
        .arg("apply")
        .arg(&actions)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse actions"));
}

#[test]
fn test_config_show_and_get() {
    let data_dir = TempDir::new().unwrap();
    let config_file = data_dir.path().join("modeler.toml");
    fs::write(&config_file, "container_url = \"http://container:1337\"\n").unwrap();

    modeler(&data_dir)
        .arg("--config")
        .arg(&config_file)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("container_url = \"http://container:1337\""))
        .stdout(predicate::str::contains("poll_interval_ms = 1000"));

    modeler(&data_dir)
        .args(["--container-url", "http://override:8080", "config", "container_url"])
        .assert()
        .success()
        .stdout("http://override:8080\n");

    modeler(&data_dir)
        .args(["config", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[test]
fn test_logs_empty_and_completions() {
    let data_dir = TempDir::new().unwrap();

    modeler(&data_dir).args(["--json", "logs"]).assert().success().stdout("[]\n");

    modeler(&data_dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tosca-modeler"));
}

#[test]
fn test_terminate_without_deployment_fails() {
    let data_dir = TempDir::new().unwrap();

    modeler(&data_dir)
        .args(["--container-url", "http://127.0.0.1:9", "terminate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no CSAR selected"));

    let state: Value =
        serde_json::from_str(&fs::read_to_string(data_dir.path().join("state.json")).unwrap()).unwrap();
    assert_eq!(state["liveModeling"]["state"], "ERROR");
    assert_eq!(state["liveModeling"]["containerUrl"], "http://127.0.0.1:9");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_inputs_lists_required_parameters() {
    let server = MockServer::start().await;
    common::mount_container(&server, "CREATED").await;
    let data_dir = TempDir::new().unwrap();
    let uri = server.uri();

    let output = tokio::task::spawn_blocking(move || {
        modeler(&data_dir)
            .args(["--container-url", uri.as_str(), "--json", "inputs", "app.csar"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success());
    let params: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(params, json!([{ "name": "VMUserName", "type": "String", "required": "YES" }]));
}
