// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Live modeling session tests against a mock container

mod common;

use common::*;
use serde_json::json;
use std::sync::Arc;
use tosca_modeler::session::LiveModelingSession;
use tosca_modeler::store::{Action, Store};
use tosca_modeler::types::{LiveModelingState, LogType, NodeTemplateInstanceState};
use wiremock::MockServer;

fn session(server: &MockServer, store: &Arc<Store>) -> LiveModelingSession {
    LiveModelingSession::new(Arc::clone(store), client(server), fast_poll())
}

/// Store with live modeling enabled on instance 7 of app.csar
fn enabled_store() -> Arc<Store> {
    let store = Arc::new(Store::default());
    store.dispatch_all([
        Action::SetCurrentCsarId("app.csar".into()),
        Action::SetCurrentServiceTemplateInstanceId("7".into()),
        Action::SetLiveModelingState(LiveModelingState::Start),
        Action::SetLiveModelingState(LiveModelingState::Update),
        Action::SetLiveModelingState(LiveModelingState::Enabled),
    ]);
    assert_eq!(store.state().live_modeling.state, LiveModelingState::Enabled);
    store
}

#[tokio::test]
async fn test_start_enables_live_modeling() {
    let server = MockServer::start().await;
    mount_container(&server, "CREATED").await;
    respond_text(&server, "POST", BUILD_INSTANCES, "1234").await;
    mount_build_plan_instances(&server).await;
    let store = Arc::new(Store::default());
    let mut watcher = store.subscribe();

    let instance = session(&server, &store).start("app.csar", &[]).await.unwrap();

    assert_eq!(instance, "7");
    let state = store.state();
    let live = &state.live_modeling;
    assert_eq!(live.state, LiveModelingState::Enabled);
    assert_eq!(live.current_csar_id.as_deref(), Some("app.csar"));
    assert_eq!(live.current_service_template_instance_id.as_deref(), Some("7"));

    let nodes: Vec<_> = live
        .node_templates_data
        .iter()
        .map(|d| (d.id.as_str(), d.state))
        .collect();
    assert_eq!(
        nodes,
        [
            ("web", Some(NodeTemplateInstanceState::Started)),
            ("db", Some(NodeTemplateInstanceState::Creating)),
        ]
    );
    assert_eq!(live.logs.last().map(|l| l.log_type), Some(LogType::Success));
    assert!(watcher.has_changed().unwrap());
}

#[tokio::test]
async fn test_failed_deployment_moves_to_error() {
    let server = MockServer::start().await;
    mount_container(&server, "ERROR").await;
    respond_text(&server, "POST", BUILD_INSTANCES, "1234").await;
    mount_build_plan_instances(&server).await;
    let store = Arc::new(Store::default());

    let result = session(&server, &store).start("app.csar", &[]).await;

    assert!(result.is_err());
    let state = store.state();
    let live = &state.live_modeling;
    assert_eq!(live.state, LiveModelingState::Error);
    assert_eq!(live.logs.last().map(|l| l.log_type), Some(LogType::Danger));
    assert!(live.node_templates_data.is_empty());
}

#[tokio::test]
async fn test_start_after_error_starts_over() {
    let server = MockServer::start().await;
    mount_container(&server, "CREATED").await;
    respond_text(&server, "POST", BUILD_INSTANCES, "1234").await;
    mount_build_plan_instances(&server).await;
    let store = Arc::new(Store::default());
    store.dispatch(Action::SetLiveModelingState(LiveModelingState::Enabled));
    assert_eq!(store.state().live_modeling.state, LiveModelingState::Error);

    session(&server, &store).start("app.csar", &[]).await.unwrap();

    assert_eq!(store.state().live_modeling.state, LiveModelingState::Enabled);
}

#[tokio::test]
async fn test_start_while_enabled_keeps_current_deployment() {
    let server = MockServer::start().await;
    mount_container(&server, "CREATED").await;
    let store = enabled_store();

    let result = session(&server, &store).start("other.csar", &[]).await;

    assert!(result.is_err());
    let state = store.state();
    let live = &state.live_modeling;
    assert_eq!(live.state, LiveModelingState::Error);
    assert_eq!(live.current_csar_id.as_deref(), Some("app.csar"));
    assert_eq!(live.current_service_template_instance_id.as_deref(), Some("7"));
    assert!(server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .all(|r| r.method.as_str() != "POST"));
}

#[tokio::test]
async fn test_terminate_disables_live_modeling() {
    let server = MockServer::start().await;
    mount_container(&server, "DELETED").await;
    respond_text(&server, "POST", TERMINATION_INSTANCES, "555").await;
    let store = enabled_store();
    store.dispatch(Action::SetNodeLiveModelingData(tosca_modeler::types::NodeTemplateData {
        id: "web".into(),
        state: Some(NodeTemplateInstanceState::Started),
    }));

    session(&server, &store).terminate().await.unwrap();

    let state = store.state();
    let live = &state.live_modeling;
    assert_eq!(live.state, LiveModelingState::Disabled);
    assert!(live.node_templates_data.is_empty());
}

#[tokio::test]
async fn test_refresh_updates_node_data() {
    let server = MockServer::start().await;
    mount_container(&server, "CREATED").await;
    let store = enabled_store();

    session(&server, &store).refresh_node_data().await.unwrap();

    let state = store.state();
    let live = &state.live_modeling;
    assert_eq!(live.node_templates_data.len(), 2);
    assert_eq!(live.state, LiveModelingState::Enabled);
}

#[tokio::test]
async fn test_migrate_switches_csar_and_instance() {
    let server = MockServer::start().await;
    mount_container(&server, "CREATED").await;
    respond_text(&server, "POST", "/csars/transform", "").await;
    respond_text(&server, "POST", TRANSFORM_INSTANCES, "999").await;
    respond(&server, "GET", TRANSFORM_INSTANCES, json!({
        "plan_instances": [{
            "correlation_id": "999",
            "outputs": [{ "name": "instanceId", "value": "8" }]
        }]
    }))
    .await;
    let store = enabled_store();

    // The target CSAR is not mounted, so node data cannot be refreshed.
    let result = session(&server, &store).migrate("app_v2.csar", &[]).await;

    assert!(result.is_err());
    let state = store.state();
    let live = &state.live_modeling;
    assert_eq!(live.current_csar_id.as_deref(), Some("app_v2.csar"));
    assert_eq!(live.current_service_template_instance_id.as_deref(), Some("8"));
    assert_eq!(live.state, LiveModelingState::Error);
}

#[tokio::test]
async fn test_migrate_reloads_node_data_for_target() {
    let server = MockServer::start().await;
    mount_container(&server, "CREATED").await;
    mount_migration_target(&server).await;
    respond_text(&server, "POST", "/csars/transform", "").await;
    respond_text(&server, "POST", TRANSFORM_INSTANCES, "999").await;
    respond(&server, "GET", TRANSFORM_INSTANCES, json!({
        "plan_instances": [{
            "correlation_id": "999",
            "outputs": [{ "name": "instanceId", "value": "8" }]
        }]
    }))
    .await;
    let store = enabled_store();
    store.dispatch(Action::SetNodeLiveModelingData(tosca_modeler::types::NodeTemplateData {
        id: "db".into(),
        state: Some(NodeTemplateInstanceState::Started),
    }));
    let mut watcher = store.subscribe();

    let migrated = session(&server, &store).migrate("app_v2.csar", &[]).await.unwrap();

    assert_eq!(migrated, "8");
    let state = store.state();
    let live = &state.live_modeling;
    assert_eq!(live.state, LiveModelingState::Enabled);
    assert_eq!(live.current_csar_id.as_deref(), Some("app_v2.csar"));
    assert_eq!(live.current_service_template_instance_id.as_deref(), Some("8"));
    let nodes: Vec<_> = live
        .node_templates_data
        .iter()
        .map(|d| (d.id.as_str(), d.state))
        .collect();
    assert_eq!(nodes, [("web", Some(NodeTemplateInstanceState::Started))]);
    assert_eq!(live.logs.last().map(|l| l.log_type), Some(LogType::Success));
    assert!(watcher.has_changed().unwrap());
}
