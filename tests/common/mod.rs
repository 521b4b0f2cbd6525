// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! A mock OpenTOSCA container serving one CSAR with one deployed instance

#![allow(dead_code)]

use serde_json::{json, Value};
use std::time::Duration;
use tosca_modeler::container::{ContainerClient, PollSettings};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CSAR: &str = "/csars/app.csar";
pub const ST: &str = "/csars/app.csar/servicetemplates/st";
pub const BUILD_INSTANCES: &str = "/csars/app.csar/servicetemplates/st/buildplans/build/instances";
pub const INSTANCE: &str = "/csars/app.csar/servicetemplates/st/instances/7";
pub const TERMINATION_INSTANCES: &str =
    "/csars/app.csar/servicetemplates/st/instances/7/managementplans/terminate/instances";
pub const TRANSFORM_INSTANCES: &str =
    "/csars/app.csar/servicetemplates/st/instances/7/managementplans/app_transformTo_app_v2_plan/instances";
pub const NODE_INSTANCE: &str = "/csars/app.csar/servicetemplates/st/nodetemplates/web/instances/1";
pub const TARGET_CSAR: &str = "/csars/app_v2.csar";
pub const TARGET_ST: &str = "/csars/app_v2.csar/servicetemplates/st";

const BUILD_PLAN: &str = "http://docs.oasis-open.org/tosca/ns/2011/12/PlanTypes/BuildPlan";
const TERMINATION_PLAN: &str = "http://docs.oasis-open.org/tosca/ns/2011/12/PlanTypes/TerminationPlan";
const MANAGEMENT_PLAN: &str = "http://docs.oasis-open.org/tosca/ns/2011/12/PlanTypes/ManagementPlan";
const TRANSFORMATION_PLAN: &str = "http://opentosca.org/plantypes/TransformationPlan";

pub fn fast_poll() -> PollSettings {
    PollSettings::from_millis(20, 2_000)
}

pub fn client(server: &MockServer) -> ContainerClient {
    ContainerClient::new(server.uri(), Duration::from_secs(5)).unwrap()
}

pub async fn respond(server: &MockServer, http_method: &str, route: &str, body: Value) {
    Mock::given(method(http_method))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn respond_text(server: &MockServer, http_method: &str, route: &str, body: &str) {
    Mock::given(method(http_method))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Mount the resource graph; the service template instance reports
/// `instance_state`. Plan instance collections are left to each test.
pub async fn mount_container(server: &MockServer, instance_state: &str) {
    let base = server.uri();
    let link = |route: &str| json!({ "href": format!("{base}{route}") });

    respond(server, "GET", CSAR, json!({
        "id": "app.csar",
        "_links": { "servicetemplate": link(ST), "self": link(CSAR) }
    }))
    .await;

    respond(server, "GET", ST, json!({
        "id": "st",
        "_links": {
            "buildplans": link(&format!("{ST}/buildplans")),
            "instances": link(&format!("{ST}/instances")),
            "nodetemplates": link(&format!("{ST}/nodetemplates")),
            "self": link(ST)
        }
    }))
    .await;

    respond(server, "GET", &format!("{ST}/buildplans"), json!({
        "plans": [{
            "id": "build",
            "plan_type": BUILD_PLAN,
            "input_parameters": [
                { "name": "CorrelationID", "type": "String", "required": "YES" },
                { "name": "VMUserName", "type": "String", "required": "YES" },
                { "name": "csarEntrypoint", "type": "String", "required": "YES" }
            ],
            "output_parameters": [{ "name": "endpoint", "type": "String" }],
            "_links": { "instances": link(BUILD_INSTANCES) }
        }]
    }))
    .await;

    respond(server, "GET", &format!("{ST}/instances"), json!({
        "service_template_instances": [{
            "id": 7,
            "state": instance_state,
            "_links": { "self": link(INSTANCE) }
        }]
    }))
    .await;

    respond(server, "GET", INSTANCE, json!({
        "id": 7,
        "state": instance_state,
        "_links": {
            "self": link(INSTANCE),
            "managementplans": link(&format!("{INSTANCE}/managementplans")),
            "build_plan_instance": link(&format!("{BUILD_INSTANCES}/1234"))
        }
    }))
    .await;

    respond(server, "GET", &format!("{INSTANCE}/managementplans"), json!({
        "plans": [
            {
                "id": "terminate",
                "plan_type": TERMINATION_PLAN,
                "_links": { "instances": link(TERMINATION_INSTANCES) }
            },
            {
                "id": "scale_out",
                "plan_type": MANAGEMENT_PLAN,
                "input_parameters": [
                    { "name": "OpenTOSCAContainerAPIServiceInstanceURL", "type": "String", "required": "YES" },
                    { "name": "Replicas", "type": "String", "required": "NO" }
                ],
                "_links": {}
            },
            {
                "id": "app_transformTo_app_v2_plan",
                "plan_type": TRANSFORMATION_PLAN,
                "_links": { "instances": link(TRANSFORM_INSTANCES) }
            }
        ]
    }))
    .await;

    respond(server, "GET", &format!("{BUILD_INSTANCES}/1234"), json!({
        "correlation_id": "1234",
        "service_template_instance_id": 7,
        "state": "FINISHED",
        "inputs": [
            { "name": "CorrelationID", "type": "String", "required": "YES", "value": "1234" },
            { "name": "VMUserName", "type": "String", "required": "YES", "value": "ubuntu" }
        ],
        "logs": [{ "message": "Provisioned VM", "status": "INFO" }]
    }))
    .await;

    respond(server, "GET", &format!("{ST}/nodetemplates"), json!({
        "node_templates": [
            {
                "id": "web",
                "name": "Web",
                "_links": {
                    "self": link(&format!("{ST}/nodetemplates/web")),
                    "instances": link(&format!("{ST}/nodetemplates/web/instances"))
                }
            },
            {
                "id": "db",
                "_links": { "self": link(&format!("{ST}/nodetemplates/db")) }
            }
        ]
    }))
    .await;

    respond(server, "GET", &format!("{ST}/nodetemplates/web/instances"), json!({
        "node_template_instances": [{
            "id": 1,
            "service_template_instance_id": 7,
            "state": "STARTED",
            "_links": { "self": link(NODE_INSTANCE) }
        }]
    }))
    .await;

    respond(server, "GET", NODE_INSTANCE, json!({
        "id": 1,
        "service_template_instance_id": "7",
        "state": "STARTED",
        "_links": {
            "self": link(NODE_INSTANCE),
            "state": link(&format!("{NODE_INSTANCE}/state"))
        }
    }))
    .await;

    respond(server, "GET", &format!("{ST}/nodetemplates/db/instances"), json!({
        "node_template_instances": [{
            "id": 2,
            "service_template_instance_id": 7,
            "state": "CREATING",
            "_links": { "self": link(&format!("{ST}/nodetemplates/db/instances/2")) }
        }]
    }))
    .await;

    respond(server, "GET", &format!("{ST}/nodetemplates/db/instances/2"), json!({
        "id": 2,
        "service_template_instance_id": 7,
        "state": "CREATING",
        "_links": { "self": link(&format!("{ST}/nodetemplates/db/instances/2")) }
    }))
    .await;
}

/// The migration target app_v2.csar with node "web" running in instance 8
pub async fn mount_migration_target(server: &MockServer) {
    let base = server.uri();
    let link = |route: &str| json!({ "href": format!("{base}{route}") });
    let web_instance = format!("{TARGET_ST}/nodetemplates/web/instances/3");

    respond(server, "GET", TARGET_CSAR, json!({
        "id": "app_v2.csar",
        "_links": { "servicetemplate": link(TARGET_ST), "self": link(TARGET_CSAR) }
    }))
    .await;

    respond(server, "GET", TARGET_ST, json!({
        "id": "st",
        "_links": {
            "nodetemplates": link(&format!("{TARGET_ST}/nodetemplates")),
            "self": link(TARGET_ST)
        }
    }))
    .await;

    respond(server, "GET", &format!("{TARGET_ST}/nodetemplates"), json!({
        "node_templates": [{
            "id": "web",
            "_links": {
                "self": link(&format!("{TARGET_ST}/nodetemplates/web")),
                "instances": link(&format!("{TARGET_ST}/nodetemplates/web/instances"))
            }
        }]
    }))
    .await;

    respond(server, "GET", &format!("{TARGET_ST}/nodetemplates/web/instances"), json!({
        "node_template_instances": [
            { "id": 1, "service_template_instance_id": 7, "state": "DELETED", "_links": {} },
            { "id": 3, "service_template_instance_id": 8, "state": "STARTED", "_links": { "self": link(&web_instance) } }
        ]
    }))
    .await;

    respond(server, "GET", &web_instance, json!({
        "id": 3,
        "service_template_instance_id": 8,
        "state": "STARTED",
        "_links": { "self": link(&web_instance) }
    }))
    .await;
}

/// Build plan instance collection reporting instance 7 for correlation 1234
pub async fn mount_build_plan_instances(server: &MockServer) {
    respond(server, "GET", BUILD_INSTANCES, json!({
        "plan_instances": [
            { "correlation_id": "99", "service_template_instance_id": 3 },
            { "correlation_id": "1234", "service_template_instance_id": 7 }
        ]
    }))
    .await;
}

/// Names of the parameters posted in the last request to `route`
pub async fn posted_parameter_names(server: &MockServer, route: &str) -> Vec<String> {
    let requests = server.received_requests().await.unwrap_or_default();
    let request = requests
        .iter()
        .rev()
        .find(|r| r.method.as_str() == "POST" && r.url.path() == route)
        .expect("no POST recorded");
    let body: Vec<Value> = serde_json::from_slice(&request.body).unwrap();
    body.iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect()
}

/// Number of GET requests received on `route`
pub async fn get_count(server: &MockServer, route: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == "GET" && r.url.path() == route)
        .count()
}
