// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Resources returned by the container API
//!
//! Every resource carries a HAL `_links` map. Ids are sometimes numbers and
//! sometimes strings on the wire; they are normalised to strings here.

use super::error::{ContainerError, ContainerResult};
use crate::types::{NodeTemplateInstanceState, ServiceTemplateInstanceState};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

// =========================================================================
// Links
// =========================================================================

/// A single link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Target URL
    pub href: String,
}

/// Link relations of a resource
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Links(HashMap<String, Link>);

impl Links {
    /// URL of relation `rel`
    pub fn href(&self, rel: &str) -> ContainerResult<&str> {
        self.0
            .get(rel)
            .map(|link| link.href.as_str())
            .ok_or_else(|| ContainerError::MissingLink { rel: rel.to_string() })
    }
}

impl<const N: usize> From<[(&str, &str); N]> for Links {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(rel, href)| (rel.to_string(), Link { href: href.to_string() }))
                .collect(),
        )
    }
}

/// Link relation names used by the container API
pub mod rel {
    /// CSAR -> service template
    pub const SERVICE_TEMPLATE: &str = "servicetemplate";
    /// Any collection owner -> its instances
    pub const INSTANCES: &str = "instances";
    /// Service template -> build plans
    pub const BUILD_PLANS: &str = "buildplans";
    /// Service template instance -> management plans
    pub const MANAGEMENT_PLANS: &str = "managementplans";
    /// Service template -> node templates
    pub const NODE_TEMPLATES: &str = "nodetemplates";
    /// Resource itself
    pub const SELF: &str = "self";
    /// Node template instance -> state
    pub const STATE: &str = "state";
    /// Service template instance -> the build plan instance that created it
    pub const BUILD_PLAN_INSTANCE: &str = "build_plan_instance";
}

// =========================================================================
// Id normalisation
// =========================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Number(serde_json::Number),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        }
    }
}

fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    WireId::deserialize(deserializer).map(WireId::into_string)
}

fn opt_id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Option::<WireId>::deserialize(deserializer).map(|id| id.map(WireId::into_string))
}

// =========================================================================
// Applications and templates
// =========================================================================

/// Request body for installing a CSAR from a URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsarUpload {
    /// Where the container downloads the CSAR from
    pub url: String,
    /// CSAR file name
    pub name: String,
    /// Whether the container should enrich the CSAR ("true"/"false")
    pub enrich: String,
}

/// Request body for generating a transformation plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformRequest<'a> {
    /// Source CSAR name
    pub source_csar_name: &'a str,
    /// Target CSAR name
    pub target_csar_name: &'a str,
}

/// An installed application package
#[derive(Debug, Clone, Deserialize)]
pub struct Csar {
    /// CSAR id
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    /// Links
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// A service template of a CSAR
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceTemplate {
    /// Service template id
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    /// Links
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// A node template as seen by the container
#[derive(Debug, Clone, Deserialize)]
pub struct ContainerNodeTemplate {
    /// Node template id
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Links
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// Node template collection
#[derive(Debug, Clone, Deserialize)]
pub struct NodeTemplateResources {
    /// Node templates
    #[serde(default)]
    pub node_templates: Vec<ContainerNodeTemplate>,
}

// =========================================================================
// Plans
// =========================================================================

/// Plan type URIs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanType {
    /// Deploys a service template instance
    #[serde(rename = "http://docs.oasis-open.org/tosca/ns/2011/12/PlanTypes/BuildPlan")]
    BuildPlan,
    /// Terminates a service template instance
    #[serde(rename = "http://docs.oasis-open.org/tosca/ns/2011/12/PlanTypes/TerminationPlan")]
    TerminationPlan,
    /// Any other management task
    #[serde(rename = "http://docs.oasis-open.org/tosca/ns/2011/12/PlanTypes/ManagementPlan")]
    ManagementPlan,
    /// Migrates an instance to another CSAR
    #[serde(rename = "http://opentosca.org/plantypes/TransformationPlan")]
    TransformationPlan,
    /// Unrecognised plan type
    #[serde(other)]
    Other,
}

/// A declared plan input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputParameter {
    /// Parameter name
    pub name: String,
    /// Parameter type, usually `String`
    #[serde(rename = "type")]
    pub param_type: String,
    /// `YES` or `NO`
    pub required: String,
    /// Supplied value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl InputParameter {
    /// A required string parameter without a value; the container fills it in
    #[must_use]
    pub fn required(name: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type: "String".to_string(),
            required: "YES".to_string(),
            value: None,
        }
    }

    /// A string parameter with a value
    #[must_use]
    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: "String".to_string(),
            required: "YES".to_string(),
            value: Some(value.into()),
        }
    }
}

/// A declared or produced plan output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputParameter {
    /// Parameter name
    pub name: String,
    /// Parameter type
    #[serde(rename = "type", default)]
    pub param_type: Option<String>,
    /// Produced value
    #[serde(default)]
    pub value: Option<String>,
}

/// A plan attached to a service template or instance
#[derive(Debug, Clone, Deserialize)]
pub struct Plan {
    /// Plan id
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    /// Plan type
    pub plan_type: PlanType,
    /// Declared inputs
    #[serde(default)]
    pub input_parameters: Vec<InputParameter>,
    /// Declared outputs
    #[serde(default)]
    pub output_parameters: Vec<OutputParameter>,
    /// Links
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// Plan collection
#[derive(Debug, Clone, Deserialize)]
pub struct PlanResources {
    /// Plans
    #[serde(default)]
    pub plans: Vec<Plan>,
}

/// One log line of a plan instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanLogEntry {
    /// Container timestamp, kept as sent
    #[serde(default)]
    pub timestamp: Option<Value>,
    /// Log message
    #[serde(default)]
    pub message: String,
    /// Event status
    #[serde(default)]
    pub status: Option<String>,
}

/// A running or finished plan execution
#[derive(Debug, Clone, Deserialize)]
pub struct PlanInstance {
    /// Correlation id given when the plan was started
    #[serde(deserialize_with = "id_string")]
    pub correlation_id: String,
    /// Service template instance the plan works on
    #[serde(default, deserialize_with = "opt_id_string")]
    pub service_template_instance_id: Option<String>,
    /// Execution state
    #[serde(default)]
    pub state: Option<String>,
    /// Log lines
    #[serde(default)]
    pub logs: Vec<PlanLogEntry>,
    /// Inputs the plan was started with
    #[serde(default)]
    pub inputs: Vec<InputParameter>,
    /// Outputs produced so far
    #[serde(default)]
    pub outputs: Vec<OutputParameter>,
    /// Links
    #[serde(rename = "_links", default)]
    pub links: Links,
}

impl PlanInstance {
    /// Value of output `name`, if produced
    #[must_use]
    pub fn output(&self, name: &str) -> Option<&str> {
        self.outputs
            .iter()
            .find(|o| o.name == name)
            .and_then(|o| o.value.as_deref())
    }
}

/// Plan instance collection
#[derive(Debug, Clone, Deserialize)]
pub struct PlanInstanceResources {
    /// Plan instances
    #[serde(default)]
    pub plan_instances: Vec<PlanInstance>,
}

// =========================================================================
// Instances
// =========================================================================

/// A deployed service template
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceTemplateInstance {
    /// Instance id
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    /// Lifecycle state
    pub state: ServiceTemplateInstanceState,
    /// Links
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// Service template instance collection
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceTemplateInstanceResources {
    /// Instances
    #[serde(default)]
    pub service_template_instances: Vec<ServiceTemplateInstance>,
}

/// A deployed node template
#[derive(Debug, Clone, Deserialize)]
pub struct NodeTemplateInstance {
    /// Instance id
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    /// Owning service template instance
    #[serde(deserialize_with = "id_string")]
    pub service_template_instance_id: String,
    /// Lifecycle state
    pub state: NodeTemplateInstanceState,
    /// Links
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// Node template instance collection
#[derive(Debug, Clone, Deserialize)]
pub struct NodeTemplateInstanceResources {
    /// Instances
    #[serde(default)]
    pub node_template_instances: Vec<NodeTemplateInstance>,
}
