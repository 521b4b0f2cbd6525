// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! tosca-modeler library - topology state store and live modeling client
//!
//! This crate provides an immutable application state for a TOSCA topology
//! modeler, a pure reducer driven by typed actions, and a client that walks
//! the hypermedia API of an OpenTOSCA container to deploy, migrate and
//! terminate the modeled application.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod commands;
pub mod config;
pub mod container;
pub mod graph;
pub mod session;
pub mod store;

/// Core data types of the modeler state tree
pub mod types {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use serde_json::Value;
    use std::collections::BTreeMap;
    use std::fmt;
    use std::str::FromStr;
    use std::sync::Arc;

    // =========================================================================
    // Node Template
    // =========================================================================

    /// Position of a node on the modeling canvas
    #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
    pub struct Coordinates {
        /// X coordinate
        pub x: f64,
        /// Y coordinate
        pub y: f64,
    }

    /// Node properties, tagged by the property definition kind
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub enum Properties {
        /// Key-value properties, normally a JSON object
        #[serde(rename = "kvproperties")]
        Kv(Value),
        /// Free-form properties (XML, YAML, ...)
        #[serde(rename = "any")]
        Any(Value),
    }

    impl Properties {
        /// Property type tag for key-value properties
        pub const KV_TYPE: &'static str = "KV";

        /// Build properties from a property type tag and a raw value.
        ///
        /// A `KV` tag keeps the value under `kvproperties` whatever its
        /// shape; every other tag keeps it under `any`.
        #[must_use]
        pub fn from_typed(property_type: &str, value: Value) -> Self {
            if property_type == Self::KV_TYPE {
                Self::Kv(value)
            } else {
                Self::Any(value)
            }
        }
    }

    /// A requirement of a node template
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Requirement {
        /// Requirement id
        pub id: String,
        /// Requirement name
        pub name: String,
        /// Requirement type QName
        #[serde(rename = "type")]
        pub requirement_type: String,
    }

    /// Requirements wrapper as found in topology documents
    #[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct Requirements {
        /// The requirement list
        #[serde(default)]
        pub requirement: Vec<Requirement>,
    }

    /// A capability of a node template
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Capability {
        /// Capability id
        pub id: String,
        /// Capability name
        pub name: String,
        /// Capability type QName
        #[serde(rename = "type")]
        pub capability_type: String,
    }

    /// Capabilities wrapper as found in topology documents
    #[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct Capabilities {
        /// The capability list
        #[serde(default)]
        pub capability: Vec<Capability>,
    }

    /// A deployment artifact attached to a node template
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DeploymentArtifact {
        /// Artifact name, unique within one node
        pub name: String,
        /// Artifact type QName
        pub artifact_type: String,
        /// Referenced artifact template
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub artifact_ref: Option<String>,
    }

    /// Deployment artifacts wrapper
    #[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DeploymentArtifacts {
        /// The artifact list
        #[serde(default)]
        pub deployment_artifact: Vec<DeploymentArtifact>,
    }

    /// A policy attached to a node template
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Policy {
        /// Policy name, unique within one node
        pub name: String,
        /// Policy type QName
        pub policy_type: String,
        /// Referenced policy template
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub policy_ref: Option<String>,
    }

    /// Policies wrapper
    #[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct Policies {
        /// The policy list
        #[serde(default)]
        pub policy: Vec<Policy>,
    }

    fn one() -> u32 {
        1
    }

    /// Node template in the topology
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct NodeTemplate {
        /// Unique identifier within the topology
        pub id: String,
        /// Display name
        pub name: String,
        /// Node type QName
        #[serde(rename = "type")]
        pub node_type: String,
        /// Minimum instance count
        #[serde(default = "one")]
        pub min_instances: u32,
        /// Maximum instance count
        #[serde(default = "one")]
        pub max_instances: u32,
        /// Node properties
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub properties: Option<Properties>,
        /// Requirements
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub requirements: Option<Requirements>,
        /// Capabilities
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub capabilities: Option<Capabilities>,
        /// Deployment artifacts
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub deployment_artifacts: Option<DeploymentArtifacts>,
        /// Policies
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub policies: Option<Policies>,
        /// Target location (e.g. a cloud provider label)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub target_location: Option<String>,
        /// Canvas position
        #[serde(default)]
        pub coordinates: Coordinates,
        /// Additional free-form attributes
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        pub other_attributes: BTreeMap<String, String>,
    }

    /// One replaceable attribute of a node template
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "attribute", content = "value", rename_all = "camelCase")]
    pub enum NodeAttribute {
        /// Minimum instance count
        MinInstances(u32),
        /// Maximum instance count
        MaxInstances(u32),
        /// Requirements
        Requirements(Requirements),
        /// Properties
        Properties(Properties),
        /// Capabilities
        Capabilities(Capabilities),
        /// Deployment artifacts
        DeploymentArtifacts(DeploymentArtifacts),
        /// Policies
        Policies(Policies),
        /// Target location
        Location(Option<String>),
        /// Display name
        Name(String),
        /// Canvas position
        Coordinates(Coordinates),
        /// A free-form attribute
        Other {
            /// Attribute key
            key: String,
            /// Attribute value
            value: String,
        },
    }

    impl NodeTemplate {
        /// Create a node template with default attributes
        #[must_use]
        pub fn new(id: impl Into<String>, name: impl Into<String>, node_type: impl Into<String>) -> Self {
            Self {
                id: id.into(),
                name: name.into(),
                node_type: node_type.into(),
                min_instances: 1,
                max_instances: 1,
                properties: None,
                requirements: None,
                capabilities: None,
                deployment_artifacts: None,
                policies: None,
                target_location: None,
                coordinates: Coordinates::default(),
                other_attributes: BTreeMap::new(),
            }
        }

        /// Produce a copy of this node with one attribute replaced
        #[must_use]
        pub fn with_attribute(&self, attribute: NodeAttribute) -> Self {
            let mut node = self.clone();
            match attribute {
                NodeAttribute::MinInstances(count) => node.min_instances = count,
                NodeAttribute::MaxInstances(count) => node.max_instances = count,
                NodeAttribute::Requirements(requirements) => node.requirements = Some(requirements),
                NodeAttribute::Properties(properties) => node.properties = Some(properties),
                NodeAttribute::Capabilities(capabilities) => node.capabilities = Some(capabilities),
                NodeAttribute::DeploymentArtifacts(artifacts) => {
                    node.deployment_artifacts = Some(artifacts);
                }
                NodeAttribute::Policies(policies) => node.policies = Some(policies),
                NodeAttribute::Location(location) => node.target_location = location,
                NodeAttribute::Name(name) => node.name = name,
                NodeAttribute::Coordinates(coordinates) => node.coordinates = coordinates,
                NodeAttribute::Other { key, value } => {
                    node.other_attributes.insert(key, value);
                }
            }
            node
        }
    }

    // =========================================================================
    // Relationship Template
    // =========================================================================

    /// Reference to a node template by id
    #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct NodeRef {
        /// Referenced node id
        #[serde(rename = "ref")]
        pub reference: String,
    }

    impl NodeRef {
        /// Reference the node with the given id
        #[must_use]
        pub fn to(id: impl Into<String>) -> Self {
            Self { reference: id.into() }
        }
    }

    /// Relationship between two node templates
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RelationshipTemplate {
        /// Unique identifier within the topology
        pub id: String,
        /// Display name
        pub name: String,
        /// Relationship type QName
        #[serde(rename = "type")]
        pub relationship_type: String,
        /// Source node
        pub source_element: NodeRef,
        /// Target node
        pub target_element: NodeRef,
    }

    impl RelationshipTemplate {
        /// Create a relationship between two node ids
        #[must_use]
        pub fn new(
            id: impl Into<String>,
            relationship_type: impl Into<String>,
            source: impl Into<String>,
            target: impl Into<String>,
        ) -> Self {
            let id = id.into();
            Self {
                name: id.clone(),
                id,
                relationship_type: relationship_type.into(),
                source_element: NodeRef::to(source),
                target_element: NodeRef::to(target),
            }
        }

        /// Whether the relationship points from or to the given node
        #[must_use]
        pub fn references(&self, node_id: &str) -> bool {
            self.source_element.reference == node_id || self.target_element.reference == node_id
        }

        /// Produce a renamed copy of this relationship
        #[must_use]
        pub fn with_name(&self, name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                ..self.clone()
            }
        }
    }

    /// The topology document
    #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TopologyTemplate {
        /// Node templates in insertion order
        #[serde(default)]
        pub node_templates: Vec<Arc<NodeTemplate>>,
        /// Relationship templates in insertion order
        #[serde(default)]
        pub relationship_templates: Vec<Arc<RelationshipTemplate>>,
    }

    impl TopologyTemplate {
        /// Get a node template by id
        #[must_use]
        pub fn node(&self, id: &str) -> Option<&Arc<NodeTemplate>> {
            self.node_templates.iter().find(|n| n.id == id)
        }

        /// Get a relationship template by id
        #[must_use]
        pub fn relationship(&self, id: &str) -> Option<&Arc<RelationshipTemplate>> {
            self.relationship_templates.iter().find(|r| r.id == id)
        }
    }

    // =========================================================================
    // UI State
    // =========================================================================

    /// Contents of the properties sidebar
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SidebarContents {
        /// Whether the sidebar is shown
        pub sidebar_visible: bool,
        /// Whether a node (as opposed to a relationship) was clicked
        pub node_clicked: bool,
        /// Id of the selected element
        pub id: String,
        /// Value of the name text field
        pub name_text_field_value: String,
        /// Type of the selected element
        #[serde(rename = "type")]
        pub element_type: String,
        /// Minimum instances shown in the form
        pub min_instances: u32,
        /// Maximum instances shown in the form
        pub max_instances: u32,
        /// Properties shown in the form
        #[serde(default)]
        pub properties: Option<Properties>,
        /// Live modeling data of the selected node
        #[serde(default)]
        pub live_modeling_node_template_data: Option<NodeTemplateData>,
        /// Relationship source
        pub source: String,
        /// Relationship target
        pub target: String,
    }

    impl Default for SidebarContents {
        fn default() -> Self {
            Self {
                sidebar_visible: false,
                node_clicked: false,
                id: String::new(),
                name_text_field_value: String::new(),
                element_type: String::new(),
                min_instances: 1,
                max_instances: 1,
                properties: None,
                live_modeling_node_template_data: None,
                source: String::new(),
                target: String::new(),
            }
        }
    }

    /// The node that currently has focus
    #[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct CurrentNodeData {
        /// Focused node id
        pub id: String,
        /// Whether the node has focus
        pub focus: bool,
    }

    /// Visual overrides for a node type
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Visuals {
        /// Node type the visuals apply to
        pub type_id: String,
        /// Border color
        pub color: String,
        /// Optional icon
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub image_url: Option<String>,
    }

    /// UI slice of the application state
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UiState {
        /// Whether the palette is open
        pub current_palette_opened_state: bool,
        /// Whether navbar and palette are hidden
        pub hide_nav_bar_and_palette_state: bool,
        /// Sidebar contents
        pub sidebar_contents: SidebarContents,
        /// Focused node
        pub current_node_data: CurrentNodeData,
        /// Node visual overrides, unset until loaded
        #[serde(default)]
        pub node_visuals: Option<Vec<Visuals>>,
    }

    impl Default for UiState {
        fn default() -> Self {
            Self {
                current_palette_opened_state: true,
                hide_nav_bar_and_palette_state: false,
                sidebar_contents: SidebarContents::default(),
                current_node_data: CurrentNodeData::default(),
                node_visuals: None,
            }
        }
    }

    // =========================================================================
    // Live Modeling
    // =========================================================================

    /// Lifecycle of the live modeling feature
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum LiveModelingState {
        /// Live modeling is off
        #[default]
        Disabled,
        /// Initial deployment in progress
        Start,
        /// Deployed and in sync with the topology
        Enabled,
        /// Redeployment in progress
        Redeploy,
        /// Instance data refresh in progress
        Update,
        /// Termination in progress
        Terminate,
        /// An invalid transition was requested
        Error,
    }

    impl LiveModelingState {
        /// All states, in declaration order
        pub const ALL: [Self; 7] = [
            Self::Disabled,
            Self::Start,
            Self::Enabled,
            Self::Redeploy,
            Self::Update,
            Self::Terminate,
            Self::Error,
        ];

        /// Whether `requested` may follow `self`
        #[must_use]
        pub fn allows(self, requested: Self) -> bool {
            matches!(
                (self, requested),
                (Self::Disabled, Self::Start)
                    | (Self::Start, Self::Update)
                    | (
                        Self::Enabled,
                        Self::Redeploy | Self::Update | Self::Terminate | Self::Disabled
                    )
                    | (Self::Redeploy | Self::Update, Self::Enabled)
                    | (Self::Terminate, Self::Disabled)
            )
        }

        /// Next state after requesting `requested`.
        ///
        /// `Error` always falls back to `Disabled`; any transition not in the
        /// allow-list lands in `Error`.
        #[must_use]
        pub fn transition(self, requested: Self) -> Self {
            if self == Self::Error {
                Self::Disabled
            } else if self.allows(requested) {
                requested
            } else {
                Self::Error
            }
        }
    }

    impl fmt::Display for LiveModelingState {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let s = match self {
                Self::Disabled => "DISABLED",
                Self::Start => "START",
                Self::Enabled => "ENABLED",
                Self::Redeploy => "REDEPLOY",
                Self::Update => "UPDATE",
                Self::Terminate => "TERMINATE",
                Self::Error => "ERROR",
            };
            f.write_str(s)
        }
    }

    /// Generates `Display`/`FromStr` for container state enums whose wire
    /// names are the upper-case variant names.
    macro_rules! wire_states {
        ($name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
            impl $name {
                /// Wire name of the state
                #[must_use]
                pub fn as_str(self) -> &'static str {
                    match self {
                        $(Self::$variant => $wire,)+
                    }
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            impl FromStr for $name {
                type Err = String;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    match s {
                        $($wire => Ok(Self::$variant),)+
                        other => Err(other.to_string()),
                    }
                }
            }
        };
    }

    /// State of a node template instance on the container
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    #[allow(missing_docs)]
    pub enum NodeTemplateInstanceState {
        Initial,
        Creating,
        Created,
        Configuring,
        Configured,
        Starting,
        Started,
        Stopping,
        Stopped,
        Deleting,
        Deleted,
        Error,
        Migrated,
    }

    wire_states!(NodeTemplateInstanceState {
        Initial => "INITIAL",
        Creating => "CREATING",
        Created => "CREATED",
        Configuring => "CONFIGURING",
        Configured => "CONFIGURED",
        Starting => "STARTING",
        Started => "STARTED",
        Stopping => "STOPPING",
        Stopped => "STOPPED",
        Deleting => "DELETING",
        Deleted => "DELETED",
        Error => "ERROR",
        Migrated => "MIGRATED",
    });

    /// State of a service template instance on the container
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    #[allow(missing_docs)]
    pub enum ServiceTemplateInstanceState {
        Initial,
        Creating,
        Created,
        Deleting,
        Deleted,
        Error,
        Migrating,
        Migrated,
    }

    wire_states!(ServiceTemplateInstanceState {
        Initial => "INITIAL",
        Creating => "CREATING",
        Created => "CREATED",
        Deleting => "DELETING",
        Deleted => "DELETED",
        Error => "ERROR",
        Migrating => "MIGRATING",
        Migrated => "MIGRATED",
    });

    /// Deployment data of one node template
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct NodeTemplateData {
        /// Node template id
        pub id: String,
        /// Instance state on the container, if known
        #[serde(default)]
        pub state: Option<NodeTemplateInstanceState>,
    }

    /// Severity of a live modeling log line
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    #[allow(missing_docs)]
    pub enum LogType {
        Info,
        Success,
        Warning,
        Danger,
    }

    /// One line of the live modeling log
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct LiveModelingLog {
        /// When the line was written
        pub timestamp: DateTime<Utc>,
        /// Message text
        pub message: String,
        /// Severity
        #[serde(rename = "type")]
        pub log_type: LogType,
    }

    impl LiveModelingLog {
        /// Create a log line stamped with the current time
        #[must_use]
        pub fn new(message: impl Into<String>, log_type: LogType) -> Self {
            Self {
                timestamp: Utc::now(),
                message: message.into(),
                log_type,
            }
        }

        /// Informational line
        #[must_use]
        pub fn info(message: impl Into<String>) -> Self {
            Self::new(message, LogType::Info)
        }

        /// Success line
        #[must_use]
        pub fn success(message: impl Into<String>) -> Self {
            Self::new(message, LogType::Success)
        }

        /// Error line
        #[must_use]
        pub fn danger(message: impl Into<String>) -> Self {
            Self::new(message, LogType::Danger)
        }
    }

    /// Live modeling slice of the application state
    #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct LiveModelingData {
        /// Current lifecycle state
        pub state: LiveModelingState,
        /// Per-node deployment data, at most one entry per node id
        #[serde(default)]
        pub node_templates_data: Vec<NodeTemplateData>,
        /// Append-only log
        #[serde(default)]
        pub logs: Vec<LiveModelingLog>,
        /// Deployed service template instance
        #[serde(default)]
        pub current_service_template_instance_id: Option<String>,
        /// Deployed CSAR
        #[serde(default)]
        pub current_csar_id: Option<String>,
        /// Container API base URL
        #[serde(default)]
        pub container_url: Option<String>,
    }

    // =========================================================================
    // Application State
    // =========================================================================

    /// Root of the state tree. Each slice sits behind an `Arc` so that
    /// transitions leave untouched slices pointer-equal.
    #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ApplicationState {
        /// Topology document
        pub topology: Arc<TopologyTemplate>,
        /// UI state
        pub ui: Arc<UiState>,
        /// Live modeling data
        pub live_modeling: Arc<LiveModelingData>,
    }
}

/// Prelude for common imports
pub mod prelude {
    pub use crate::types::*;
    pub use anyhow::{Context, Result};
}
