// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Actions accepted by the reducer
//!
//! Actions serialize as `{"type": "SEND_PALETTE_OPENED", "payload": ...}` so a
//! recorded session can be replayed from a JSON file.

use crate::types::{
    Capabilities, CurrentNodeData, DeploymentArtifact, LiveModelingLog, LiveModelingState,
    NodeAttribute, NodeTemplate, NodeTemplateData, Policy, RelationshipTemplate, Requirements,
    SidebarContents, Visuals,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Explicit instance count for a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceCount {
    /// Node id
    pub id: String,
    /// New count
    pub count: u32,
}

/// Node addressed by an increment or decrement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeId {
    /// Node id
    pub id: String,
}

/// Requirement replacement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRequirements {
    /// Node id
    pub node_id: String,
    /// New requirements
    pub requirements: Requirements,
}

/// Property replacement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeProperty {
    /// Node id
    pub node_id: String,
    /// Property type tag, `KV` for key-value properties
    pub property_type: String,
    /// New property value
    pub new_property: Value,
}

/// Capability replacement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeCapabilities {
    /// Node id
    pub node_id: String,
    /// New capabilities
    pub capabilities: Capabilities,
}

/// Deployment artifact to append
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDeploymentArtifact {
    /// Node id
    pub node_id: String,
    /// Artifact to append
    pub artifact: DeploymentArtifact,
}

/// Policy to append
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPolicy {
    /// Node id
    pub node_id: String,
    /// Policy to append
    pub policy: Policy,
}

/// Named element to remove from a node collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedElement {
    /// Node id
    pub node_id: String,
    /// Element name
    pub name: String,
}

/// Target location change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetLocation {
    /// Node id
    pub node_id: String,
    /// New location, `None` clears it
    pub location: Option<String>,
}

/// Rename of a node or relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rename {
    /// Element id
    pub id: String,
    /// New name
    pub new_name: String,
}

/// Node moved on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveNode {
    /// Node id
    pub id: String,
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

/// Generic attribute replacement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetAttribute {
    /// Node id
    pub node_id: String,
    /// Attribute and its new value
    pub attribute: NodeAttribute,
}

/// Every state change the modeler can request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Open or close the palette
    SendPaletteOpened(bool),
    /// Hide or show navbar and palette
    #[serde(rename = "HIDE_NAVBAR_AND_PALETTE")]
    HideNavBarAndPalette(bool),
    /// Replace the sidebar contents
    OpenSidebar(SidebarContents),
    /// Set the minimum instance count
    ChangeMinInstances(InstanceCount),
    /// Set the maximum instance count
    ChangeMaxInstances(InstanceCount),
    /// Increment the minimum instance count
    IncMinInstances(NodeId),
    /// Decrement the minimum instance count
    DecMinInstances(NodeId),
    /// Increment the maximum instance count
    IncMaxInstances(NodeId),
    /// Decrement the maximum instance count
    DecMaxInstances(NodeId),
    /// Replace requirements
    SetRequirement(NodeRequirements),
    /// Replace properties
    SetProperty(NodeProperty),
    /// Replace capabilities
    SetCapability(NodeCapabilities),
    /// Append a deployment artifact
    SetDeploymentArtifact(NewDeploymentArtifact),
    /// Remove a deployment artifact by name
    DeleteDeploymentArtifact(NamedElement),
    /// Append a policy
    SetPolicy(NewPolicy),
    /// Remove a policy by name
    DeletePolicy(NamedElement),
    /// Set the target location
    SetTargetLocation(TargetLocation),
    /// Rename a node
    ChangeNodeName(Rename),
    /// Move a node
    UpdateNodeCoordinates(MoveNode),
    /// Replace any single node attribute
    SetNodeAttribute(SetAttribute),
    /// Add a node
    SaveNodeTemplate(NodeTemplate),
    /// Add a relationship
    SaveRelationship(RelationshipTemplate),
    /// Remove a node and every relationship touching it
    DeleteNodeTemplate(String),
    /// Remove a relationship
    DeleteRelationshipTemplate(String),
    /// Rename a relationship
    #[serde(rename = "UPDATE_REL_DATA")]
    UpdateRelData(Rename),
    /// Focus a node
    SendCurrentNodeId(CurrentNodeData),
    /// Replace node visuals
    SetNodeVisuals(Vec<Visuals>),
    /// Request a live modeling state transition
    SetLiveModelingState(LiveModelingState),
    /// Upsert deployment data for one node
    SetNodeLiveModelingData(NodeTemplateData),
    /// Drop all per-node deployment data
    DeleteNodeLiveModelingData,
    /// Append a log line
    SendLiveModelingLog(LiveModelingLog),
    /// Set the deployed service template instance
    SetCurrentServiceTemplateInstanceId(String),
    /// Set the deployed CSAR
    SetCurrentCsarId(String),
    /// Set the container API base URL
    SetContainerUrl(String),
}

impl Action {
    /// Wire tag of this action
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::SendPaletteOpened(_) => "SEND_PALETTE_OPENED",
            Self::HideNavBarAndPalette(_) => "HIDE_NAVBAR_AND_PALETTE",
            Self::OpenSidebar(_) => "OPEN_SIDEBAR",
            Self::ChangeMinInstances(_) => "CHANGE_MIN_INSTANCES",
            Self::ChangeMaxInstances(_) => "CHANGE_MAX_INSTANCES",
            Self::IncMinInstances(_) => "INC_MIN_INSTANCES",
            Self::DecMinInstances(_) => "DEC_MIN_INSTANCES",
            Self::IncMaxInstances(_) => "INC_MAX_INSTANCES",
            Self::DecMaxInstances(_) => "DEC_MAX_INSTANCES",
            Self::SetRequirement(_) => "SET_REQUIREMENT",
            Self::SetProperty(_) => "SET_PROPERTY",
            Self::SetCapability(_) => "SET_CAPABILITY",
            Self::SetDeploymentArtifact(_) => "SET_DEPLOYMENT_ARTIFACT",
            Self::DeleteDeploymentArtifact(_) => "DELETE_DEPLOYMENT_ARTIFACT",
            Self::SetPolicy(_) => "SET_POLICY",
            Self::DeletePolicy(_) => "DELETE_POLICY",
            Self::SetTargetLocation(_) => "SET_TARGET_LOCATION",
            Self::ChangeNodeName(_) => "CHANGE_NODE_NAME",
            Self::UpdateNodeCoordinates(_) => "UPDATE_NODE_COORDINATES",
            Self::SetNodeAttribute(_) => "SET_NODE_ATTRIBUTE",
            Self::SaveNodeTemplate(_) => "SAVE_NODE_TEMPLATE",
            Self::SaveRelationship(_) => "SAVE_RELATIONSHIP",
            Self::DeleteNodeTemplate(_) => "DELETE_NODE_TEMPLATE",
            Self::DeleteRelationshipTemplate(_) => "DELETE_RELATIONSHIP_TEMPLATE",
            Self::UpdateRelData(_) => "UPDATE_REL_DATA",
            Self::SendCurrentNodeId(_) => "SEND_CURRENT_NODE_ID",
            Self::SetNodeVisuals(_) => "SET_NODE_VISUALS",
            Self::SetLiveModelingState(_) => "SET_LIVE_MODELING_STATE",
            Self::SetNodeLiveModelingData(_) => "SET_NODE_LIVE_MODELING_DATA",
            Self::DeleteNodeLiveModelingData => "DELETE_NODE_LIVE_MODELING_DATA",
            Self::SendLiveModelingLog(_) => "SEND_LIVE_MODELING_LOG",
            Self::SetCurrentServiceTemplateInstanceId(_) => {
                "SET_CURRENT_SERVICE_TEMPLATE_INSTANCE_ID"
            }
            Self::SetCurrentCsarId(_) => "SET_CURRENT_CSAR_ID",
            Self::SetContainerUrl(_) => "SET_CONTAINER_URL",
        }
    }
}
