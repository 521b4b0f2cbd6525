// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! The pure state transition function
//!
//! `reduce` never mutates its input. Every slice that an action does not touch
//! is carried over as the same `Arc`, and so is every node or relationship
//! that is not the target of the action.

use super::action::Action;
use crate::types::{
    ApplicationState, LiveModelingData, NodeAttribute, NodeTemplate, Properties, TopologyTemplate,
    UiState,
};
use std::fmt;
use std::sync::Arc;

/// Identifies an entity an action referred to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityRef {
    /// A node template id
    Node(String),
    /// A relationship template id
    Relationship(String),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(id) => write!(f, "node template '{id}'"),
            Self::Relationship(id) => write!(f, "relationship template '{id}'"),
        }
    }
}

/// What happened to an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The action was applied
    Applied,
    /// The addressed entity does not exist; the state is unchanged
    Missing(EntityRef),
    /// An entity with the same id already exists; the state is unchanged
    Duplicate(EntityRef),
}

impl Outcome {
    /// Whether the action was applied
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Result of one reducer step
#[derive(Debug, Clone)]
pub struct Reduction {
    /// The next state
    pub state: Arc<ApplicationState>,
    /// What happened
    pub outcome: Outcome,
}

impl Reduction {
    fn applied(state: ApplicationState) -> Self {
        Self {
            state: Arc::new(state),
            outcome: Outcome::Applied,
        }
    }

    fn rejected(state: &Arc<ApplicationState>, outcome: Outcome) -> Self {
        Self {
            state: Arc::clone(state),
            outcome,
        }
    }
}

/// Compute the state following `action`
#[must_use]
pub fn reduce(state: &Arc<ApplicationState>, action: &Action) -> Reduction {
    match action {
        Action::SendPaletteOpened(opened) => {
            with_ui(state, |ui| ui.current_palette_opened_state = *opened)
        }
        Action::HideNavBarAndPalette(hidden) => {
            with_ui(state, |ui| ui.hide_nav_bar_and_palette_state = *hidden)
        }
        Action::OpenSidebar(contents) => with_ui(state, |ui| ui.sidebar_contents = contents.clone()),
        Action::SendCurrentNodeId(current) => {
            with_ui(state, |ui| ui.current_node_data = current.clone())
        }
        Action::SetNodeVisuals(visuals) => {
            with_ui(state, |ui| ui.node_visuals = Some(visuals.clone()))
        }

        Action::ChangeMinInstances(change) => {
            update_node(state, &change.id, |_| NodeAttribute::MinInstances(change.count))
        }
        Action::ChangeMaxInstances(change) => {
            update_node(state, &change.id, |_| NodeAttribute::MaxInstances(change.count))
        }
        Action::IncMinInstances(node) => update_node(state, &node.id, |n| {
            NodeAttribute::MinInstances(n.min_instances.saturating_add(1))
        }),
        Action::DecMinInstances(node) => update_node(state, &node.id, |n| {
            NodeAttribute::MinInstances(n.min_instances.saturating_sub(1))
        }),
        Action::IncMaxInstances(node) => update_node(state, &node.id, |n| {
            NodeAttribute::MaxInstances(n.max_instances.saturating_add(1))
        }),
        Action::DecMaxInstances(node) => update_node(state, &node.id, |n| {
            NodeAttribute::MaxInstances(n.max_instances.saturating_sub(1))
        }),
        Action::SetRequirement(update) => update_node(state, &update.node_id, |_| {
            NodeAttribute::Requirements(update.requirements.clone())
        }),
        Action::SetProperty(update) => update_node(state, &update.node_id, |_| {
            NodeAttribute::Properties(Properties::from_typed(
                &update.property_type,
                update.new_property.clone(),
            ))
        }),
        Action::SetCapability(update) => update_node(state, &update.node_id, |_| {
            NodeAttribute::Capabilities(update.capabilities.clone())
        }),
        Action::SetDeploymentArtifact(update) => update_node(state, &update.node_id, |n| {
            let mut artifacts = n.deployment_artifacts.clone().unwrap_or_default();
            artifacts.deployment_artifact.push(update.artifact.clone());
            NodeAttribute::DeploymentArtifacts(artifacts)
        }),
        Action::DeleteDeploymentArtifact(deleted) => update_node(state, &deleted.node_id, |n| {
            let mut artifacts = n.deployment_artifacts.clone().unwrap_or_default();
            artifacts.deployment_artifact.retain(|a| a.name != deleted.name);
            NodeAttribute::DeploymentArtifacts(artifacts)
        }),
        Action::SetPolicy(update) => update_node(state, &update.node_id, |n| {
            let mut policies = n.policies.clone().unwrap_or_default();
            policies.policy.push(update.policy.clone());
            NodeAttribute::Policies(policies)
        }),
        Action::DeletePolicy(deleted) => update_node(state, &deleted.node_id, |n| {
            let mut policies = n.policies.clone().unwrap_or_default();
            policies.policy.retain(|p| p.name != deleted.name);
            NodeAttribute::Policies(policies)
        }),
        Action::SetTargetLocation(update) => update_node(state, &update.node_id, |_| {
            NodeAttribute::Location(update.location.clone())
        }),
        Action::ChangeNodeName(rename) => {
            update_node(state, &rename.id, |_| NodeAttribute::Name(rename.new_name.clone()))
        }
        Action::UpdateNodeCoordinates(moved) => update_node(state, &moved.id, |_| {
            NodeAttribute::Coordinates(crate::types::Coordinates {
                x: moved.x,
                y: moved.y,
            })
        }),
        Action::SetNodeAttribute(update) => {
            update_node(state, &update.node_id, |_| update.attribute.clone())
        }

        Action::SaveNodeTemplate(node) => {
            if state.topology.node(&node.id).is_some() {
                return Reduction::rejected(state, Outcome::Duplicate(EntityRef::Node(node.id.clone())));
            }
            with_topology(state, |t| t.node_templates.push(Arc::new(node.clone())))
        }
        Action::SaveRelationship(relationship) => {
            if state.topology.relationship(&relationship.id).is_some() {
                return Reduction::rejected(
                    state,
                    Outcome::Duplicate(EntityRef::Relationship(relationship.id.clone())),
                );
            }
            with_topology(state, |t| t.relationship_templates.push(Arc::new(relationship.clone())))
        }
        Action::DeleteNodeTemplate(id) => delete_node(state, id),
        Action::DeleteRelationshipTemplate(id) => {
            if state.topology.relationship(id).is_none() {
                return Reduction::rejected(state, Outcome::Missing(EntityRef::Relationship(id.clone())));
            }
            with_topology(state, |t| t.relationship_templates.retain(|r| r.id != *id))
        }
        Action::UpdateRelData(rename) => {
            let Some(index) = state
                .topology
                .relationship_templates
                .iter()
                .position(|r| r.id == rename.id)
            else {
                return Reduction::rejected(
                    state,
                    Outcome::Missing(EntityRef::Relationship(rename.id.clone())),
                );
            };
            with_topology(state, |t| {
                let renamed = t.relationship_templates[index].with_name(rename.new_name.clone());
                t.relationship_templates[index] = Arc::new(renamed);
            })
        }

        Action::SetLiveModelingState(requested) => {
            with_live_modeling(state, |data| data.state = data.state.transition(*requested))
        }
        Action::SetNodeLiveModelingData(node_data) => with_live_modeling(state, |data| {
            match data.node_templates_data.iter().position(|d| d.id == node_data.id) {
                Some(index) => data.node_templates_data[index] = node_data.clone(),
                None => data.node_templates_data.push(node_data.clone()),
            }
        }),
        Action::DeleteNodeLiveModelingData => {
            with_live_modeling(state, |data| data.node_templates_data.clear())
        }
        Action::SendLiveModelingLog(log) => {
            with_live_modeling(state, |data| data.logs.push(log.clone()))
        }
        Action::SetCurrentServiceTemplateInstanceId(id) => with_live_modeling(state, |data| {
            data.current_service_template_instance_id = Some(id.clone());
        }),
        Action::SetCurrentCsarId(id) => {
            with_live_modeling(state, |data| data.current_csar_id = Some(id.clone()))
        }
        Action::SetContainerUrl(url) => {
            with_live_modeling(state, |data| data.container_url = Some(url.clone()))
        }
    }
}

fn with_ui(state: &Arc<ApplicationState>, update: impl FnOnce(&mut UiState)) -> Reduction {
    let mut ui = (*state.ui).clone();
    update(&mut ui);
    Reduction::applied(ApplicationState {
        ui: Arc::new(ui),
        ..(**state).clone()
    })
}

fn with_topology(state: &Arc<ApplicationState>, update: impl FnOnce(&mut TopologyTemplate)) -> Reduction {
    // Cloning the template only clones the `Arc`s of its elements.
    let mut topology = (*state.topology).clone();
    update(&mut topology);
    Reduction::applied(ApplicationState {
        topology: Arc::new(topology),
        ..(**state).clone()
    })
}

fn with_live_modeling(
    state: &Arc<ApplicationState>,
    update: impl FnOnce(&mut LiveModelingData),
) -> Reduction {
    let mut data = (*state.live_modeling).clone();
    update(&mut data);
    Reduction::applied(ApplicationState {
        live_modeling: Arc::new(data),
        ..(**state).clone()
    })
}

/// Replace one node with a copy carrying the attribute computed by `attribute`
fn update_node(
    state: &Arc<ApplicationState>,
    id: &str,
    attribute: impl FnOnce(&NodeTemplate) -> NodeAttribute,
) -> Reduction {
    let Some(index) = state.topology.node_templates.iter().position(|n| n.id == id) else {
        return Reduction::rejected(state, Outcome::Missing(EntityRef::Node(id.to_string())));
    };
    with_topology(state, |t| {
        let current: &NodeTemplate = &t.node_templates[index];
        let updated = current.with_attribute(attribute(current));
        t.node_templates[index] = Arc::new(updated);
    })
}

fn delete_node(state: &Arc<ApplicationState>, id: &str) -> Reduction {
    let exists = state.topology.node(id).is_some();
    let dangling = state
        .topology
        .relationship_templates
        .iter()
        .any(|r| r.references(id));
    if !exists && !dangling {
        return Reduction::rejected(state, Outcome::Missing(EntityRef::Node(id.to_string())));
    }

    let mut reduction = with_topology(state, |t| {
        t.node_templates.retain(|n| n.id != id);
        t.relationship_templates.retain(|r| !r.references(id));
    });
    if !exists {
        reduction.outcome = Outcome::Missing(EntityRef::Node(id.to_string()));
    }
    reduction
}
