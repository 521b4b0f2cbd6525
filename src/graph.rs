// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Graph view over a topology template for validation and export

use crate::types::{NodeTemplate, RelationshipTemplate, TopologyTemplate};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt::Write as _;
use std::sync::Arc;

/// A relationship whose source or target node does not exist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingRelationship {
    /// Relationship id
    pub id: String,
    /// Referenced node ids that are missing
    pub missing: Vec<String>,
}

/// Problems found in a topology
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Ids used by more than one node or relationship
    pub duplicate_ids: Vec<String>,
    /// Relationships pointing at absent nodes
    pub dangling: Vec<DanglingRelationship>,
}

impl ValidationReport {
    /// Whether no problem was found
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.duplicate_ids.is_empty() && self.dangling.is_empty()
    }
}

/// Topology backed by a petgraph `DiGraph`. Nodes carry node templates,
/// edges carry relationship templates.
pub struct TopologyGraph {
    graph: DiGraph<Arc<NodeTemplate>, Arc<RelationshipTemplate>>,
    node_indices: HashMap<String, NodeIndex>,
    template: TopologyTemplate,
}

impl TopologyGraph {
    /// Build the graph. Relationships with a missing endpoint are kept in the
    /// template but have no edge.
    #[must_use]
    pub fn from_template(template: &TopologyTemplate) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();

        for node in &template.node_templates {
            let idx = graph.add_node(Arc::clone(node));
            node_indices.entry(node.id.clone()).or_insert(idx);
        }

        for rel in &template.relationship_templates {
            if let (Some(&from), Some(&to)) = (
                node_indices.get(&rel.source_element.reference),
                node_indices.get(&rel.target_element.reference),
            ) {
                graph.add_edge(from, to, Arc::clone(rel));
            }
        }

        Self {
            graph,
            node_indices,
            template: template.clone(),
        }
    }

    /// Number of nodes
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of relationships that connect two existing nodes
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Relationships leaving node `id`
    #[must_use]
    pub fn outgoing(&self, id: &str) -> Vec<&RelationshipTemplate> {
        self.edges(id, Direction::Outgoing)
    }

    /// Relationships arriving at node `id`
    #[must_use]
    pub fn incoming(&self, id: &str) -> Vec<&RelationshipTemplate> {
        self.edges(id, Direction::Incoming)
    }

    fn edges(&self, id: &str, direction: Direction) -> Vec<&RelationshipTemplate> {
        let Some(&idx) = self.node_indices.get(id) else {
            return Vec::new();
        };
        let mut rels: Vec<&RelationshipTemplate> = self
            .graph
            .edges_directed(idx, direction)
            .map(|edge| edge.weight().as_ref())
            .collect();
        // petgraph walks edges newest first
        rels.reverse();
        rels
    }

    /// Relationships whose source or target node is absent
    #[must_use]
    pub fn dangling_relationships(&self) -> Vec<DanglingRelationship> {
        self.template
            .relationship_templates
            .iter()
            .filter_map(|rel| {
                let missing: Vec<String> = [&rel.source_element.reference, &rel.target_element.reference]
                    .into_iter()
                    .filter(|id| !self.node_indices.contains_key(*id))
                    .cloned()
                    .collect();
                (!missing.is_empty()).then(|| DanglingRelationship {
                    id: rel.id.clone(),
                    missing,
                })
            })
            .collect()
    }

    /// Ids occurring more than once among nodes, or among relationships
    #[must_use]
    pub fn duplicate_ids(&self) -> Vec<String> {
        let mut seen_nodes = BTreeSet::new();
        let mut seen_rels = BTreeSet::new();
        let mut duplicates = BTreeSet::new();

        for node in &self.template.node_templates {
            if !seen_nodes.insert(node.id.as_str()) {
                duplicates.insert(node.id.clone());
            }
        }
        for rel in &self.template.relationship_templates {
            if !seen_rels.insert(rel.id.as_str()) {
                duplicates.insert(rel.id.clone());
            }
        }
        duplicates.into_iter().collect()
    }

    /// Run every check
    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        ValidationReport {
            duplicate_ids: self.duplicate_ids(),
            dangling: self.dangling_relationships(),
        }
    }

    /// Export to DOT format for Graphviz
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph topology {\n");
        dot.push_str("  rankdir=LR;\n");
        dot.push_str("  node [shape=box, style=rounded];\n\n");

        for node in self.graph.node_weights() {
            let label = format!("{}\\n{}", escape(&node.name), escape(short_type(&node.node_type)));
            let _ = writeln!(dot, "  \"{}\" [label=\"{}\"];", escape(&node.id), label);
        }

        dot.push('\n');

        for edge in self.graph.edge_indices() {
            let (Some((from, to)), Some(rel)) =
                (self.graph.edge_endpoints(edge), self.graph.edge_weight(edge))
            else {
                continue;
            };
            let _ = writeln!(
                dot,
                "  \"{}\" -> \"{}\" [label=\"{}\"];",
                escape(&self.graph[from].id),
                escape(&self.graph[to].id),
                escape(short_type(&rel.relationship_type))
            );
        }

        dot.push_str("}\n");
        dot
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Local part of a `{namespace}LocalName` qualified type
fn short_type(qname: &str) -> &str {
    qname.rsplit_once('}').map_or(qname, |(_, local)| local)
}
