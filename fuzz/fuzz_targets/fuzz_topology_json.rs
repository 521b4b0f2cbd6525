// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
#![no_main]

use libfuzzer_sys::fuzz_target;
use tosca_modeler::graph::TopologyGraph;
use tosca_modeler::types::TopologyTemplate;

fuzz_target!(|data: &[u8]| {
    if let Ok(template) = serde_json::from_slice::<TopologyTemplate>(data) {
        let graph = TopologyGraph::from_template(&template);
        let _ = graph.validate();
        let _ = graph.to_dot();
    }
});
