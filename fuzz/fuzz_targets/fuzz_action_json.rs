// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
#![no_main]

use libfuzzer_sys::fuzz_target;
use std::sync::Arc;
use tosca_modeler::store::{reduce, Action};
use tosca_modeler::types::ApplicationState;

// Any action that parses must reduce without panicking.
fuzz_target!(|data: &[u8]| {
    if let Ok(actions) = serde_json::from_slice::<Vec<Action>>(data) {
        let mut state = Arc::new(ApplicationState::default());
        for action in &actions {
            state = reduce(&state, action).state;
        }
    }
});
