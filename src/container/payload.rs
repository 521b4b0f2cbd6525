// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Fixed plan payloads, reserved parameter names and URL helpers

use super::model::InputParameter;

/// Parameters the container injects into every build plan run
pub const BASE_INSTALLATION_PARAMETERS: [&str; 3] =
    ["instanceDataAPIUrl", "csarEntrypoint", "CorrelationID"];

/// Parameters the container injects into every termination plan run
pub const BASE_TERMINATION_PARAMETERS: [&str; 3] = [
    "instanceDataAPIUrl",
    "OpenTOSCAContainerAPIServiceInstanceURL",
    "CorrelationID",
];

/// Parameters the container injects into every transformation plan run
pub const BASE_TRANSFORMATION_PARAMETERS: [&str; 5] = [
    "CorrelationID",
    "instanceDataAPIUrl",
    "planCallbackAddress_invoker",
    "csarEntrypoint",
    "OpenTOSCAContainerAPIServiceInstanceURL",
];

/// Framework parameters a user must never edit
pub const HIDDEN_INPUT_PARAMETERS: [&str; 9] = [
    "CorrelationID",
    "csarID",
    "serviceTemplateID",
    "containerApiAddress",
    "instanceDataAPIUrl",
    "planCallbackAddress_invoker",
    "csarEntrypoint",
    "OpenTOSCAContainerAPIServiceInstanceID",
    "OpenTOSCAContainerAPIServiceInstanceURL",
];

const CSAR_SUFFIX: &str = ".csar";

/// Caller inputs followed by the base parameters
#[must_use]
pub fn with_base_parameters(inputs: &[InputParameter], base: &[&str]) -> Vec<InputParameter> {
    inputs
        .iter()
        .cloned()
        .chain(base.iter().map(|name| InputParameter::required(name)))
        .collect()
}

/// Whether `name` is reserved for the framework
#[must_use]
pub fn is_hidden(name: &str) -> bool {
    HIDDEN_INPUT_PARAMETERS.iter().any(|hidden| *hidden == name)
}

/// Drop reserved parameters
#[must_use]
pub fn visible_parameters(params: Vec<InputParameter>) -> Vec<InputParameter> {
    params.into_iter().filter(|p| !is_hidden(&p.name)).collect()
}

/// Strip a trailing `.csar` from a CSAR id
#[must_use]
pub fn strip_csar_suffix(csar_id: &str) -> &str {
    csar_id.strip_suffix(CSAR_SUFFIX).unwrap_or(csar_id)
}

/// Id of the plan migrating instances of `source` to `target`
#[must_use]
pub fn transformation_plan_id(source_csar_id: &str, target_csar_id: &str) -> String {
    format!(
        "{}_transformTo_{}_plan",
        strip_csar_suffix(source_csar_id),
        strip_csar_suffix(target_csar_id)
    )
}

/// Join a base URL and a relative path with exactly one slash
#[must_use]
pub fn combine_urls(base_url: &str, relative_url: &str) -> String {
    if relative_url.is_empty() {
        return base_url.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        relative_url.trim_start_matches('/')
    )
}
