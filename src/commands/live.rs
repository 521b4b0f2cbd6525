// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Live modeling commands - deploy, migrate and terminate against a container

use super::Output;
use crate::config::Config;
use crate::container::{ContainerClient, InputParameter};
use crate::session::LiveModelingSession;
use crate::store::{persist, Action, Store};
use crate::types::{LogType, NodeTemplateInstanceState};
use anyhow::{Context, Result};
use std::future::Future;
use std::sync::Arc;

fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    Ok(runtime.block_on(future))
}

fn client(config: &Config) -> Result<ContainerClient> {
    ContainerClient::new(config.container_url.as_str(), config.request_timeout())
        .context("Failed to create container client")
}

fn to_inputs(pairs: Vec<(String, String)>) -> Vec<InputParameter> {
    pairs
        .into_iter()
        .map(|(name, value)| InputParameter::with_value(name, value))
        .collect()
}

/// Run `step` in a session over the stored state, then save the state even
/// when the step failed so the live modeling log is kept
fn with_session<T, F, Fut>(config: &Config, step: F) -> Result<T>
where
    F: FnOnce(LiveModelingSession) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let store = Arc::new(Store::new(persist::load(&config.data_dir)?));
    store.dispatch(Action::SetContainerUrl(config.container_url.clone()));
    let session = LiveModelingSession::new(Arc::clone(&store), client(config)?, config.poll_settings());

    let result = block_on(step(session))?;
    persist::save(&config.data_dir, &store.state())?;
    result
}

/// Deploy `csar` and enable live modeling
pub fn deploy(config: &Config, csar: &str, inputs: Vec<(String, String)>, out: Output) -> Result<()> {
    let inputs = to_inputs(inputs);
    let instance = with_session(config, |session| async move {
        session.start(csar, &inputs).await
    })?;
    println!("{} instance {}", out.ok("Deployed"), instance);
    Ok(())
}

/// Migrate the deployed instance to `target`
pub fn migrate(config: &Config, target: &str, inputs: Vec<(String, String)>, out: Output) -> Result<()> {
    let inputs = to_inputs(inputs);
    let instance = with_session(config, |session| async move {
        session.migrate(target, &inputs).await
    })?;
    println!("{} to {} as instance {}", out.ok("Migrated"), target, instance);
    Ok(())
}

/// Terminate the deployed instance
pub fn terminate(config: &Config, out: Output) -> Result<()> {
    with_session(config, |session| async move { session.terminate().await })?;
    println!("{}", out.ok("Terminated"));
    Ok(())
}

/// Refresh node template instance states
pub fn refresh(config: &Config, out: Output) -> Result<()> {
    with_session(config, |session| async move { session.refresh_node_data().await })?;
    let state = persist::load(&config.data_dir)?;
    for data in &state.live_modeling.node_templates_data {
        let text = data.state.map_or_else(|| "unknown".to_string(), |s| s.to_string());
        println!("  {:<20} {}", data.id, out.dim(&text));
    }
    Ok(())
}

/// Print the live modeling log
pub fn logs(config: &Config, out: Output) -> Result<()> {
    let state = persist::load(&config.data_dir)?;
    let logs = &state.live_modeling.logs;

    if out.json {
        println!("{}", serde_json::to_string_pretty(logs)?);
        return Ok(());
    }

    for entry in logs {
        let message = match entry.log_type {
            LogType::Info => entry.message.clone(),
            LogType::Success => out.ok(&entry.message),
            LogType::Warning => out.warn(&entry.message),
            LogType::Danger => out.error(&entry.message),
        };
        println!(
            "{} {}",
            out.dim(&entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
            message
        );
    }
    Ok(())
}

/// List the build plan inputs of `csar`
pub fn inputs(config: &Config, csar: &str, all: bool, out: Output) -> Result<()> {
    let client = client(config)?;
    let params = block_on(async {
        if all {
            client.all_build_plan_input_parameters(csar).await
        } else {
            client.required_build_plan_input_parameters(csar).await
        }
    })??;

    if out.json {
        println!("{}", serde_json::to_string_pretty(&params)?);
        return Ok(());
    }

    if params.is_empty() {
        println!("No inputs required");
    }
    for param in &params {
        println!(
            "  {:<32} {} {}",
            param.name,
            out.dim(&param.param_type),
            if param.required == "YES" { out.warn("required") } else { String::new() }
        );
    }
    Ok(())
}

/// Print the state of a service template instance, or of one of its node
/// template instances; with `set`, overwrite the node instance state
pub fn instance_state(
    config: &Config,
    csar: &str,
    instance: &str,
    node: Option<&str>,
    set: Option<NodeTemplateInstanceState>,
) -> Result<()> {
    let client = client(config)?;
    let state = block_on(async {
        match (node, set) {
            (Some(node), Some(state)) => client
                .update_node_template_instance_state(csar, instance, node, state)
                .await
                .map(|()| state.to_string()),
            (Some(node), None) => client
                .node_template_instance_state(csar, instance, node)
                .await
                .map(|s| s.to_string()),
            (None, _) => client
                .service_template_instance_state(csar, instance)
                .await
                .map(|s| s.to_string()),
        }
    })??;
    println!("{state}");
    Ok(())
}
