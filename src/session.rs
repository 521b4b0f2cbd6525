// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Live modeling session
//!
//! Drives the live modeling state machine in the [`Store`] from the results
//! of [`ContainerClient`] calls. Every step is mirrored into the live
//! modeling log; a failed step logs the error and moves the state machine to
//! `ERROR`.

use crate::container::{ContainerClient, InputParameter, PollSettings};
use crate::store::{Action, Store};
use crate::types::{
    LiveModelingLog, LiveModelingState, NodeTemplateData, ServiceTemplateInstanceState,
};
use anyhow::{bail, Context, Result};
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info};

/// A live modeling run bound to one store and one container
#[derive(Debug, Clone)]
pub struct LiveModelingSession {
    store: Arc<Store>,
    client: ContainerClient,
    poll: PollSettings,
}

impl LiveModelingSession {
    /// Create a session
    #[must_use]
    pub fn new(store: Arc<Store>, client: ContainerClient, poll: PollSettings) -> Self {
        Self { store, client, poll }
    }

    /// The store this session dispatches into
    #[must_use]
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    fn log(&self, entry: LiveModelingLog) {
        self.store.dispatch(Action::SendLiveModelingLog(entry));
    }

    /// Request `requested` and fail if the state machine refused it
    fn enter(&self, requested: LiveModelingState) -> Result<()> {
        self.store.dispatch(Action::SetLiveModelingState(requested));
        let actual = self.store.state().live_modeling.state;
        if actual != requested {
            bail!("live modeling cannot enter {} (now {})", requested, actual);
        }
        Ok(())
    }

    async fn guarded<T, F>(&self, step: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match step.await {
            Ok(value) => Ok(value),
            Err(e) => {
                error!("live modeling failed: {:#}", e);
                self.log(LiveModelingLog::danger(format!("{e:#}")));
                // A second ERROR request would leave ERROR for DISABLED.
                if self.store.state().live_modeling.state != LiveModelingState::Error {
                    self.store
                        .dispatch(Action::SetLiveModelingState(LiveModelingState::Error));
                }
                Err(e)
            }
        }
    }

    fn current_ids(&self) -> Result<(String, String)> {
        let state = self.store.state();
        let csar = state
            .live_modeling
            .current_csar_id
            .clone()
            .context("no CSAR selected for live modeling")?;
        let instance = state
            .live_modeling
            .current_service_template_instance_id
            .clone()
            .context("no service template instance deployed")?;
        Ok((csar, instance))
    }

    /// Deploy `csar_id` and bring live modeling to `ENABLED`.
    ///
    /// Returns the id of the new service template instance.
    pub async fn start(&self, csar_id: &str, inputs: &[InputParameter]) -> Result<String> {
        if self.store.state().live_modeling.state == LiveModelingState::Error {
            // Acknowledge the previous failure before starting over.
            self.store
                .dispatch(Action::SetLiveModelingState(LiveModelingState::Disabled));
        }
        self.guarded(self.run_start(csar_id, inputs)).await
    }

    async fn run_start(&self, csar_id: &str, inputs: &[InputParameter]) -> Result<String> {
        self.enter(LiveModelingState::Start)?;
        self.store
            .dispatch(Action::SetCurrentCsarId(csar_id.to_string()));

        info!(csar = csar_id, "deploying");
        self.log(LiveModelingLog::info(format!("Deploying {csar_id}")));
        let correlation_id = self
            .client
            .deploy_service_template_instance(csar_id, inputs)
            .await
            .context("failed to start build plan")?;

        self.log(LiveModelingLog::info("Waiting for service template instance id"));
        let instance_id = self
            .client
            .wait_for_service_template_instance_id_after_deployment(csar_id, &correlation_id, self.poll)
            .await
            .context("build plan did not report an instance id")?;
        self.store
            .dispatch(Action::SetCurrentServiceTemplateInstanceId(instance_id.clone()));
        self.log(LiveModelingLog::info(format!(
            "Service template instance {instance_id} created, waiting for deployment"
        )));

        let reached = self
            .client
            .wait_for_service_template_instance_in_state(
                csar_id,
                &instance_id,
                ServiceTemplateInstanceState::Created,
                self.poll,
            )
            .await
            .context("deployment did not finish")?;
        if reached == ServiceTemplateInstanceState::Error {
            bail!("service template instance {} failed to deploy", instance_id);
        }

        self.enter(LiveModelingState::Update)?;
        self.load_node_data(csar_id, &instance_id).await?;
        self.enter(LiveModelingState::Enabled)?;

        info!(csar = csar_id, instance = %instance_id, "live modeling enabled");
        self.log(LiveModelingLog::success("Live modeling enabled"));
        Ok(instance_id)
    }

    /// Re-read the state of every node template instance into the store
    pub async fn refresh_node_data(&self) -> Result<()> {
        let (csar, instance) = self.current_ids()?;
        self.guarded(self.load_node_data(&csar, &instance)).await
    }

    async fn load_node_data(&self, csar_id: &str, instance_id: &str) -> Result<()> {
        self.log(LiveModelingLog::info("Fetching node template instance data"));
        let nodes = self
            .client
            .node_templates(csar_id)
            .await
            .context("failed to list node templates")?;

        for node in nodes {
            // Nodes without an instance (yet) are recorded with an unknown state.
            let state = self
                .client
                .node_template_instance_state(csar_id, instance_id, &node.id)
                .await
                .ok();
            self.store
                .dispatch(Action::SetNodeLiveModelingData(NodeTemplateData { id: node.id, state }));
        }
        Ok(())
    }

    /// Migrate the current instance to `target_csar_id` with a generated
    /// transformation plan. Returns the id of the migrated instance.
    pub async fn migrate(&self, target_csar_id: &str, inputs: &[InputParameter]) -> Result<String> {
        self.guarded(self.run_migrate(target_csar_id, inputs)).await
    }

    async fn run_migrate(&self, target_csar_id: &str, inputs: &[InputParameter]) -> Result<String> {
        let (source_csar_id, instance_id) = self.current_ids()?;
        self.enter(LiveModelingState::Redeploy)?;

        info!(source = %source_csar_id, target = target_csar_id, "migrating");
        self.log(LiveModelingLog::info(format!(
            "Generating transformation plan from {source_csar_id} to {target_csar_id}"
        )));
        self.client
            .generate_transformation_plan(&source_csar_id, target_csar_id)
            .await
            .context("failed to generate transformation plan")?;

        let correlation_id = self
            .client
            .execute_transformation_plan(&instance_id, &source_csar_id, target_csar_id, inputs)
            .await
            .context("failed to start transformation plan")?;
        self.log(LiveModelingLog::info("Waiting for migrated service template instance"));

        let migrated_id = self
            .client
            .wait_for_service_template_instance_id_after_migration(
                &source_csar_id,
                &instance_id,
                &correlation_id,
                &source_csar_id,
                target_csar_id,
                self.poll,
            )
            .await
            .context("transformation plan did not report an instance id")?;

        self.store
            .dispatch(Action::SetCurrentCsarId(target_csar_id.to_string()));
        self.store
            .dispatch(Action::SetCurrentServiceTemplateInstanceId(migrated_id.clone()));
        self.store.dispatch(Action::DeleteNodeLiveModelingData);
        self.enter(LiveModelingState::Enabled)?;

        self.enter(LiveModelingState::Update)?;
        self.load_node_data(target_csar_id, &migrated_id).await?;
        self.enter(LiveModelingState::Enabled)?;

        self.log(LiveModelingLog::success(format!(
            "Migrated to {target_csar_id}, instance {migrated_id}"
        )));
        Ok(migrated_id)
    }

    /// Terminate the current instance and bring live modeling to `DISABLED`
    pub async fn terminate(&self) -> Result<()> {
        self.guarded(self.run_terminate()).await
    }

    async fn run_terminate(&self) -> Result<()> {
        let (csar_id, instance_id) = self.current_ids()?;
        self.enter(LiveModelingState::Terminate)?;

        info!(csar = %csar_id, instance = %instance_id, "terminating");
        self.log(LiveModelingLog::info(format!(
            "Terminating service template instance {instance_id}"
        )));
        self.client
            .terminate_service_template_instance(&csar_id, &instance_id)
            .await
            .context("failed to start termination plan")?;

        let reached = self
            .client
            .wait_for_service_template_instance_in_state(
                &csar_id,
                &instance_id,
                ServiceTemplateInstanceState::Deleted,
                self.poll,
            )
            .await
            .context("termination did not finish")?;
        if reached == ServiceTemplateInstanceState::Error {
            bail!("service template instance {} failed to terminate", instance_id);
        }

        self.store.dispatch(Action::DeleteNodeLiveModelingData);
        self.enter(LiveModelingState::Disabled)?;
        self.log(LiveModelingLog::success("Service template instance terminated"));
        Ok(())
    }
}
