// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Hypermedia client for the OpenTOSCA container API
//!
//! Only the `csars` collection is addressed by URL; everything below it is
//! reached by following `_links` relations from the previous response.

use super::error::{ContainerError, ContainerResult};
use super::model::{
    rel, ContainerNodeTemplate, Csar, CsarUpload, InputParameter, NodeTemplateInstance,
    NodeTemplateInstanceResources, NodeTemplateResources, OutputParameter, Plan,
    PlanInstance, PlanInstanceResources, PlanLogEntry, PlanResources, PlanType,
    ServiceTemplate, ServiceTemplateInstance, ServiceTemplateInstanceResources, TransformRequest,
};
use super::payload::{
    combine_urls, transformation_plan_id, visible_parameters, with_base_parameters,
    BASE_INSTALLATION_PARAMETERS, BASE_TERMINATION_PARAMETERS, BASE_TRANSFORMATION_PARAMETERS,
};
use super::poll::{poll_until, PollSettings};
use crate::types::{NodeTemplateInstanceState, ServiceTemplateInstanceState};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument, trace};

const CSARS: &str = "csars";
const INSTANCE_ID_OUTPUT: &str = "instanceId";

/// Client for one container instance
#[derive(Debug, Clone)]
pub struct ContainerClient {
    http: Client,
    base_url: String,
}

impl ContainerClient {
    /// Create a client for the container at `base_url`; each request times
    /// out after `request_timeout`
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> ContainerResult<Self> {
        let http = Client::builder().timeout(request_timeout).build()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client reusing an existing `reqwest::Client`
    #[must_use]
    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Container API base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn csar_url(&self, csar_id: &str) -> String {
        combine_urls(&combine_urls(&self.base_url, CSARS), csar_id)
    }

    // =====================================================================
    // HTTP primitives
    // =====================================================================

    fn check(url: &str, response: Response) -> ContainerResult<Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(ContainerError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            })
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> ContainerResult<T> {
        trace!(url, "GET");
        let response = self.http.get(url).header(ACCEPT, "application/json").send().await?;
        let response = Self::check(url, response)?;
        Ok(response.json().await?)
    }

    async fn post_json<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> ContainerResult<String> {
        trace!(url, "POST");
        let response = self.http.post(url).json(body).send().await?;
        let response = Self::check(url, response)?;
        Ok(response.text().await?)
    }

    async fn put_text(&self, url: &str, body: String) -> ContainerResult<()> {
        trace!(url, "PUT");
        let response = self
            .http
            .put(url)
            .header(CONTENT_TYPE, "text/plain")
            .body(body)
            .send()
            .await?;
        Self::check(url, response)?;
        Ok(())
    }

    // =====================================================================
    // Applications
    // =====================================================================

    /// Ask the container to install a CSAR from a URL
    #[instrument(skip(self, upload), fields(csar = %upload.name))]
    pub async fn install_application(&self, upload: &CsarUpload) -> ContainerResult<()> {
        let url = combine_urls(&self.base_url, CSARS);
        self.post_json(&url, upload).await?;
        Ok(())
    }

    /// Whether the CSAR is installed; any failure counts as "no"
    pub async fn is_application_installed(&self, csar_id: &str) -> bool {
        let url = self.csar_url(csar_id);
        match self.http.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("install check for {} failed: {}", csar_id, e);
                false
            }
        }
    }

    /// Remove an installed CSAR
    #[instrument(skip(self))]
    pub async fn delete_application(&self, csar_id: &str) -> ContainerResult<()> {
        let url = self.csar_url(csar_id);
        let response = self.http.delete(&url).send().await?;
        Self::check(&url, response)?;
        Ok(())
    }

    /// The CSAR resource
    pub async fn csar(&self, csar_id: &str) -> ContainerResult<Csar> {
        self.get(&self.csar_url(csar_id)).await
    }

    async fn service_template(&self, csar_id: &str) -> ContainerResult<ServiceTemplate> {
        let csar = self.csar(csar_id).await?;
        self.get(csar.links.href(rel::SERVICE_TEMPLATE)?).await
    }

    // =====================================================================
    // Build plan and deployment
    // =====================================================================

    async fn build_plan(&self, csar_id: &str) -> ContainerResult<Plan> {
        let template = self.service_template(csar_id).await?;
        let plans: PlanResources = self.get(template.links.href(rel::BUILD_PLANS)?).await?;
        plans
            .plans
            .into_iter()
            .find(|p| p.plan_type == PlanType::BuildPlan)
            .ok_or_else(|| ContainerError::not_found("build plan", csar_id))
    }

    async fn build_plan_instance(&self, csar_id: &str, correlation_id: &str) -> ContainerResult<PlanInstance> {
        let plan = self.build_plan(csar_id).await?;
        let instances: PlanInstanceResources = self.get(plan.links.href(rel::INSTANCES)?).await?;
        instances
            .plan_instances
            .into_iter()
            .find(|i| i.correlation_id == correlation_id)
            .ok_or_else(|| ContainerError::not_found("build plan instance", correlation_id))
    }

    /// Start the build plan; returns the correlation id of the run
    #[instrument(skip(self, inputs), fields(inputs = inputs.len()))]
    pub async fn deploy_service_template_instance(
        &self,
        csar_id: &str,
        inputs: &[InputParameter],
    ) -> ContainerResult<String> {
        let payload = with_base_parameters(inputs, &BASE_INSTALLATION_PARAMETERS);
        let plan = self.build_plan(csar_id).await?;
        let correlation_id = self.post_json(plan.links.href(rel::INSTANCES)?, &payload).await?;
        Ok(correlation_id.trim().to_string())
    }

    async fn instance_id_after_deployment(&self, csar_id: &str, correlation_id: &str) -> Option<String> {
        match self.build_plan_instance(csar_id, correlation_id).await {
            Ok(instance) => instance.service_template_instance_id.filter(|id| !id.is_empty()),
            Err(e) => {
                debug!("instance id not available yet: {}", e);
                None
            }
        }
    }

    /// Poll the build plan run until it reports the created instance id
    #[instrument(skip(self))]
    pub async fn wait_for_service_template_instance_id_after_deployment(
        &self,
        csar_id: &str,
        correlation_id: &str,
        settings: PollSettings,
    ) -> ContainerResult<String> {
        poll_until(settings, || async move {
            self.instance_id_after_deployment(csar_id, correlation_id).await
        })
        .await
    }

    /// Log lines of the build plan run
    pub async fn build_plan_logs(&self, csar_id: &str, correlation_id: &str) -> ContainerResult<Vec<PlanLogEntry>> {
        Ok(self.build_plan_instance(csar_id, correlation_id).await?.logs)
    }

    /// Build plan inputs a user has to supply
    pub async fn required_build_plan_input_parameters(&self, csar_id: &str) -> ContainerResult<Vec<InputParameter>> {
        Ok(visible_parameters(self.all_build_plan_input_parameters(csar_id).await?))
    }

    /// Every declared build plan input
    pub async fn all_build_plan_input_parameters(&self, csar_id: &str) -> ContainerResult<Vec<InputParameter>> {
        Ok(self.build_plan(csar_id).await?.input_parameters)
    }

    /// Declared build plan outputs
    pub async fn build_plan_output_parameters(&self, csar_id: &str) -> ContainerResult<Vec<OutputParameter>> {
        Ok(self.build_plan(csar_id).await?.output_parameters)
    }

    // =====================================================================
    // Service template instances
    // =====================================================================

    /// The deployed instance with id `instance_id`
    pub async fn service_template_instance(
        &self,
        csar_id: &str,
        instance_id: &str,
    ) -> ContainerResult<ServiceTemplateInstance> {
        let template = self.service_template(csar_id).await?;
        let instances: ServiceTemplateInstanceResources =
            self.get(template.links.href(rel::INSTANCES)?).await?;
        let instance = instances
            .service_template_instances
            .into_iter()
            .find(|i| i.id == instance_id)
            .ok_or_else(|| ContainerError::not_found("service template instance", instance_id))?;
        self.get(instance.links.href(rel::SELF)?).await
    }

    /// Current lifecycle state of an instance
    pub async fn service_template_instance_state(
        &self,
        csar_id: &str,
        instance_id: &str,
    ) -> ContainerResult<ServiceTemplateInstanceState> {
        Ok(self.service_template_instance(csar_id, instance_id).await?.state)
    }

    /// Poll until the instance reaches `target` or `ERROR`, returning the
    /// state that ended the poll
    #[instrument(skip(self))]
    pub async fn wait_for_service_template_instance_in_state(
        &self,
        csar_id: &str,
        instance_id: &str,
        target: ServiceTemplateInstanceState,
        settings: PollSettings,
    ) -> ContainerResult<ServiceTemplateInstanceState> {
        poll_until(settings, || async move {
            match self.service_template_instance_state(csar_id, instance_id).await {
                Ok(state) if state == target || state == ServiceTemplateInstanceState::Error => Some(state),
                Ok(state) => {
                    trace!(%state, "waiting for {}", target);
                    None
                }
                Err(e) => {
                    debug!("instance state not available: {}", e);
                    None
                }
            }
        })
        .await
    }

    /// The build plan run that created the instance, with reserved inputs removed
    pub async fn service_template_instance_build_plan_instance(
        &self,
        csar_id: &str,
        instance_id: &str,
    ) -> ContainerResult<PlanInstance> {
        let instance = self.service_template_instance(csar_id, instance_id).await?;
        let mut plan_instance: PlanInstance = self.get(instance.links.href(rel::BUILD_PLAN_INSTANCE)?).await?;
        plan_instance.inputs = visible_parameters(std::mem::take(&mut plan_instance.inputs));
        Ok(plan_instance)
    }

    // =====================================================================
    // Node templates
    // =====================================================================

    /// Node templates of the CSAR's service template
    pub async fn node_templates(&self, csar_id: &str) -> ContainerResult<Vec<ContainerNodeTemplate>> {
        let template = self.service_template(csar_id).await?;
        let nodes: NodeTemplateResources = self.get(template.links.href(rel::NODE_TEMPLATES)?).await?;
        Ok(nodes.node_templates)
    }

    /// The instance of node `node_template_id` inside service template
    /// instance `instance_id`
    pub async fn node_template_instance(
        &self,
        csar_id: &str,
        instance_id: &str,
        node_template_id: &str,
    ) -> ContainerResult<NodeTemplateInstance> {
        let node = self
            .node_templates(csar_id)
            .await?
            .into_iter()
            .find(|n| n.id == node_template_id)
            .ok_or_else(|| ContainerError::not_found("node template", node_template_id))?;

        // Older containers omit the instances relation on node templates.
        let instances_url = match node.links.href(rel::INSTANCES) {
            Ok(href) => href.to_string(),
            Err(_) => format!("{}/instances", node.links.href(rel::SELF)?),
        };
        let instances: NodeTemplateInstanceResources = self.get(&instances_url).await?;
        let instance = instances
            .node_template_instances
            .into_iter()
            .find(|i| i.service_template_instance_id == instance_id)
            .ok_or_else(|| ContainerError::not_found("node template instance", node_template_id))?;
        self.get(instance.links.href(rel::SELF)?).await
    }

    /// Lifecycle state of one node template instance
    pub async fn node_template_instance_state(
        &self,
        csar_id: &str,
        instance_id: &str,
        node_template_id: &str,
    ) -> ContainerResult<NodeTemplateInstanceState> {
        Ok(self
            .node_template_instance(csar_id, instance_id, node_template_id)
            .await?
            .state)
    }

    /// Overwrite the state of a node template instance
    #[instrument(skip(self))]
    pub async fn update_node_template_instance_state(
        &self,
        csar_id: &str,
        instance_id: &str,
        node_template_id: &str,
        state: NodeTemplateInstanceState,
    ) -> ContainerResult<()> {
        let instance = self
            .node_template_instance(csar_id, instance_id, node_template_id)
            .await?;
        self.put_text(instance.links.href(rel::STATE)?, state.to_string()).await
    }

    // =====================================================================
    // Management plans
    // =====================================================================

    async fn management_plans(&self, csar_id: &str, instance_id: &str) -> ContainerResult<Vec<Plan>> {
        let instance = self.service_template_instance(csar_id, instance_id).await?;
        let plans: PlanResources = self.get(instance.links.href(rel::MANAGEMENT_PLANS)?).await?;
        Ok(plans.plans)
    }

    async fn management_plan(&self, csar_id: &str, instance_id: &str, plan_id: &str) -> ContainerResult<Plan> {
        self.management_plans(csar_id, instance_id)
            .await?
            .into_iter()
            .find(|p| p.id == plan_id)
            .ok_or_else(|| ContainerError::not_found("management plan", plan_id))
    }

    /// Inputs of a management plan a user has to supply
    pub async fn management_plan_input_parameters(
        &self,
        csar_id: &str,
        instance_id: &str,
        plan_id: &str,
    ) -> ContainerResult<Vec<InputParameter>> {
        let plan = self.management_plan(csar_id, instance_id, plan_id).await?;
        Ok(visible_parameters(plan.input_parameters))
    }

    /// Start the termination plan of an instance; returns the correlation id
    #[instrument(skip(self))]
    pub async fn terminate_service_template_instance(
        &self,
        csar_id: &str,
        instance_id: &str,
    ) -> ContainerResult<String> {
        let plan = self
            .management_plans(csar_id, instance_id)
            .await?
            .into_iter()
            .find(|p| p.plan_type == PlanType::TerminationPlan)
            .ok_or_else(|| ContainerError::not_found("termination plan", instance_id))?;
        let payload = with_base_parameters(&[], &BASE_TERMINATION_PARAMETERS);
        let correlation_id = self.post_json(plan.links.href(rel::INSTANCES)?, &payload).await?;
        Ok(correlation_id.trim().to_string())
    }

    // =====================================================================
    // Transformation
    // =====================================================================

    /// Ask the container to generate the plan migrating `source` to `target`;
    /// returns the id the plan will carry
    #[instrument(skip(self))]
    pub async fn generate_transformation_plan(
        &self,
        source_csar_id: &str,
        target_csar_id: &str,
    ) -> ContainerResult<String> {
        let request = TransformRequest {
            source_csar_name: source_csar_id,
            target_csar_name: target_csar_id,
        };
        let url = combine_urls(&self.base_url, "csars/transform");
        self.post_json(&url, &request).await?;
        Ok(transformation_plan_id(source_csar_id, target_csar_id))
    }

    /// Start the transformation plan on instance `instance_id` of `source`
    #[instrument(skip(self, inputs))]
    pub async fn execute_transformation_plan(
        &self,
        instance_id: &str,
        source_csar_id: &str,
        target_csar_id: &str,
        inputs: &[InputParameter],
    ) -> ContainerResult<String> {
        let plan_id = transformation_plan_id(source_csar_id, target_csar_id);
        let payload = with_base_parameters(inputs, &BASE_TRANSFORMATION_PARAMETERS);
        let plan = self.management_plan(source_csar_id, instance_id, &plan_id).await?;
        let correlation_id = self.post_json(plan.links.href(rel::INSTANCES)?, &payload).await?;
        Ok(correlation_id.trim().to_string())
    }

    async fn transformation_plan_instance(
        &self,
        csar_id: &str,
        instance_id: &str,
        correlation_id: &str,
        plan_id: &str,
    ) -> ContainerResult<PlanInstance> {
        let plan = self
            .management_plans(csar_id, instance_id)
            .await?
            .into_iter()
            .find(|p| p.id == plan_id && p.plan_type == PlanType::TransformationPlan)
            .ok_or_else(|| ContainerError::not_found("transformation plan", plan_id))?;
        let instances: PlanInstanceResources = self.get(plan.links.href(rel::INSTANCES)?).await?;
        instances
            .plan_instances
            .into_iter()
            .find(|i| i.correlation_id == correlation_id)
            .ok_or_else(|| ContainerError::not_found("transformation plan instance", correlation_id))
    }

    /// Poll the transformation run until it reports the migrated instance id
    #[instrument(skip(self))]
    pub async fn wait_for_service_template_instance_id_after_migration(
        &self,
        csar_id: &str,
        instance_id: &str,
        correlation_id: &str,
        source_csar_id: &str,
        target_csar_id: &str,
        settings: PollSettings,
    ) -> ContainerResult<String> {
        let plan_id = transformation_plan_id(source_csar_id, target_csar_id);
        let plan_id = plan_id.as_str();
        poll_until(settings, || async move {
            match self
                .transformation_plan_instance(csar_id, instance_id, correlation_id, plan_id)
                .await
            {
                Ok(run) => run
                    .output(INSTANCE_ID_OUTPUT)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string),
                Err(e) => {
                    debug!("migrated instance id not available yet: {}", e);
                    None
                }
            }
        })
        .await
    }

    /// Log lines of a transformation run
    pub async fn transformation_plan_logs(
        &self,
        csar_id: &str,
        instance_id: &str,
        correlation_id: &str,
        source_csar_id: &str,
        target_csar_id: &str,
    ) -> ContainerResult<Vec<PlanLogEntry>> {
        let plan_id = transformation_plan_id(source_csar_id, target_csar_id);
        let run = self
            .transformation_plan_instance(csar_id, instance_id, correlation_id, &plan_id)
            .await?;
        Ok(run.logs)
    }
}
