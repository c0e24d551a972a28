//! Task definition registration and service deployment.
//!
//! [`Deployer`] drives a run from start to finish:
//!
//! 1. Load the task definition file and sanitize it.
//! 2. Register it with ECS and publish the resulting ARN.
//! 3. If a service was named, check it is active and roll the new revision
//!    out through the service's deployment controller (see [`dispatch`]).
//!
//! Each step awaits the previous one and the first error aborts the run.
//! Outputs published before the error stay published.

pub mod dispatch;
mod types;

pub use dispatch::{Dispatcher, check_service, codedeploy_deployment_url, ecs_deployment_url};
pub use types::*;

use serde_json::Value;
use tracing::{error, info};

use crate::aws::{CodeDeployClient, Credentials, EcsClient};
use crate::outputs::{OutputSink, names};
use crate::taskdef::load_task_definition;

/// Runs registrations and deployments against a scheduler and coordinator.
#[derive(Debug)]
pub struct Deployer<S, C> {
  scheduler: S,
  coordinator: C,
}

impl Deployer<EcsClient, CodeDeployClient> {
  /// A deployer talking to the real ECS and CodeDeploy APIs of `region`,
  /// using credentials from the environment.
  pub fn for_region(region: &str) -> Result<Self, DeployError> {
    let credentials = Credentials::from_env()?;
    let scheduler = EcsClient::new(region, credentials.clone())?;
    let coordinator = CodeDeployClient::new(region, credentials)?;
    Ok(Self::new(scheduler, coordinator))
  }
}

impl<S: TaskScheduler, C: DeploymentCoordinator> Deployer<S, C> {
  pub fn new(scheduler: S, coordinator: C) -> Self {
    Self { scheduler, coordinator }
  }

  pub fn scheduler(&self) -> &S {
    &self.scheduler
  }

  pub fn coordinator(&self) -> &C {
    &self.coordinator
  }

  /// Register the task definition and, if a service is given, deploy it.
  pub async fn deploy(&self, inputs: &DeployInputs, outputs: &mut dyn OutputSink) -> Result<DeployResult, DeployError> {
    let inputs = inputs.resolve();
    emit(outputs, names::REGION, &inputs.region)?;

    let task_definition = load_task_definition(&inputs.task_definition)?;
    let task_definition_arn = self.register(&task_definition).await?;
    emit(outputs, names::TASK_DEFINITION_ARN, task_definition_arn.as_str())?;

    let Some(service) = inputs.service.clone() else {
      info!("no service given, skipping deployment");
      return Ok(DeployResult {
        task_definition_arn,
        region: inputs.region,
        cluster: inputs.cluster,
        service: None,
        outcome: DeploymentOutcome::Registered,
      });
    };

    emit(outputs, names::CLUSTER, &inputs.cluster)?;
    emit(outputs, names::SERVICE, &service)?;

    let dispatcher = Dispatcher::new(&self.scheduler, &self.coordinator);
    let controller = dispatcher.inspect(&inputs.cluster, &service).await?.controller();
    if let Some(platform) = controller.platform() {
      emit(outputs, names::PLATFORM, platform)?;
    }

    let outcome = dispatcher
      .dispatch(&controller, &inputs, &service, &task_definition_arn)
      .await?;
    if let DeploymentOutcome::BlueGreen { deployment_id, .. } = &outcome {
      emit(outputs, names::CODEDEPLOY_DEPLOYMENT_ID, deployment_id)?;
    }
    if let Some(url) = outcome.deployment_url() {
      info!(url, "deployment started");
      emit(outputs, names::DEPLOYMENT_URL, url)?;
    }

    Ok(DeployResult {
      task_definition_arn,
      region: inputs.region,
      cluster: inputs.cluster,
      service: Some(service),
      outcome,
    })
  }

  async fn register(&self, task_definition: &Value) -> Result<TaskDefinitionArn, DeployError> {
    match self.scheduler.register_task_definition(task_definition).await {
      Ok(arn) => Ok(arn),
      Err(source) => {
        error!(payload = %task_definition, "task definition contents");
        Err(DeployError::RegistrationRejected { source })
      }
    }
  }
}

fn emit(outputs: &mut dyn OutputSink, name: &str, value: &str) -> Result<(), DeployError> {
  outputs.set_output(name, value).map_err(|source| DeployError::Output {
    name: name.to_string(),
    source,
  })
}
