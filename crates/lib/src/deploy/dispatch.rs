//! Deployment controller dispatch.
//!
//! A service is rolled out either by ECS itself (rolling update) or by
//! CodeDeploy (blue/green). The service's own `deploymentController` decides
//! which; this module checks the service can be deployed to and drives the
//! matching protocol with a single API call.

use tracing::{debug, info};

use crate::appspec::load_app_spec;
use crate::consts::ACTIVE_SERVICE_STATUS;

use super::types::{
  CreateDeploymentRequest, DeployError, DeploymentController, DeploymentCoordinator, DeploymentOutcome,
  ResolvedInputs, RevisionLocation, ServiceDescriptor, ServiceLookup, TaskDefinitionArn, TaskScheduler,
  UpdateServiceRequest,
};

/// Console URL showing a service's deployment events.
pub fn ecs_deployment_url(region: &str, cluster: &str, service: &str) -> String {
  format!("https://console.aws.amazon.com/ecs/v2/clusters/{cluster}/services/{service}/events?region={region}")
}

/// Console URL of a CodeDeploy deployment.
pub fn codedeploy_deployment_url(region: &str, deployment_id: &str) -> String {
  format!("https://console.aws.amazon.com/codesuite/codedeploy/deployments/{deployment_id}?region={region}")
}

/// Check a `DescribeServices` response for a deployable service.
///
/// The first reported failure wins. A response with neither a failure nor a
/// service is treated as a missing service.
pub fn check_service(service: &str, lookup: ServiceLookup) -> Result<ServiceDescriptor, DeployError> {
  if let Some(failure) = lookup.failures.into_iter().next() {
    return Err(DeployError::ServiceLookupFailed {
      arn: failure.arn.unwrap_or_else(|| service.to_string()),
      reason: failure.reason.unwrap_or_else(|| "UNKNOWN".to_string()),
    });
  }

  let Some(descriptor) = lookup.services.into_iter().next() else {
    return Err(DeployError::ServiceLookupFailed {
      arn: service.to_string(),
      reason: "MISSING".to_string(),
    });
  };

  if descriptor.status != ACTIVE_SERVICE_STATUS {
    return Err(DeployError::ServiceNotActive {
      status: descriptor.status,
    });
  }

  Ok(descriptor)
}

/// Drives a deployment through ECS or CodeDeploy.
#[derive(Debug)]
pub struct Dispatcher<'a, S, C> {
  scheduler: &'a S,
  coordinator: &'a C,
}

impl<'a, S: TaskScheduler, C: DeploymentCoordinator> Dispatcher<'a, S, C> {
  pub fn new(scheduler: &'a S, coordinator: &'a C) -> Self {
    Self { scheduler, coordinator }
  }

  /// Describe the service and check it is active.
  pub async fn inspect(&self, cluster: &str, service: &str) -> Result<ServiceDescriptor, DeployError> {
    let lookup = self.scheduler.describe_service(cluster, service).await?;
    let descriptor = check_service(service, lookup)?;
    debug!(
      cluster,
      service = descriptor.service_name.as_deref().unwrap_or(service),
      controller = ?descriptor.controller(),
      "service is active"
    );
    Ok(descriptor)
  }

  /// Roll `task_definition_arn` out with the given controller.
  pub async fn dispatch(
    &self,
    controller: &DeploymentController,
    inputs: &ResolvedInputs,
    service: &str,
    task_definition_arn: &TaskDefinitionArn,
  ) -> Result<DeploymentOutcome, DeployError> {
    match controller {
      DeploymentController::Rolling => self.update_in_place(inputs, service, task_definition_arn).await,
      DeploymentController::BlueGreen => self.start_blue_green(inputs, service, task_definition_arn).await,
      DeploymentController::Unsupported(kind) => Err(DeployError::UnsupportedDeploymentController(kind.clone())),
    }
  }

  async fn update_in_place(
    &self,
    inputs: &ResolvedInputs,
    service: &str,
    task_definition_arn: &TaskDefinitionArn,
  ) -> Result<DeploymentOutcome, DeployError> {
    let request = UpdateServiceRequest {
      cluster: inputs.cluster.clone(),
      service: service.to_string(),
      task_definition: task_definition_arn.to_string(),
      force_new_deployment: inputs.force_new_deployment,
    };
    info!(
      cluster = %inputs.cluster,
      service,
      force_new_deployment = inputs.force_new_deployment,
      "updating service"
    );
    self.scheduler.update_service(&request).await?;

    Ok(DeploymentOutcome::Rolling {
      deployment_url: ecs_deployment_url(&inputs.region, &inputs.cluster, service),
    })
  }

  async fn start_blue_green(
    &self,
    inputs: &ResolvedInputs,
    service: &str,
    task_definition_arn: &TaskDefinitionArn,
  ) -> Result<DeploymentOutcome, DeployError> {
    let codedeploy = &inputs.codedeploy;
    let app_spec_path = codedeploy.appspec_path(&inputs.workspace);
    let revision = load_app_spec(&app_spec_path, task_definition_arn)?;

    let request = CreateDeploymentRequest {
      application_name: codedeploy.application_name(&inputs.cluster, service),
      deployment_group_name: codedeploy.deployment_group_name(&inputs.cluster, service),
      revision: RevisionLocation::app_spec_content(revision),
      description: codedeploy.description.clone(),
    };
    info!(
      application = %request.application_name,
      deployment_group = %request.deployment_group_name,
      appspec = %app_spec_path.display(),
      "creating CodeDeploy deployment"
    );
    let deployment_id = self.coordinator.create_deployment(&request).await?;

    Ok(DeploymentOutcome::BlueGreen {
      deployment_url: codedeploy_deployment_url(&inputs.region, &deployment_id),
      deployment_id,
    })
  }
}
