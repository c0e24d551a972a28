//! Types for task definition registration and service deployment.
//!
//! This module defines the error type, the inputs and outcome of a run, the
//! request/response shapes exchanged with ECS and CodeDeploy, and the traits
//! those two APIs are reached through.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::appspec::AppSpecRevision;
use crate::aws::AwsError;
use crate::consts::{
  APPLICATION_NAME_PREFIX, CODE_DEPLOY_CONTROLLER, CODE_DEPLOY_PLATFORM, DEFAULT_APPSPEC_PATH, DEFAULT_CLUSTER,
  DEPLOYMENT_GROUP_PREFIX, ECS_CONTROLLER, ECS_PLATFORM,
};

/// Errors that can occur while registering or deploying a task definition.
#[derive(Debug, Error)]
pub enum DeployError {
  /// A task definition or AppSpec file could not be read.
  #[error("failed to read {}", .path.display())]
  ReadFile {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// A task definition or AppSpec file is not valid YAML/JSON.
  #[error("failed to parse {}", .path.display())]
  ParseFile {
    path: PathBuf,
    #[source]
    source: serde_yaml::Error,
  },

  /// A key the AppSpec must contain was not found.
  #[error("AppSpec file must include property '{field}'")]
  MissingRequiredField { field: String },

  /// ECS rejected the task definition.
  #[error("failed to register task definition in ECS")]
  RegistrationRejected {
    #[source]
    source: AwsError,
  },

  /// `DescribeServices` reported a failure for the service.
  #[error("{arn} is {reason}")]
  ServiceLookupFailed { arn: String, reason: String },

  /// The service exists but is not `ACTIVE`.
  #[error("Service is {status}")]
  ServiceNotActive { status: String },

  /// The service uses a deployment controller this tool cannot drive.
  #[error("Unsupported deployment controller: {0}")]
  UnsupportedDeploymentController(String),

  /// A describe, update or create-deployment call failed.
  #[error(transparent)]
  Aws(#[from] AwsError),

  /// A payload could not be serialized.
  #[error("failed to serialize {what}")]
  Serialize {
    what: &'static str,
    #[source]
    source: serde_json::Error,
  },

  /// An output could not be published.
  #[error("failed to write output '{name}'")]
  Output {
    name: String,
    #[source]
    source: std::io::Error,
  },
}

/// ARN of a registered task definition revision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskDefinitionArn(pub String);

impl TaskDefinitionArn {
  pub fn new(arn: impl Into<String>) -> Self {
    Self(arn.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl std::fmt::Display for TaskDefinitionArn {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Raw inputs for a run, as read from flags or the CI environment.
///
/// Optional names are left unresolved here; [`DeployInputs::resolve`] applies
/// the defaults once.
#[derive(Debug, Clone, Default)]
pub struct DeployInputs {
  /// Path to the task definition file.
  pub task_definition: PathBuf,

  /// AWS region of the cluster.
  pub region: String,

  /// Service to deploy to. `None` registers the task definition only.
  pub service: Option<String>,

  /// Cluster of the service. Empty or `None` means `default`.
  pub cluster: Option<String>,

  /// Redeploy even if nothing but the task definition changed.
  pub force_new_deployment: bool,

  /// AppSpec path for blue/green deployments.
  pub codedeploy_appspec: Option<PathBuf>,

  /// CodeDeploy application name.
  pub codedeploy_application: Option<String>,

  /// CodeDeploy deployment group name.
  pub codedeploy_deployment_group: Option<String>,

  /// Description attached to the CodeDeploy deployment.
  pub codedeploy_deployment_description: Option<String>,

  /// Directory relative paths are resolved against.
  pub workspace: PathBuf,
}

impl DeployInputs {
  /// Apply defaults: the cluster name and workspace-relative paths.
  pub fn resolve(&self) -> ResolvedInputs {
    ResolvedInputs {
      task_definition: resolve_path(&self.workspace, &self.task_definition),
      region: self.region.clone(),
      service: non_empty(&self.service),
      cluster: non_empty(&self.cluster).unwrap_or_else(|| DEFAULT_CLUSTER.to_string()),
      force_new_deployment: self.force_new_deployment,
      codedeploy: CodeDeployInputs {
        appspec: self.codedeploy_appspec.clone().filter(|path| !path.as_os_str().is_empty()),
        application: non_empty(&self.codedeploy_application),
        deployment_group: non_empty(&self.codedeploy_deployment_group),
        description: non_empty(&self.codedeploy_deployment_description),
      },
      workspace: self.workspace.clone(),
    }
  }
}

/// Inputs with defaults applied.
#[derive(Debug, Clone)]
pub struct ResolvedInputs {
  pub task_definition: PathBuf,
  pub region: String,
  pub service: Option<String>,
  pub cluster: String,
  pub force_new_deployment: bool,
  pub codedeploy: CodeDeployInputs,
  pub workspace: PathBuf,
}

/// Blue/green settings. Unset names get defaults derived from cluster and service.
#[derive(Debug, Clone, Default)]
pub struct CodeDeployInputs {
  pub appspec: Option<PathBuf>,
  pub application: Option<String>,
  pub deployment_group: Option<String>,
  pub description: Option<String>,
}

impl CodeDeployInputs {
  pub fn application_name(&self, cluster: &str, service: &str) -> String {
    self
      .application
      .clone()
      .unwrap_or_else(|| format!("{APPLICATION_NAME_PREFIX}-{cluster}-{service}"))
  }

  pub fn deployment_group_name(&self, cluster: &str, service: &str) -> String {
    self
      .deployment_group
      .clone()
      .unwrap_or_else(|| format!("{DEPLOYMENT_GROUP_PREFIX}-{cluster}-{service}"))
  }

  /// AppSpec path, resolved against `workspace` unless absolute.
  pub fn appspec_path(&self, workspace: &Path) -> PathBuf {
    let path = self
      .appspec
      .clone()
      .unwrap_or_else(|| PathBuf::from(DEFAULT_APPSPEC_PATH));
    resolve_path(workspace, &path)
  }
}

fn non_empty(value: &Option<String>) -> Option<String> {
  value.as_deref().filter(|v| !v.is_empty()).map(str::to_string)
}

fn resolve_path(workspace: &Path, path: &Path) -> PathBuf {
  if path.is_absolute() {
    path.to_path_buf()
  } else {
    workspace.join(path)
  }
}

/// Live state of a service, as returned by `DescribeServices`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDescriptor {
  #[serde(default)]
  pub service_name: Option<String>,

  #[serde(default)]
  pub status: String,

  #[serde(default)]
  pub deployment_controller: Option<DeploymentControllerSpec>,
}

/// The `deploymentController` block of a service.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DeploymentControllerSpec {
  #[serde(rename = "type", default)]
  pub kind: Option<String>,
}

/// How a service rolls out new task definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentController {
  /// ECS replaces tasks in place.
  Rolling,
  /// CodeDeploy shifts traffic between two task sets.
  BlueGreen,
  /// Anything else, e.g. `EXTERNAL`.
  Unsupported(String),
}

impl DeploymentController {
  /// Platform tag published for this controller.
  pub fn platform(&self) -> Option<&'static str> {
    match self {
      DeploymentController::Rolling => Some(ECS_PLATFORM),
      DeploymentController::BlueGreen => Some(CODE_DEPLOY_PLATFORM),
      DeploymentController::Unsupported(_) => None,
    }
  }
}

impl ServiceDescriptor {
  /// Classify the service's deployment controller.
  ///
  /// A missing controller, a missing or empty type, and `ECS` all mean rolling.
  pub fn controller(&self) -> DeploymentController {
    let kind = self
      .deployment_controller
      .as_ref()
      .and_then(|controller| controller.kind.as_deref())
      .unwrap_or_default();

    match kind {
      "" | ECS_CONTROLLER => DeploymentController::Rolling,
      CODE_DEPLOY_CONTROLLER => DeploymentController::BlueGreen,
      other => DeploymentController::Unsupported(other.to_string()),
    }
  }
}

/// A per-service failure entry from `DescribeServices`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ServiceFailure {
  #[serde(default)]
  pub arn: Option<String>,

  #[serde(default)]
  pub reason: Option<String>,
}

/// Response of `DescribeServices` for a single service.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ServiceLookup {
  #[serde(default)]
  pub services: Vec<ServiceDescriptor>,

  #[serde(default)]
  pub failures: Vec<ServiceFailure>,
}

/// Request body of `UpdateService`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceRequest {
  pub cluster: String,
  pub service: String,
  pub task_definition: String,
  pub force_new_deployment: bool,
}

/// Request body of CodeDeploy `CreateDeployment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeploymentRequest {
  pub application_name: String,
  pub deployment_group_name: String,
  pub revision: RevisionLocation,

  /// Left out entirely when unset so CodeDeploy applies its own default.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

/// An AppSpec revision passed inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionLocation {
  pub revision_type: String,
  pub app_spec_content: AppSpecRevision,
}

impl RevisionLocation {
  pub fn app_spec_content(revision: AppSpecRevision) -> Self {
    Self {
      revision_type: "AppSpecContent".to_string(),
      app_spec_content: revision,
    }
  }
}

/// The ECS operations a deployment needs.
#[allow(async_fn_in_trait)]
pub trait TaskScheduler {
  /// Register a task definition, returning its ARN.
  async fn register_task_definition(&self, task_definition: &Value) -> Result<TaskDefinitionArn, AwsError>;

  /// Describe one service in a cluster.
  async fn describe_service(&self, cluster: &str, service: &str) -> Result<ServiceLookup, AwsError>;

  /// Point a service at a new task definition.
  async fn update_service(&self, request: &UpdateServiceRequest) -> Result<(), AwsError>;
}

/// The CodeDeploy operation a blue/green deployment needs.
#[allow(async_fn_in_trait)]
pub trait DeploymentCoordinator {
  /// Start a deployment, returning its ID.
  async fn create_deployment(&self, request: &CreateDeploymentRequest) -> Result<String, AwsError>;
}

/// What a run ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentOutcome {
  /// No service was given; only the task definition was registered.
  Registered,

  /// The service was updated in place.
  Rolling { deployment_url: String },

  /// A CodeDeploy deployment was started.
  BlueGreen {
    deployment_id: String,
    deployment_url: String,
  },
}

impl DeploymentOutcome {
  pub fn deployment_url(&self) -> Option<&str> {
    match self {
      DeploymentOutcome::Registered => None,
      DeploymentOutcome::Rolling { deployment_url } | DeploymentOutcome::BlueGreen { deployment_url, .. } => {
        Some(deployment_url)
      }
    }
  }
}

/// Result of a run.
#[derive(Debug, Clone)]
pub struct DeployResult {
  pub task_definition_arn: TaskDefinitionArn,
  pub region: String,
  pub cluster: String,
  pub service: Option<String>,
  pub outcome: DeploymentOutcome,
}
