//! Constants shared across the crate.

/// Attributes returned by `DescribeTaskDefinition` that `RegisterTaskDefinition` rejects.
pub const IGNORED_TASK_DEFINITION_ATTRIBUTES: &[&str] = &[
  "compatibilities",
  "taskDefinitionArn",
  "requiresAttributes",
  "revision",
  "status",
  "registeredAt",
  "deregisteredAt",
  "registeredBy",
];

/// Proxy configuration type whose properties need explicit `name`/`value` keys.
pub const APP_MESH_PROXY_TYPE: &str = "APPMESH";

pub const DEFAULT_CLUSTER: &str = "default";
pub const DEFAULT_APPSPEC_PATH: &str = "appspec.yaml";

pub const ACTIVE_SERVICE_STATUS: &str = "ACTIVE";

/// Deployment controller types reported by `DescribeServices`.
pub const ECS_CONTROLLER: &str = "ECS";
pub const CODE_DEPLOY_CONTROLLER: &str = "CODE_DEPLOY";

/// Platform tags published as the `platform` output.
pub const ECS_PLATFORM: &str = "AWS:ECS";
pub const CODE_DEPLOY_PLATFORM: &str = "AWS:CodeDeploy";

pub const APPLICATION_NAME_PREFIX: &str = "AppECS";
pub const DEPLOYMENT_GROUP_PREFIX: &str = "DgpECS";
