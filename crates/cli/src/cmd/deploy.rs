//! Implementation of the `ecs-deploy deploy` command.
//!
//! Every flag can also come from the `INPUT_*` variables GitHub Actions sets
//! for an action's inputs, so the binary runs unchanged as an action step.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use tracing::debug;

use ecsdeploy_lib::deploy::{DeployInputs, DeployResult, Deployer, DeploymentOutcome};
use ecsdeploy_lib::outputs::{GithubOutputFile, OutputSink, StdoutSink};

use crate::output::{print_info, print_stat, print_success};

#[derive(Debug, Args)]
pub struct DeployArgs {
  /// Path to the task definition file (JSON or YAML)
  #[arg(long, env = "INPUT_TASK-DEFINITION")]
  pub task_definition: PathBuf,

  /// AWS region [env: INPUT_REGION, AWS_REGION, AWS_DEFAULT_REGION]
  #[arg(long, env = "INPUT_REGION", hide_env = true)]
  pub region: Option<String>,

  /// Service to deploy to; without it the task definition is only registered
  #[arg(long, env = "INPUT_SERVICE")]
  pub service: Option<String>,

  /// Cluster of the service
  #[arg(long, env = "INPUT_CLUSTER", default_value = "default")]
  pub cluster: String,

  /// Start a new deployment even if nothing but the task definition changed
  #[arg(
    long,
    env = "INPUT_FORCE-NEW-DEPLOYMENT",
    value_name = "BOOL",
    num_args = 0..=1,
    default_missing_value = "true"
  )]
  pub force_new_deployment: Option<String>,

  /// AppSpec file for blue/green deployments, relative to the workspace [default: appspec.yaml]
  #[arg(long, env = "INPUT_CODEDEPLOY-APPSPEC")]
  pub codedeploy_appspec: Option<String>,

  /// CodeDeploy application [default: AppECS-<cluster>-<service>]
  #[arg(long, env = "INPUT_CODEDEPLOY-APPLICATION")]
  pub codedeploy_application: Option<String>,

  /// CodeDeploy deployment group [default: DgpECS-<cluster>-<service>]
  #[arg(long, env = "INPUT_CODEDEPLOY-DEPLOYMENT-GROUP")]
  pub codedeploy_deployment_group: Option<String>,

  /// Description for the CodeDeploy deployment
  #[arg(long, env = "INPUT_CODEDEPLOY-DEPLOYMENT-DESCRIPTION")]
  pub codedeploy_deployment_description: Option<String>,

  /// Directory relative paths are resolved against [default: current directory]
  #[arg(long, env = "GITHUB_WORKSPACE")]
  pub workspace: Option<PathBuf>,
}

impl DeployArgs {
  fn into_inputs(self) -> Result<DeployInputs> {
    Ok(DeployInputs {
      task_definition: self.task_definition,
      region: resolve_region(self.region)?,
      service: self.service,
      cluster: Some(self.cluster),
      force_new_deployment: parse_flag(self.force_new_deployment.as_deref()),
      codedeploy_appspec: non_empty_path(self.codedeploy_appspec),
      codedeploy_application: self.codedeploy_application,
      codedeploy_deployment_group: self.codedeploy_deployment_group,
      codedeploy_deployment_description: self.codedeploy_deployment_description,
      workspace: resolve_workspace(self.workspace)?,
    })
  }
}

/// Execute the deploy command.
///
/// Registers the task definition, then updates the service or starts a
/// CodeDeploy deployment depending on the service's deployment controller.
/// Outputs go to the `GITHUB_OUTPUT` file when it is set, stdout otherwise.
pub fn cmd_deploy(args: DeployArgs) -> Result<()> {
  let inputs = args.into_inputs()?;
  debug!(?inputs, "resolved deploy inputs");
  let deployer = Deployer::for_region(&inputs.region)?;

  let mut sink: Box<dyn OutputSink> = match GithubOutputFile::from_env() {
    Some(file) => Box::new(file),
    None => Box::new(StdoutSink),
  };

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let result = rt.block_on(deployer.deploy(&inputs, sink.as_mut()))?;

  print_summary(&result);
  Ok(())
}

fn print_summary(result: &DeployResult) {
  println!();
  print_success(&format!("Registered task definition {}", result.task_definition_arn));
  print_stat("Region", &result.region);

  let Some(service) = &result.service else {
    print_info("No service given, skipped deployment");
    return;
  };

  print_stat("Cluster", &result.cluster);
  print_stat("Service", service);
  print_stat("Platform", platform_label(&result.outcome));
  if let DeploymentOutcome::BlueGreen { deployment_id, .. } = &result.outcome {
    print_stat("Deployment", deployment_id);
  }
  if let Some(url) = result.outcome.deployment_url() {
    print_stat("Track", url);
  }
}

fn platform_label(outcome: &DeploymentOutcome) -> &'static str {
  match outcome {
    DeploymentOutcome::Registered => "none",
    DeploymentOutcome::Rolling { .. } => "ECS rolling update",
    DeploymentOutcome::BlueGreen { .. } => "CodeDeploy blue/green",
  }
}

/// Action inputs are strings: only `true` (any case) turns a flag on, and an
/// unset or empty input leaves it off.
fn parse_flag(value: Option<&str>) -> bool {
  value.is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
}

/// Unset action inputs arrive as empty strings.
pub(crate) fn non_empty_path(value: Option<String>) -> Option<PathBuf> {
  value.filter(|value| !value.is_empty()).map(PathBuf::from)
}

/// The region flag, then `AWS_REGION`, then `AWS_DEFAULT_REGION`.
fn resolve_region(flag: Option<String>) -> Result<String> {
  let region = flag
    .filter(|region| !region.is_empty())
    .or_else(|| std::env::var("AWS_REGION").ok().filter(|region| !region.is_empty()))
    .or_else(|| std::env::var("AWS_DEFAULT_REGION").ok().filter(|region| !region.is_empty()));

  match region {
    Some(region) => Ok(region),
    None => bail!("No AWS region given: pass --region or set AWS_REGION"),
  }
}

fn resolve_workspace(flag: Option<PathBuf>) -> Result<PathBuf> {
  let dir = match flag {
    Some(dir) => dir,
    None => std::env::current_dir().context("Failed to determine current directory")?,
  };
  dunce::canonicalize(&dir).with_context(|| format!("Workspace {} does not exist", dir.display()))
}
