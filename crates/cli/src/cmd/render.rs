//! The `render` and `render-appspec` commands.
//!
//! Both print what `deploy` would send without calling AWS.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use ecsdeploy_lib::appspec::load_app_spec;
use ecsdeploy_lib::consts::DEFAULT_APPSPEC_PATH;
use ecsdeploy_lib::deploy::TaskDefinitionArn;
use ecsdeploy_lib::taskdef::load_task_definition;

use super::deploy::non_empty_path;
use crate::output::print_json;

#[derive(Debug, Args)]
pub struct RenderArgs {
  /// Path to the task definition file (JSON or YAML)
  #[arg(long, env = "INPUT_TASK-DEFINITION")]
  pub task_definition: PathBuf,
}

#[derive(Debug, Args)]
pub struct RenderAppSpecArgs {
  /// Path to the AppSpec file (JSON or YAML)
  #[arg(long, env = "INPUT_CODEDEPLOY-APPSPEC", default_value = DEFAULT_APPSPEC_PATH)]
  pub appspec: String,

  /// Task definition ARN to write into every resource
  #[arg(long)]
  pub task_definition_arn: String,
}

/// Print the sanitized registration payload as pretty JSON.
pub fn cmd_render(args: RenderArgs) -> Result<()> {
  let payload = load_task_definition(&args.task_definition)?;
  print_json(&payload)
}

/// Print the rewritten AppSpec content together with its SHA-256.
pub fn cmd_render_appspec(args: RenderAppSpecArgs) -> Result<()> {
  let arn = TaskDefinitionArn::new(args.task_definition_arn);
  let path = non_empty_path(Some(args.appspec)).unwrap_or_else(|| PathBuf::from(DEFAULT_APPSPEC_PATH));
  let revision = load_app_spec(&path, &arn)?;
  print_json(&revision)
}
