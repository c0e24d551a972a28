mod cmd;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{DeployArgs, RenderAppSpecArgs, RenderArgs};
use output::print_error;

/// ecs-deploy - Register ECS task definitions and deploy them to services
#[derive(Parser)]
#[command(name = "ecs-deploy")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Register a task definition and deploy it to a service
  Deploy(DeployArgs),

  /// Print the registration payload for a task definition file
  Render(RenderArgs),

  /// Print an AppSpec rewritten to use a task definition ARN
  RenderAppspec(RenderAppSpecArgs),
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .without_time()
    .init();

  let result = match cli.command {
    Commands::Deploy(args) => cmd::cmd_deploy(args),
    Commands::Render(args) => cmd::cmd_render(args),
    Commands::RenderAppspec(args) => cmd::cmd_render_appspec(args),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&format!("{err:#}"));
      ExitCode::FAILURE
    }
  }
}
