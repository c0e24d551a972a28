//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

pub const REGISTERED_ARN: &str = "arn:aws:ecs:us-east-1:123456789012:task-definition/web:12";
pub const ECS_TARGET: &str = "AmazonEC2ContainerServiceV20141113";

/// Get path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Read fixture content.
pub fn fixture_content(name: &str) -> String {
  std::fs::read_to_string(fixture_path(name)).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Isolated test environment.
///
/// Each test gets its own workspace directory and `GITHUB_OUTPUT` file.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// A workspace holding the task definition and AppSpec fixtures.
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    std::fs::write(
      temp.path().join("task-definition.json"),
      fixture_content("task-definition.json"),
    )
    .unwrap();
    std::fs::write(temp.path().join("appspec.yaml"), fixture_content("appspec.yaml")).unwrap();
    Self { temp }
  }

  /// Workspace path.
  pub fn workspace(&self) -> PathBuf {
    dunce::canonicalize(self.temp.path()).unwrap()
  }

  /// Path of the `GITHUB_OUTPUT` file.
  pub fn output_path(&self) -> PathBuf {
    self.temp.path().join("github-output")
  }

  /// Contents of the `GITHUB_OUTPUT` file, empty if nothing was written.
  pub fn outputs(&self) -> String {
    std::fs::read_to_string(self.output_path()).unwrap_or_default()
  }

  /// Get a pre-configured Command for the ecs-deploy binary.
  ///
  /// Starts from an empty environment and sets:
  /// - `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`: dummy credentials
  /// - `AWS_ENDPOINT_URL`: the mock server for both services
  /// - `GITHUB_WORKSPACE`: the isolated workspace
  /// - `GITHUB_OUTPUT`: the isolated output file
  pub fn cmd(&self, endpoint: &str) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("ecs-deploy");
    cmd.env_clear();
    cmd.env("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE");
    cmd.env("AWS_SECRET_ACCESS_KEY", "secret");
    cmd.env("AWS_ENDPOINT_URL", endpoint);
    cmd.env("GITHUB_WORKSPACE", self.workspace());
    cmd.env("GITHUB_OUTPUT", self.output_path());
    cmd
  }
}
