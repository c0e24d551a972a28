//! Publishing of run outputs.
//!
//! A run publishes values such as the registered task definition ARN so later
//! CI steps can use them. Where they go is decided by the caller through an
//! [`OutputSink`]; only the deploy driver writes to it.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::util::hash::hash_bytes;

/// Names of the published outputs.
pub mod names {
  pub const PLATFORM: &str = "platform";
  pub const TASK_DEFINITION_ARN: &str = "task-definition-arn";
  pub const DEPLOYMENT_URL: &str = "deployment-url";
  pub const REGION: &str = "region";
  pub const CLUSTER: &str = "cluster";
  pub const SERVICE: &str = "service";
  pub const CODEDEPLOY_DEPLOYMENT_ID: &str = "codedeploy-deployment-id";
}

/// Destination for named output values.
pub trait OutputSink {
  fn set_output(&mut self, name: &str, value: &str) -> io::Result<()>;
}

/// Appends outputs to the file GitHub Actions names in `GITHUB_OUTPUT`.
#[derive(Debug, Clone)]
pub struct GithubOutputFile {
  path: PathBuf,
}

impl GithubOutputFile {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  /// Use the file named by `GITHUB_OUTPUT`, if set.
  pub fn from_env() -> Option<Self> {
    std::env::var_os("GITHUB_OUTPUT")
      .filter(|path| !path.is_empty())
      .map(Self::new)
  }
}

impl OutputSink for GithubOutputFile {
  fn set_output(&mut self, name: &str, value: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
    file.write_all(format_output(name, value).as_bytes())
  }
}

/// Format one output entry in the `GITHUB_OUTPUT` file syntax.
///
/// Multi-line values use the heredoc form with a delimiter derived from the
/// value, so it cannot occur inside it.
fn format_output(name: &str, value: &str) -> String {
  if value.contains('\n') || value.contains('\r') {
    let delimiter = format!("ghadelimiter_{}", &hash_bytes(value.as_bytes()).0[..16]);
    format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
  } else {
    format!("{name}={value}\n")
  }
}

/// Prints outputs as `name=value` lines on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
  fn set_output(&mut self, name: &str, value: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(format_output(name, value).as_bytes())
  }
}

/// Records outputs in order.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
  pub outputs: Vec<(String, String)>,
}

impl MemorySink {
  pub fn new() -> Self {
    Self::default()
  }

  /// The last value set for `name`.
  pub fn get(&self, name: &str) -> Option<&str> {
    self
      .outputs
      .iter()
      .rev()
      .find(|(key, _)| key == name)
      .map(|(_, value)| value.as_str())
  }
}

impl OutputSink for MemorySink {
  fn set_output(&mut self, name: &str, value: &str) -> io::Result<()> {
    self.outputs.push((name.to_string(), value.to_string()));
    Ok(())
  }
}
