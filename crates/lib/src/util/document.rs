//! Loading of authored YAML/JSON documents into the `serde_json::Value` tree.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::deploy::DeployError;

/// Read a YAML or JSON file into a value tree.
///
/// JSON is parsed as a subset of YAML, so both task definition styles load
/// through the same path.
pub fn read_document(path: &Path) -> Result<Value, DeployError> {
  let content = fs::read_to_string(path).map_err(|source| DeployError::ReadFile {
    path: path.to_path_buf(),
    source,
  })?;
  let document = parse_document(&content).map_err(|source| DeployError::ParseFile {
    path: path.to_path_buf(),
    source,
  })?;
  debug!(path = %path.display(), "loaded document");
  Ok(document)
}

/// Parse YAML or JSON text into a value tree.
pub fn parse_document(content: &str) -> Result<Value, serde_yaml::Error> {
  serde_yaml::from_str(content)
}
