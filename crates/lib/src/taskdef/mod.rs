//! Task definition documents.
//!
//! A task definition is authored as YAML or JSON, often by copying the output of
//! `DescribeTaskDefinition`. Before it can be registered it has to be cleaned:
//! empty values dropped, read-only attributes removed and a few keys the API
//! insists on filled back in. See [`sanitize`].

mod sanitize;

use std::path::Path;

use serde_json::Value;

use crate::deploy::DeployError;
use crate::util::document::read_document;

pub use sanitize::{elide_empty, remove_ignored_attributes, repair_required_fields, sanitize};

/// Load a task definition file and clean it into a registration payload.
pub fn load_task_definition(path: &Path) -> Result<Value, DeployError> {
  let document = read_document(path)?;
  Ok(sanitize(document))
}
