//! CodeDeploy AppSpec rewriting.
//!
//! A blue/green deployment needs an AppSpec that points at the task definition
//! just registered. The AppSpec is authored freely, so keys are matched
//! case-insensitively and written back under their original casing:
//!
//! ```yaml
//! Resources:
//!   - TargetService:
//!       Type: AWS::ECS::Service
//!       Properties:
//!         TaskDefinition: <replaced>
//!         LoadBalancerInfo:
//!           ContainerName: app
//!           ContainerPort: 80
//! ```
//!
//! Every resource receives the same task definition ARN.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::deploy::{DeployError, TaskDefinitionArn};
use crate::util::document::read_document;
use crate::util::hash::{ContentHash, hash_bytes};

/// AppSpec content as sent to CodeDeploy, with the digest CodeDeploy verifies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppSpecRevision {
  pub content: String,
  pub sha256: ContentHash,
}

/// Find the key in `value` matching `name` case-insensitively.
///
/// Returns the key as spelled in the document. A value that is not a mapping
/// has no keys.
pub fn find_key(value: &Value, name: &str) -> Result<String, DeployError> {
  let wanted = name.to_lowercase();
  value
    .as_object()
    .and_then(|map| map.keys().find(|key| key.to_lowercase() == wanted))
    .cloned()
    .ok_or_else(|| DeployError::MissingRequiredField {
      field: name.to_string(),
    })
}

fn find_value_mut<'a>(value: &'a mut Value, name: &str) -> Result<&'a mut Value, DeployError> {
  let key = find_key(value, name)?;
  value
    .get_mut(key.as_str())
    .ok_or_else(|| DeployError::MissingRequiredField {
      field: name.to_string(),
    })
}

/// Point every resource in `app_spec` at `task_definition_arn`.
///
/// Returns the number of resources rewritten. An empty `resources` list is left
/// alone; a missing `resources`, `properties` or `taskDefinition` key is an error.
///
/// A resource is a mapping from its logical name to its definition, so only the
/// first entry of each resource mapping is patched and any further entries are
/// left untouched. An empty mapping (`{}`) has no definition to patch and fails
/// with `MissingRequiredField("properties")` rather than being skipped.
pub fn set_task_definition(app_spec: &mut Value, task_definition_arn: &TaskDefinitionArn) -> Result<usize, DeployError> {
  let Value::Array(resources) = find_value_mut(app_spec, "resources")? else {
    return Err(DeployError::MissingRequiredField {
      field: "resources".to_string(),
    });
  };

  for resource in resources.iter_mut() {
    let Some(definition) = resource.as_object_mut().and_then(|entries| entries.values_mut().next()) else {
      return Err(DeployError::MissingRequiredField {
        field: "properties".to_string(),
      });
    };

    let properties = find_value_mut(definition, "properties")?;
    let key = find_key(properties, "taskDefinition")?;
    if let Some(slot) = properties.get_mut(key.as_str()) {
      *slot = Value::String(task_definition_arn.to_string());
    }
  }

  Ok(resources.len())
}

/// Serialize `app_spec` and hash exactly the serialized bytes.
pub fn render_revision(app_spec: &Value) -> Result<AppSpecRevision, DeployError> {
  let content = serde_json::to_string(app_spec).map_err(|source| DeployError::Serialize {
    what: "AppSpec",
    source,
  })?;
  let sha256 = hash_bytes(content.as_bytes());
  Ok(AppSpecRevision { content, sha256 })
}

/// Rewrite `app_spec` for `task_definition_arn` and render the revision to send.
pub fn patch_app_spec(mut app_spec: Value, task_definition_arn: &TaskDefinitionArn) -> Result<AppSpecRevision, DeployError> {
  let resources = set_task_definition(&mut app_spec, task_definition_arn)?;
  let revision = render_revision(&app_spec)?;
  debug!(resources, sha256 = %revision.sha256, "patched AppSpec");
  Ok(revision)
}

/// Load an AppSpec file and patch it for `task_definition_arn`.
pub fn load_app_spec(path: &Path, task_definition_arn: &TaskDefinitionArn) -> Result<AppSpecRevision, DeployError> {
  let app_spec = read_document(path)?;
  patch_app_spec(app_spec, task_definition_arn)
}
