//! Cleaning of task definition documents.
//!
//! [`sanitize`] runs three passes in a fixed order:
//!
//! 1. [`elide_empty`] drops every null, empty string, and array or object whose
//!    contents are all empty, children first.
//! 2. [`remove_ignored_attributes`] drops the read-only attributes that
//!    `DescribeTaskDefinition` returns and `RegisterTaskDefinition` rejects.
//! 3. [`repair_required_fields`] fills in `name`/`value` keys the API requires
//!    even when blank. It must run last, otherwise the empty strings it adds
//!    would be elided again.

use serde_json::{Map, Value};
use tracing::warn;

use crate::consts::{APP_MESH_PROXY_TYPE, IGNORED_TASK_DEFINITION_ATTRIBUTES};

/// Clean an authored task definition into a registration payload.
///
/// Never fails: shapes the passes do not recognise are left as they are. A
/// document that is empty as a whole becomes an empty object.
pub fn sanitize(document: Value) -> Value {
  let mut document = elide_empty(document).unwrap_or_else(|| Value::Object(Map::new()));

  for attribute in remove_ignored_attributes(&mut document) {
    warn!(
      attribute,
      "Ignoring property '{attribute}' in the task definition file. This property is returned by the Amazon ECS \
       DescribeTaskDefinition API and may be shown in the ECS console, but it is not a valid field when registering \
       a new task definition. This field can be safely removed from your task definition file."
    );
  }

  repair_required_fields(&mut document);
  document
}

/// Remove empty values, bottom-up.
///
/// Returns `None` when the value itself is empty: null, `""`, or an array or
/// object left with no children once its own empty children are removed.
/// Other scalars (`0`, `false`) are always kept.
pub fn elide_empty(value: Value) -> Option<Value> {
  match value {
    Value::Null => None,
    Value::String(s) if s.is_empty() => None,
    Value::Array(items) => {
      let kept: Vec<Value> = items.into_iter().filter_map(elide_empty).collect();
      (!kept.is_empty()).then_some(Value::Array(kept))
    }
    Value::Object(map) => {
      let kept: Map<String, Value> = map
        .into_iter()
        .filter_map(|(key, value)| elide_empty(value).map(|value| (key, value)))
        .collect();
      (!kept.is_empty()).then_some(Value::Object(kept))
    }
    scalar => Some(scalar),
  }
}

/// Remove top-level read-only attributes, returning the names that were present.
pub fn remove_ignored_attributes(document: &mut Value) -> Vec<&'static str> {
  let Some(root) = document.as_object_mut() else {
    return Vec::new();
  };

  IGNORED_TASK_DEFINITION_ATTRIBUTES
    .iter()
    .copied()
    .filter(|attribute| root.remove(*attribute).is_some())
    .collect()
}

/// Add the `name`/`value` keys `RegisterTaskDefinition` requires but authors omit.
///
/// - App Mesh proxy properties get both `name` and `value` when missing.
/// - Container environment entries get `value` when missing.
pub fn repair_required_fields(document: &mut Value) {
  let Some(root) = document.as_object_mut() else {
    return;
  };

  if let Some(proxy) = root.get_mut("proxyConfiguration").and_then(Value::as_object_mut) {
    let is_app_mesh = proxy.get("type").and_then(Value::as_str) == Some(APP_MESH_PROXY_TYPE);
    if is_app_mesh {
      if let Some(properties) = proxy.get_mut("properties").and_then(Value::as_array_mut) {
        for property in properties.iter_mut().filter_map(Value::as_object_mut) {
          property.entry("value").or_insert_with(empty_string);
          property.entry("name").or_insert_with(empty_string);
        }
      }
    }
  }

  if let Some(containers) = root.get_mut("containerDefinitions").and_then(Value::as_array_mut) {
    for container in containers.iter_mut() {
      let Some(environment) = container.get_mut("environment").and_then(Value::as_array_mut) else {
        continue;
      };
      for variable in environment.iter_mut().filter_map(Value::as_object_mut) {
        variable.entry("value").or_insert_with(empty_string);
      }
    }
  }
}

fn empty_string() -> Value {
  Value::String(String::new())
}
