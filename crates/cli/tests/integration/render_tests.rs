//! Render command integration tests.

use predicates::prelude::*;
use serde_json::{Value, json};

use super::common::{TestEnv, fixture_path};

#[test]
fn render_prints_registration_payload() {
  let env = TestEnv::new();

  let assert = env
    .cmd("http://127.0.0.1:1")
    .args(["render", "--task-definition"])
    .arg(fixture_path("task-definition.json"))
    .assert()
    .success()
    .stderr(predicate::str::contains("Ignoring property 'revision'"));

  let payload: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
  assert_eq!(payload["family"], json!("web"));
  assert!(payload.get("revision").is_none());
  assert!(payload.get("volumes").is_none());
  assert!(payload.get("executionRoleArn").is_none());
  assert_eq!(
    payload["containerDefinitions"][0]["environment"][0],
    json!({"name": "FEATURE_FLAG", "value": ""})
  );
}

#[test]
fn render_appspec_prints_content_and_digest() {
  let env = TestEnv::new();
  let arn = "arn:aws:ecs:us-east-1:123456789012:task-definition/web:12";

  let assert = env
    .cmd("http://127.0.0.1:1")
    .args(["render-appspec", "--task-definition-arn", arn, "--appspec"])
    .arg(fixture_path("appspec.yaml"))
    .assert()
    .success();

  let revision: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
  let content = revision["content"].as_str().unwrap();
  let app_spec: Value = serde_json::from_str(content).unwrap();
  assert_eq!(app_spec["Resources"][0]["TargetService"]["Properties"]["TaskDefinition"], json!(arn));
  assert_eq!(revision["sha256"].as_str().unwrap().len(), 64);
}

#[test]
fn render_appspec_with_empty_input_reads_default_file() {
  let env = TestEnv::new();
  let arn = "arn:aws:ecs:us-east-1:123456789012:task-definition/web:12";

  let assert = env
    .cmd("http://127.0.0.1:1")
    .current_dir(env.workspace())
    .env("INPUT_CODEDEPLOY-APPSPEC", "")
    .args(["render-appspec", "--task-definition-arn", arn])
    .assert()
    .success();

  let revision: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
  assert!(revision["content"].as_str().unwrap().contains(arn));
}
