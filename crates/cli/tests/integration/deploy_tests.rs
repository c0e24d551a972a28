//! Deploy command integration tests.

use mockito::{Matcher, Mock, ServerGuard};
use predicates::prelude::*;
use serde_json::json;

use super::common::{ECS_TARGET, REGISTERED_ARN, TestEnv};

fn mock_register(server: &mut ServerGuard) -> Mock {
  server
    .mock("POST", "/")
    .match_header("x-amz-target", format!("{ECS_TARGET}.RegisterTaskDefinition").as_str())
    .match_body(Matcher::PartialJson(json!({
      "family": "web",
      "containerDefinitions": [{
        "name": "web",
        "environment": [{"name": "FEATURE_FLAG", "value": ""}, {"name": "STAGE", "value": "prod"}]
      }]
    })))
    .with_status(200)
    .with_body(json!({"taskDefinition": {"taskDefinitionArn": REGISTERED_ARN}}).to_string())
    .create()
}

fn mock_describe(server: &mut ServerGuard, service: serde_json::Value) -> Mock {
  server
    .mock("POST", "/")
    .match_header("x-amz-target", format!("{ECS_TARGET}.DescribeServices").as_str())
    .with_status(200)
    .with_body(json!({"services": [service], "failures": []}).to_string())
    .create()
}

#[test]
fn deploy_registers_only_without_service() {
  let env = TestEnv::new();
  let mut server = mockito::Server::new();
  let register = mock_register(&mut server);

  env
    .cmd(&server.url())
    .args(["deploy", "--task-definition", "task-definition.json", "--region", "us-east-1"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Registered task definition"))
    .stdout(predicate::str::contains("skipped deployment"))
    .stderr(predicate::str::contains("Ignoring property 'compatibilities'"));

  register.assert();
  let outputs = env.outputs();
  assert!(outputs.contains(&format!("task-definition-arn={REGISTERED_ARN}\n")));
  assert!(outputs.contains("region=us-east-1\n"));
  assert!(!outputs.contains("platform="));
}

#[test]
fn deploy_reads_action_inputs_from_environment() {
  let env = TestEnv::new();
  let mut server = mockito::Server::new();
  let _register = mock_register(&mut server);
  let _describe = mock_describe(&mut server, json!({"serviceName": "web", "status": "ACTIVE"}));
  let update = server
    .mock("POST", "/")
    .match_header("x-amz-target", format!("{ECS_TARGET}.UpdateService").as_str())
    .match_body(Matcher::Json(json!({
      "cluster": "prod",
      "service": "web",
      "taskDefinition": REGISTERED_ARN,
      "forceNewDeployment": true
    })))
    .with_status(200)
    .with_body("{}")
    .create();

  env
    .cmd(&server.url())
    .arg("deploy")
    .env("INPUT_TASK-DEFINITION", "task-definition.json")
    .env("INPUT_SERVICE", "web")
    .env("INPUT_CLUSTER", "prod")
    .env("INPUT_FORCE-NEW-DEPLOYMENT", "TRUE")
    .env("AWS_REGION", "us-east-1")
    .assert()
    .success()
    .stdout(predicate::str::contains("ECS rolling update"));

  update.assert();
  let outputs = env.outputs();
  assert!(outputs.contains("platform=AWS:ECS\n"));
  assert!(outputs.contains(
    "deployment-url=https://console.aws.amazon.com/ecs/v2/clusters/prod/services/web/events?region=us-east-1\n"
  ));
}

#[test]
fn deploy_starts_codedeploy_deployment() {
  let env = TestEnv::new();
  let mut server = mockito::Server::new();
  let _register = mock_register(&mut server);
  let _describe = mock_describe(
    &mut server,
    json!({"serviceName": "web", "status": "ACTIVE", "deploymentController": {"type": "CODE_DEPLOY"}}),
  );
  let create = server
    .mock("POST", "/")
    .match_header("x-amz-target", "CodeDeploy_20141006.CreateDeployment")
    .match_body(Matcher::PartialJson(json!({
      "applicationName": "AppECS-default-web",
      "deploymentGroupName": "DgpECS-default-web",
      "description": "release 42"
    })))
    .with_status(200)
    .with_body(r#"{"deploymentId":"d-CLI123"}"#)
    .create();

  env
    .cmd(&server.url())
    .args([
      "deploy",
      "--task-definition",
      "task-definition.json",
      "--region",
      "us-east-1",
      "--service",
      "web",
      "--codedeploy-deployment-description",
      "release 42",
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("d-CLI123"));

  create.assert();
  let outputs = env.outputs();
  assert!(outputs.contains("platform=AWS:CodeDeploy\n"));
  assert!(outputs.contains("codedeploy-deployment-id=d-CLI123\n"));
}

#[test]
fn deploy_to_unsupported_controller_fails() {
  let env = TestEnv::new();
  let mut server = mockito::Server::new();
  let _register = mock_register(&mut server);
  let _describe = mock_describe(
    &mut server,
    json!({"serviceName": "web", "status": "ACTIVE", "deploymentController": {"type": "EXTERNAL"}}),
  );

  env
    .cmd(&server.url())
    .args(["deploy", "--task-definition", "task-definition.json", "--region", "us-east-1", "--service", "web"])
    .assert()
    .failure()
    .code(1)
    .stderr(predicate::str::contains("Unsupported deployment controller: EXTERNAL"));

  assert!(env.outputs().contains(&format!("task-definition-arn={REGISTERED_ARN}\n")));
}

#[test]
fn deploy_reports_registration_rejection() {
  let env = TestEnv::new();
  let mut server = mockito::Server::new();
  let _register = server
    .mock("POST", "/")
    .with_status(400)
    .with_body(r#"{"__type":"com.amazonaws.ecs#ClientException","message":"Invalid setting for container"}"#)
    .create();

  env
    .cmd(&server.url())
    .args(["deploy", "--task-definition", "task-definition.json", "--region", "us-east-1"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("task definition contents"))
    .stderr(predicate::str::contains(
      "failed to register task definition in ECS: RegisterTaskDefinition failed (HTTP 400): ClientException: Invalid setting for container",
    ))
    .stderr(predicate::function(|stderr: &str| {
      stderr.matches("Invalid setting for container").count() == 1
    }));
}

#[test]
fn deploy_prints_each_cause_once() {
  let env = TestEnv::new();

  let output = env
    .cmd("http://127.0.0.1:1")
    .args(["deploy", "--task-definition", "task-definition.json", "--region", "us-east-1"])
    .assert()
    .failure()
    .code(1)
    .get_output()
    .clone();

  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("failed to register task definition in ECS: RegisterTaskDefinition request failed: "));
  assert_eq!(stderr.matches("failed to register task definition in ECS").count(), 1);
  assert_eq!(stderr.matches("RegisterTaskDefinition request failed").count(), 1);
}

#[test]
fn deploy_treats_empty_force_input_as_false() {
  let env = TestEnv::new();
  let mut server = mockito::Server::new();
  let _register = mock_register(&mut server);
  let _describe = mock_describe(&mut server, json!({"serviceName": "web", "status": "ACTIVE"}));
  let update = server
    .mock("POST", "/")
    .match_header("x-amz-target", format!("{ECS_TARGET}.UpdateService").as_str())
    .match_body(Matcher::Json(json!({
      "cluster": "default",
      "service": "web",
      "taskDefinition": REGISTERED_ARN,
      "forceNewDeployment": false
    })))
    .with_status(200)
    .with_body("{}")
    .create();

  env
    .cmd(&server.url())
    .arg("deploy")
    .env("INPUT_TASK-DEFINITION", "task-definition.json")
    .env("INPUT_SERVICE", "web")
    .env("INPUT_FORCE-NEW-DEPLOYMENT", "")
    .env("AWS_REGION", "us-east-1")
    .assert()
    .success();

  update.assert();
}

#[test]
fn deploy_treats_empty_codedeploy_inputs_as_unset() {
  let env = TestEnv::new();
  let mut server = mockito::Server::new();
  let _register = mock_register(&mut server);
  let _describe = mock_describe(
    &mut server,
    json!({"serviceName": "web", "status": "ACTIVE", "deploymentController": {"type": "CODE_DEPLOY"}}),
  );
  let create = server
    .mock("POST", "/")
    .match_header("x-amz-target", "CodeDeploy_20141006.CreateDeployment")
    .match_body(Matcher::AllOf(vec![
      Matcher::PartialJson(json!({
        "applicationName": "AppECS-default-web",
        "deploymentGroupName": "DgpECS-default-web"
      })),
      Matcher::Regex("LoadBalancerInfo".to_string()),
      Matcher::Regex(REGISTERED_ARN.to_string()),
    ]))
    .with_status(200)
    .with_body(r#"{"deploymentId":"d-EMPTY1"}"#)
    .create();

  env
    .cmd(&server.url())
    .arg("deploy")
    .env("INPUT_TASK-DEFINITION", "task-definition.json")
    .env("INPUT_SERVICE", "web")
    .env("INPUT_FORCE-NEW-DEPLOYMENT", "")
    .env("INPUT_CODEDEPLOY-APPSPEC", "")
    .env("INPUT_CODEDEPLOY-APPLICATION", "")
    .env("INPUT_CODEDEPLOY-DEPLOYMENT-GROUP", "")
    .env("INPUT_CODEDEPLOY-DEPLOYMENT-DESCRIPTION", "")
    .env("AWS_REGION", "us-east-1")
    .assert()
    .success()
    .stdout(predicate::str::contains("d-EMPTY1"));

  create.assert();
  assert!(env.outputs().contains("codedeploy-deployment-id=d-EMPTY1
"));
}

#[test]
fn deploy_requires_credentials() {
  let env = TestEnv::new();

  env
    .cmd("http://127.0.0.1:1")
    .env_remove("AWS_ACCESS_KEY_ID")
    .args(["deploy", "--task-definition", "task-definition.json", "--region", "us-east-1"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("AWS credentials not found"));
}
