//! ECS operations used by a deployment.

use serde_json::{Value, json};
use tracing::info;

use crate::deploy::{ServiceLookup, TaskDefinitionArn, TaskScheduler, UpdateServiceRequest};

use super::client::JsonClient;
use super::types::{AwsError, Credentials, ECS};

/// ECS client for one region.
#[derive(Debug)]
pub struct EcsClient {
  client: JsonClient,
}

impl EcsClient {
  pub fn new(region: &str, credentials: Credentials) -> Result<Self, AwsError> {
    Ok(Self {
      client: JsonClient::new(&ECS, region, credentials)?,
    })
  }

  pub fn with_endpoint(region: &str, credentials: Credentials, endpoint: &str) -> Result<Self, AwsError> {
    Ok(Self {
      client: JsonClient::with_endpoint(&ECS, region, credentials, endpoint)?,
    })
  }
}

impl TaskScheduler for EcsClient {
  async fn register_task_definition(&self, task_definition: &Value) -> Result<TaskDefinitionArn, AwsError> {
    let response = self.client.call("RegisterTaskDefinition", task_definition).await?;
    let arn = response
      .pointer("/taskDefinition/taskDefinitionArn")
      .and_then(Value::as_str)
      .map(TaskDefinitionArn::new)
      .ok_or_else(|| AwsError::MissingField {
        operation: "RegisterTaskDefinition".to_string(),
        field: "taskDefinition.taskDefinitionArn".to_string(),
      })?;
    info!(arn = %arn, "registered task definition");
    Ok(arn)
  }

  async fn describe_service(&self, cluster: &str, service: &str) -> Result<ServiceLookup, AwsError> {
    let request = json!({
      "cluster": cluster,
      "services": [service],
    });
    self.client.call_as("DescribeServices", &request).await
  }

  async fn update_service(&self, request: &UpdateServiceRequest) -> Result<(), AwsError> {
    self.client.call("UpdateService", request).await?;
    info!(cluster = %request.cluster, service = %request.service, "updated service");
    Ok(())
  }
}
