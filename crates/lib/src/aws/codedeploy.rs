//! CodeDeploy operations used by a blue/green deployment.

use serde_json::Value;
use tracing::info;

use crate::deploy::{CreateDeploymentRequest, DeploymentCoordinator};

use super::client::JsonClient;
use super::types::{AwsError, CODE_DEPLOY, Credentials};

/// CodeDeploy client for one region.
#[derive(Debug)]
pub struct CodeDeployClient {
  client: JsonClient,
}

impl CodeDeployClient {
  pub fn new(region: &str, credentials: Credentials) -> Result<Self, AwsError> {
    Ok(Self {
      client: JsonClient::new(&CODE_DEPLOY, region, credentials)?,
    })
  }

  pub fn with_endpoint(region: &str, credentials: Credentials, endpoint: &str) -> Result<Self, AwsError> {
    Ok(Self {
      client: JsonClient::with_endpoint(&CODE_DEPLOY, region, credentials, endpoint)?,
    })
  }
}

impl DeploymentCoordinator for CodeDeployClient {
  async fn create_deployment(&self, request: &CreateDeploymentRequest) -> Result<String, AwsError> {
    let response = self.client.call("CreateDeployment", request).await?;
    let deployment_id = response
      .get("deploymentId")
      .and_then(Value::as_str)
      .map(str::to_string)
      .ok_or_else(|| AwsError::MissingField {
        operation: "CreateDeployment".to_string(),
        field: "deploymentId".to_string(),
      })?;
    info!(
      deployment_id = %deployment_id,
      application = %request.application_name,
      deployment_group = %request.deployment_group_name,
      "created CodeDeploy deployment"
    );
    Ok(deployment_id)
  }
}
