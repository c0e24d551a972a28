//! Types shared by the AWS clients.

use std::env;

use thiserror::Error;

/// Errors that can occur talking to an AWS API.
#[derive(Debug, Error)]
pub enum AwsError {
  /// No credentials were found in the environment.
  #[error("AWS credentials not found: set AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY")]
  MissingCredentials,

  /// The endpoint URL could not be used.
  #[error("invalid endpoint URL '{0}'")]
  InvalidEndpoint(String),

  /// The HTTP client could not be built.
  #[error("failed to build HTTP client")]
  Client(#[source] reqwest::Error),

  /// The request never got a response.
  #[error("{operation} request failed")]
  Http {
    operation: String,
    #[source]
    source: reqwest::Error,
  },

  /// The request body could not be encoded.
  #[error("failed to encode {operation} request")]
  Encode {
    operation: String,
    #[source]
    source: serde_json::Error,
  },

  /// The request could not be signed.
  #[error("failed to sign {service} request")]
  Sign {
    service: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  /// The API answered with an error.
  #[error("{operation} failed (HTTP {status}): {code}: {message}")]
  Service {
    operation: String,
    status: u16,
    code: String,
    message: String,
  },

  /// The response body was not what the operation returns.
  #[error("failed to decode {operation} response")]
  Decode {
    operation: String,
    #[source]
    source: serde_json::Error,
  },

  /// The response lacked a field the caller needs.
  #[error("{operation} response is missing '{field}'")]
  MissingField { operation: String, field: String },
}

/// Static AWS credentials.
#[derive(Clone)]
pub struct Credentials {
  pub access_key_id: String,
  pub secret_access_key: String,
  pub session_token: Option<String>,
}

impl Credentials {
  pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>, session_token: Option<String>) -> Self {
    Self {
      access_key_id: access_key_id.into(),
      secret_access_key: secret_access_key.into(),
      session_token,
    }
  }

  /// Read credentials from `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and
  /// the optional `AWS_SESSION_TOKEN`.
  pub fn from_env() -> Result<Self, AwsError> {
    let access_key_id = non_empty_var("AWS_ACCESS_KEY_ID").ok_or(AwsError::MissingCredentials)?;
    let secret_access_key = non_empty_var("AWS_SECRET_ACCESS_KEY").ok_or(AwsError::MissingCredentials)?;
    Ok(Self::new(access_key_id, secret_access_key, non_empty_var("AWS_SESSION_TOKEN")))
  }
}

impl std::fmt::Debug for Credentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Credentials")
      .field("access_key_id", &self.access_key_id)
      .field("secret_access_key", &"<redacted>")
      .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
      .finish()
  }
}

/// Wire details of one AWS JSON 1.1 service.
#[derive(Debug)]
pub struct ServiceSpec {
  /// Name used in the SigV4 credential scope.
  pub signing_name: &'static str,
  /// Prefix of the `X-Amz-Target` header.
  pub target_prefix: &'static str,
  /// Service-specific endpoint override variable.
  pub endpoint_env: &'static str,
}

pub static ECS: ServiceSpec = ServiceSpec {
  signing_name: "ecs",
  target_prefix: "AmazonEC2ContainerServiceV20141113",
  endpoint_env: "AWS_ENDPOINT_URL_ECS",
};

pub static CODE_DEPLOY: ServiceSpec = ServiceSpec {
  signing_name: "codedeploy",
  target_prefix: "CodeDeploy_20141006",
  endpoint_env: "AWS_ENDPOINT_URL_CODEDEPLOY",
};

impl ServiceSpec {
  /// Endpoint for `region`, honouring `AWS_ENDPOINT_URL_<SERVICE>` and then
  /// `AWS_ENDPOINT_URL`.
  pub fn endpoint(&self, region: &str) -> String {
    non_empty_var(self.endpoint_env)
      .or_else(|| non_empty_var("AWS_ENDPOINT_URL"))
      .unwrap_or_else(|| format!("https://{}.{}.amazonaws.com", self.signing_name, region))
  }
}

fn non_empty_var(name: &str) -> Option<String> {
  env::var(name).ok().filter(|value| !value.is_empty())
}
