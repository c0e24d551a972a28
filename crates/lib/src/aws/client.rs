//! Signed AWS JSON 1.1 client.
//!
//! Every operation is a `POST /` whose body is the JSON request and whose
//! `X-Amz-Target` header names the operation. Errors come back as a non-2xx
//! status with a `{"__type": ..., "message": ...}` body.

use std::time::SystemTime;

use reqwest::Url;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::sign::{RequestParts, SigningParams, signing_headers};
use super::types::{AwsError, Credentials, ServiceSpec};

const JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// Client for one AWS JSON 1.1 service in one region.
#[derive(Debug)]
pub struct JsonClient {
  http: reqwest::Client,
  endpoint: Url,
  region: String,
  service: &'static ServiceSpec,
  credentials: Credentials,
}

impl JsonClient {
  /// Create a client for the service's regional endpoint (or its override).
  pub fn new(service: &'static ServiceSpec, region: &str, credentials: Credentials) -> Result<Self, AwsError> {
    let endpoint = service.endpoint(region);
    Self::with_endpoint(service, region, credentials, &endpoint)
  }

  /// Create a client that sends requests to `endpoint`.
  pub fn with_endpoint(
    service: &'static ServiceSpec,
    region: &str,
    credentials: Credentials,
    endpoint: &str,
  ) -> Result<Self, AwsError> {
    let url = Url::parse(endpoint).map_err(|_| AwsError::InvalidEndpoint(endpoint.to_string()))?;
    if url.host_str().is_none() {
      return Err(AwsError::InvalidEndpoint(endpoint.to_string()));
    }

    let http = reqwest::Client::builder()
      .user_agent(concat!("ecs-deploy/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(AwsError::Client)?;

    Ok(Self {
      http,
      endpoint: url,
      region: region.to_string(),
      service,
      credentials,
    })
  }

  /// Call `operation` and return the raw JSON response.
  pub async fn call<B: Serialize + ?Sized>(&self, operation: &str, body: &B) -> Result<Value, AwsError> {
    let payload = serde_json::to_string(body).map_err(|source| AwsError::Encode {
      operation: operation.to_string(),
      source,
    })?;
    let target = format!("{}.{}", self.service.target_prefix, operation);
    let headers = [("content-type", JSON_CONTENT_TYPE), ("x-amz-target", target.as_str())];

    let signed = signing_headers(
      &SigningParams {
        credentials: &self.credentials,
        region: &self.region,
        service: self.service.signing_name,
        time: SystemTime::now(),
      },
      &RequestParts {
        method: "POST",
        url: self.endpoint.as_str(),
        headers: &headers,
        payload: payload.as_bytes(),
      },
    )?;

    debug!(operation = %target, endpoint = %self.endpoint, "calling AWS");

    let mut request = self.http.post(self.endpoint.clone());
    for (name, value) in headers {
      request = request.header(name, value);
    }
    for (name, value) in signed.iter().filter(|(name, _)| !name.eq_ignore_ascii_case("host")) {
      request = request.header(name.as_str(), value.as_str());
    }

    let response = request.body(payload).send().await.map_err(|source| AwsError::Http {
      operation: operation.to_string(),
      source,
    })?;

    let status = response.status();
    let text = response.text().await.map_err(|source| AwsError::Http {
      operation: operation.to_string(),
      source,
    })?;

    if !status.is_success() {
      return Err(service_error(operation, status.as_u16(), &text));
    }

    if text.trim().is_empty() {
      return Ok(Value::Object(Default::default()));
    }

    serde_json::from_str(&text).map_err(|source| AwsError::Decode {
      operation: operation.to_string(),
      source,
    })
  }

  /// Call `operation` and decode the response into `R`.
  pub async fn call_as<B: Serialize + ?Sized, R: DeserializeOwned>(&self, operation: &str, body: &B) -> Result<R, AwsError> {
    let response = self.call(operation, body).await?;
    serde_json::from_value(response).map_err(|source| AwsError::Decode {
      operation: operation.to_string(),
      source,
    })
  }
}

/// Build a `Service` error from an error response body.
///
/// `__type` may be qualified (`com.amazonaws.ecs#ClientException`); only the
/// part after `#` is kept. Bodies that are not JSON are reported verbatim.
fn service_error(operation: &str, status: u16, body: &str) -> AwsError {
  let parsed: Value = serde_json::from_str(body).unwrap_or(Value::Null);
  let code = parsed
    .get("__type")
    .and_then(Value::as_str)
    .map(|code| code.rsplit('#').next().unwrap_or(code).to_string())
    .unwrap_or_else(|| "UnknownError".to_string());
  let message = parsed
    .get("message")
    .or_else(|| parsed.get("Message"))
    .and_then(Value::as_str)
    .map(str::to_string)
    .unwrap_or_else(|| body.trim().to_string());

  AwsError::Service {
    operation: operation.to_string(),
    status,
    code,
    message,
  }
}
