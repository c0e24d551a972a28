//! AWS Signature Version 4 for JSON 1.1 calls.
//!
//! Signing itself is done by `aws-sigv4`; this module only maps our
//! [`Credentials`] onto a signing identity and returns the headers the signer
//! adds (`authorization`, `x-amz-date` and, with a session token,
//! `x-amz-security-token`).

use std::time::SystemTime;

use aws_sigv4::http_request::{SignableBody, SignableRequest, SigningSettings, sign};
use aws_sigv4::sign::v4;
use aws_smithy_runtime_api::client::identity::Identity;

use super::types::{AwsError, Credentials};

/// Who signs, for which region and service, and when.
#[derive(Debug, Clone, Copy)]
pub struct SigningParams<'a> {
  pub credentials: &'a Credentials,
  pub region: &'a str,
  pub service: &'a str,
  pub time: SystemTime,
}

/// The parts of an HTTP request covered by the signature.
#[derive(Debug, Clone, Copy)]
pub struct RequestParts<'a> {
  pub method: &'a str,
  pub url: &'a str,
  /// Headers to sign besides `host`, which the signer takes from `url`.
  pub headers: &'a [(&'a str, &'a str)],
  pub payload: &'a [u8],
}

fn identity(credentials: &Credentials) -> Identity {
  aws_credential_types::Credentials::new(
    credentials.access_key_id.clone(),
    credentials.secret_access_key.clone(),
    credentials.session_token.clone(),
    None,
    "environment",
  )
  .into()
}

/// Sign a request and return the headers to add to it.
pub fn signing_headers(params: &SigningParams<'_>, request: &RequestParts<'_>) -> Result<Vec<(String, String)>, AwsError> {
  let sign_error = |source: Box<dyn std::error::Error + Send + Sync>| AwsError::Sign {
    service: params.service.to_string(),
    source,
  };

  let identity = identity(params.credentials);
  let signing_params: aws_sigv4::http_request::SigningParams<'_> = v4::SigningParams::builder()
    .identity(&identity)
    .region(params.region)
    .name(params.service)
    .time(params.time)
    .settings(SigningSettings::default())
    .build()
    .map_err(|err| sign_error(err.into()))?
    .into();

  let signable = SignableRequest::new(
    request.method,
    request.url,
    request.headers.iter().copied(),
    SignableBody::Bytes(request.payload),
  )
  .map_err(|err| sign_error(err.into()))?;

  let (instructions, _signature) = sign(signable, &signing_params)
    .map_err(|err| sign_error(err.into()))?
    .into_parts();

  Ok(
    instructions
      .headers()
      .map(|(name, value)| (name.to_string(), value.to_string()))
      .collect(),
  )
}
