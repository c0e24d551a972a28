//! Clients for the AWS APIs a deployment talks to.
//!
//! Both ECS and CodeDeploy speak the AWS JSON 1.1 protocol, so a single signed
//! [`JsonClient`] carries the calls and [`EcsClient`] / [`CodeDeployClient`]
//! only add the operation names and response shapes.

pub mod client;
pub mod codedeploy;
pub mod ecs;
pub mod sign;
pub mod types;

pub use client::JsonClient;
pub use codedeploy::CodeDeployClient;
pub use ecs::EcsClient;
pub use types::{AwsError, CODE_DEPLOY, Credentials, ECS, ServiceSpec};
