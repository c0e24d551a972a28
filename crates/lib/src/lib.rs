//! ecsdeploy-lib: Core types and logic for ecs-deploy
//!
//! This crate registers an ECS task definition and rolls it out to a service:
//! - `taskdef`: cleans an authored task definition into a registration payload
//! - `appspec`: rewrites a CodeDeploy AppSpec with the registered task definition
//! - `deploy`: the deployment controller dispatch and the top-level driver
//! - `aws`: signed JSON clients for the ECS and CodeDeploy APIs
//! - `outputs`: sinks for the values a run publishes to its CI host

pub mod appspec;
pub mod aws;
pub mod consts;
pub mod deploy;
pub mod outputs;
pub mod taskdef;
pub mod util;
