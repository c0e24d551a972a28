//! Integration tests for the ecs-deploy binary.
//!
//! The AWS endpoints are mockito servers reached through the
//! `AWS_ENDPOINT_URL_*` overrides.

mod common;
mod deploy_tests;
mod render_tests;
