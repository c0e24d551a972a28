//! End-to-end tests for ecsdeploy-lib against mock ECS and CodeDeploy endpoints.
