//! Lakeflow Layout Library
//!
//! Deploy-time half of Lakeflow: turns per-table workflow configuration into
//! a deployed layout on AWS — provisioned script/temp buckets, an uploaded
//! extraction script, and a declarative Glue workflow description (one job
//! plus an optional cron trigger).
//!
//! # Overview
//!
//! - **Configuration**: parse and validate `workflow_config.json`
//!   (`config` module)
//! - **Provisioning**: idempotent script/temp bucket creation (`provision`)
//! - **Script Upload**: per-workflow extraction script keys (`script`)
//! - **Workflow Assembly**: job definition, default arguments, and schedule
//!   (`workflow`)

pub mod config;
pub mod provision;
pub mod script;
pub mod workflow;

// Re-export commonly used types
pub use config::{ScheduleType, WorkflowConfig, WorkflowConfigFile};
pub use workflow::{generate_layout, SystemParams, Workflow};
