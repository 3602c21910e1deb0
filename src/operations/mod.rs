//! Task operations - shared business logic layer
//!
//! This module contains the core business logic for task and group operations,
//! shared between the Web API, the Slack slash commands and the CLI.

pub mod filter;
pub mod tasks;
