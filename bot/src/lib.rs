//! seedhost library — exposes modules for the binary and integration testing.

#![cfg_attr(test, allow(clippy::expect_used))]

pub mod application;
pub mod commands;
pub mod domain;
pub mod infra;
pub mod output;
