//! Infrastructure layer — concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: environment access and the
//! HTTP clients for the control plane, Transmission, Telegram, and web pages.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod config;
pub mod control_plane;
pub mod page;
pub mod probe;
pub mod telegram;
pub mod transmission;
