//! Unit tests for the seedhost bot
//!
//! These tests use mocked ports and run fast without external I/O.

mod architecture;
mod chat_service;
