//! Shotforged - vendor package ingest and client delivery tool
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod delivery;
pub mod ingest;
pub mod report;
pub mod tracking;
