//! TENSOR DAILY: daily react & strategy-rotation runner for TruthTensor
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod accounts;
pub mod api;
pub mod config;
pub mod engine;
pub mod http;
pub mod types;
