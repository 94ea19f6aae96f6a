//! Integration tests: full passes against an in-memory service.

mod mock_service;
mod scheduler_flow;
