//! Run engine: account sessions and the daily cycle around them.

pub mod scheduler;
pub mod selection;
pub mod session;

pub use scheduler::{CycleScheduler, HttpConnector, ServiceConnector};
pub use session::{AccountSession, SessionSettings};
