//! Tracing setup for the service.

mod init;

pub use init::init_telemetry;
