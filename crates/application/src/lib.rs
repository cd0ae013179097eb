//! Application layer - Use cases and orchestration
//!
//! Contains the ICS feed parser, the event converter, the URL safety
//! validator and the subscription sync orchestrator, together with the port
//! definitions they depend on. Adapters in the infrastructure layer
//! implement the ports.

pub mod error;
pub mod feed_parser;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use feed_parser::{parse_feed, parse_ics_datetime};
pub use ports::*;
pub use services::*;
