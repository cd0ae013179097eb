//! Domain layer for calsync
//!
//! Contains the calendar subscription model, schedule events, the transient
//! feed records produced by the ICS parser, and domain errors.
//! This layer has no I/O and defines the ubiquitous language.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
