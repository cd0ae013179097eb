//! Webcal feed integration
//!
//! Downloads ICS calendar feeds over HTTP(S) with bounded timeouts, a body
//! size limit and a caller-supplied check on every redirect hop.

pub mod client;
mod config;
mod error;

pub use client::{HttpWebcalClient, RedirectGuard, WebcalClient};
pub use config::WebcalConfig;
pub use error::WebcalError;
