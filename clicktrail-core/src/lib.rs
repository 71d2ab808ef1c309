#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::panic))]

pub mod config;
pub mod emitter;
pub mod events;
pub mod identifier;
pub mod interaction;
pub mod processors;
pub mod scroll;
pub mod tracker;
pub mod transport;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{ConfigError, TrackerConfig};
pub use identifier::{ClickId, PageContext};
pub use tracker::{ConversionError, Tracker, TrackerError};
pub use transport::{Transport, TransportError};
