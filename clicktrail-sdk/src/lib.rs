//! Shared types for Clicktrail.
//!
//! The tracker and the collector agree on the wire format defined in
//! [`objects`]. The HTTP client in [`client`] is gated behind the `client`
//! cargo feature so the collector does not pull in `reqwest`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

#[cfg(feature = "client")]
pub mod client;
pub mod objects;

/// Path of the tracking endpoint, relative to the collector root.
pub const ENDPOINT_PATH: &str = "/api/tracking/event";
