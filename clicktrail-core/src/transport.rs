//! Delivery seam between the tracker and the network.
//!
//! Two paths exist. [`Transport::deliver`] is the ordinary request used for
//! events emitted while the page is alive. [`Transport::deliver_reliable`]
//! is used on page exit and must not depend on the page staying alive after
//! it returns.

use async_trait::async_trait;
use clicktrail_sdk::client::{ClientError, TrackingClient};
use clicktrail_sdk::objects::TrackingPayload;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("client error: {0}")]
    Client(#[from] ClientError),
}

#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn deliver(&self, payload: &TrackingPayload) -> Result<(), TransportError>;

    async fn deliver_reliable(&self, payload: &TrackingPayload) -> Result<(), TransportError>;
}

#[async_trait]
impl Transport for TrackingClient {
    async fn deliver(&self, payload: &TrackingPayload) -> Result<(), TransportError> {
        self.send(payload).await?;
        Ok(())
    }

    async fn deliver_reliable(&self, payload: &TrackingPayload) -> Result<(), TransportError> {
        self.send_beacon(payload).await?;
        Ok(())
    }
}
