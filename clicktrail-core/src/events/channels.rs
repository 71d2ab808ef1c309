//! Page signal channel factory.

use super::types::PageSignal;
use tokio::sync::mpsc;

/// Default buffer size for the page signal channel.
///
/// Scroll bursts are coalesced by the session, so this only needs to absorb
/// the time between two polls of the session task.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Sender handle for PageSignal events.
pub type PageSignalSender = mpsc::Sender<PageSignal>;
/// Receiver handle for PageSignal events.
pub type PageSignalReceiver = mpsc::Receiver<PageSignal>;

/// Create a new PageSignal channel.
pub fn page_signal_channel() -> (PageSignalSender, PageSignalReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
