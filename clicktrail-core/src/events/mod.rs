//! Page signals flowing from the host page into the tracker.
//!
//! The host never touches tracker state directly. It pushes [`PageSignal`]s
//! into a channel and the page session processor, the only owner of the
//! mutable tracking state, reacts to them in order.

pub mod channels;
pub mod types;

pub use channels::{DEFAULT_CHANNEL_BUFFER, PageSignalReceiver, PageSignalSender, page_signal_channel};
pub use types::PageSignal;
