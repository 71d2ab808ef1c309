//! Processors driving a tracked page.
//!
//! - `PageSession`: receives `PageSignal`s, owns scroll depth, the scroll
//!   debounce and the heartbeat timer, emits tracking events and performs
//!   the page-exit delivery.

pub mod page_session;

pub use page_session::{PageSession, SessionSummary};
