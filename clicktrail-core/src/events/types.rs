use crate::interaction::{ClickTarget, Element};
use crate::scroll::ScrollMetrics;

/// Lifecycle and interaction signals observed on the page.
#[derive(Debug, Clone)]
pub enum PageSignal {
    /// The page scrolled. Bursts are debounced before evaluation.
    Scroll(ScrollMetrics),
    /// A click anywhere in the document.
    Click(ClickTarget),
    /// A form was submitted.
    Submit(Element),
    /// The page is being torn down.
    Unload,
}

impl PageSignal {
    pub fn kind(&self) -> &'static str {
        match self {
            PageSignal::Scroll(_) => "scroll",
            PageSignal::Click(_) => "click",
            PageSignal::Submit(_) => "submit",
            PageSignal::Unload => "unload",
        }
    }
}
