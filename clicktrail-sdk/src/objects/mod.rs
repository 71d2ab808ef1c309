pub mod event_type;
pub mod payload;
pub mod values;

pub use event_type::{EventType, RECOMMENDED_CONVERSIONS};
pub use payload::TrackingPayload;
pub use values::{
    CallClick, CtaClick, DownloadClick, FormSubmit, Heartbeat, PageExit, PageviewStart,
    ScrollMilestone, WhatsappClick,
};
