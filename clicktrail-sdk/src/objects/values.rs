//! Event value records.
//!
//! Each record is serialized to JSON and carried in
//! [`TrackingPayload::event_value`](super::TrackingPayload). Optional fields
//! are omitted when the page did not provide them, except `cta_url`, which
//! the collector expects as an explicit `null`.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// First `pageview` of a visit, describing the landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageviewStart {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Periodic `pageview` reporting cumulative time on page, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heartbeat {
    pub time_on_page: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Final `pageview` delivered when the page is torn down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageExit {
    pub time_on_page: u64,
    pub max_scroll_depth: u8,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// A scroll threshold crossed for the first time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollMilestone {
    pub depth: u8,
    pub scroll_percent: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CtaClick {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta_name: Option<String>,
    pub cta_text: String,
    pub cta_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhatsappClick {
    pub url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSubmit {
    pub form_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadClick {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallClick {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn cta_click_keeps_null_url() {
        let click = CtaClick {
            cta_name: Some("hero".to_string()),
            cta_text: "Buy Now".to_string(),
            cta_url: None,
            timestamp: datetime!(2026-10-16 12:00:00 UTC),
        };
        let value = serde_json::to_value(&click).unwrap();
        assert_eq!(value["cta_url"], serde_json::Value::Null);
        assert_eq!(value["timestamp"], "2026-10-16T12:00:00Z");
    }

    #[test]
    fn missing_optional_fields_are_omitted() {
        let call = CallClick {
            phone_number: None,
            timestamp: datetime!(2026-10-16 12:00:00 UTC),
        };
        let value = serde_json::to_value(&call).unwrap();
        assert!(value.get("phone_number").is_none());
    }
}
