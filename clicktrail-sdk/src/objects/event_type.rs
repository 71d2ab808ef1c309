//! Event type vocabulary.

use serde::{Deserialize, Serialize};

/// Conversion types a host page is expected to report through the custom
/// conversion API. Anything else is still accepted as [`EventType::Custom`].
pub const RECOMMENDED_CONVERSIONS: [EventType; 5] = [
    EventType::Whatsapp,
    EventType::Form,
    EventType::Download,
    EventType::Call,
    EventType::Purchase,
];

/// Type tag of a tracking event.
///
/// Serialized as its plain string name. Unknown names round-trip through
/// [`EventType::Custom`] instead of being rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    Pageview,
    Scroll,
    CtaClick,
    Whatsapp,
    Form,
    Download,
    Call,
    Purchase,
    Custom(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            EventType::Pageview => "pageview",
            EventType::Scroll => "scroll",
            EventType::CtaClick => "cta_click",
            EventType::Whatsapp => "whatsapp",
            EventType::Form => "form",
            EventType::Download => "download",
            EventType::Call => "call",
            EventType::Purchase => "purchase",
            EventType::Custom(name) => name,
        }
    }

    /// Whether this type belongs to [`RECOMMENDED_CONVERSIONS`].
    pub fn is_recommended_conversion(&self) -> bool {
        RECOMMENDED_CONVERSIONS.contains(self)
    }
}

impl From<&str> for EventType {
    fn from(name: &str) -> Self {
        match name {
            "pageview" => EventType::Pageview,
            "scroll" => EventType::Scroll,
            "cta_click" => EventType::CtaClick,
            "whatsapp" => EventType::Whatsapp,
            "form" => EventType::Form,
            "download" => EventType::Download,
            "call" => EventType::Call,
            "purchase" => EventType::Purchase,
            other => EventType::Custom(other.to_owned()),
        }
    }
}

impl From<String> for EventType {
    fn from(name: String) -> Self {
        match EventType::from(name.as_str()) {
            EventType::Custom(_) => EventType::Custom(name),
            known => known,
        }
    }
}

impl From<EventType> for String {
    fn from(event_type: EventType) -> Self {
        match event_type {
            EventType::Custom(name) => name,
            known => known.as_str().to_owned(),
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_map_to_variants() {
        assert_eq!(EventType::from("cta_click"), EventType::CtaClick);
        assert_eq!(EventType::from("purchase"), EventType::Purchase);
        assert_eq!(
            EventType::from("newsletter_signup"),
            EventType::Custom("newsletter_signup".to_string())
        );
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&EventType::CtaClick).unwrap();
        assert_eq!(json, "\"cta_click\"");

        let custom: EventType = serde_json::from_str("\"quote_requested\"").unwrap();
        assert_eq!(custom, EventType::Custom("quote_requested".to_string()));
        assert_eq!(custom.to_string(), "quote_requested");
    }

    #[test]
    fn recommended_conversions() {
        assert!(EventType::Purchase.is_recommended_conversion());
        assert!(EventType::Whatsapp.is_recommended_conversion());
        assert!(!EventType::Pageview.is_recommended_conversion());
        assert!(!EventType::Custom("lead".to_string()).is_recommended_conversion());
    }
}
