use clicktrail_sdk::objects::{
    CallClick, CtaClick, DownloadClick, EventType, FormSubmit, WhatsappClick,
};
use regex::Regex;
use smallvec::SmallVec;
use time::OffsetDateTime;
use url::Url;

use super::{ClickTarget, Element};
use crate::config::TrackerConfig;

/// A conversion recognised from a click or a form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    Cta(CtaClick),
    Whatsapp(WhatsappClick),
    Download(DownloadClick),
    Call(CallClick),
    Form(FormSubmit),
}

impl Conversion {
    pub fn event_type(&self) -> EventType {
        match self {
            Conversion::Cta(_) => EventType::CtaClick,
            Conversion::Whatsapp(_) => EventType::Whatsapp,
            Conversion::Download(_) => EventType::Download,
            Conversion::Call(_) => EventType::Call,
            Conversion::Form(_) => EventType::Form,
        }
    }

    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            Conversion::Cta(v) => serde_json::to_value(v),
            Conversion::Whatsapp(v) => serde_json::to_value(v),
            Conversion::Download(v) => serde_json::to_value(v),
            Conversion::Call(v) => serde_json::to_value(v),
            Conversion::Form(v) => serde_json::to_value(v),
        }
    }
}

/// Matches click targets and forms against the known conversion signatures.
///
/// Every detector runs on every click, so a CTA-marked WhatsApp link yields
/// both a `cta_click` and a `whatsapp` conversion. Missing or malformed
/// attributes leave the corresponding field empty.
#[derive(Debug, Clone)]
pub struct InteractionDetector {
    page_url: Url,
    cta_attribute: String,
    form_attribute: String,
    cta_text_limit: usize,
    download_href: Option<Regex>,
    messaging_href: Option<Regex>,
}

impl InteractionDetector {
    pub fn new(config: &TrackerConfig, page_url: Url) -> Result<Self, regex::Error> {
        let download_href = alternation(&config.download_extensions)
            .map(|exts| Regex::new(&format!(r"(?i)\.(?:{exts})$")))
            .transpose()?;
        let messaging_href = alternation(&config.messaging_hosts)
            .map(|hosts| Regex::new(&format!("(?i)(?:{hosts})")))
            .transpose()?;

        Ok(Self {
            page_url,
            cta_attribute: config.cta_attribute.clone(),
            form_attribute: config.form_attribute.clone(),
            cta_text_limit: config.cta_text_limit,
            download_href,
            messaging_href,
        })
    }

    pub fn detect_click(
        &self,
        target: &ClickTarget,
        now: OffsetDateTime,
    ) -> SmallVec<[Conversion; 2]> {
        let mut found = SmallVec::new();

        if let Some(cta) = target.closest(|e| e.has_attr(&self.cta_attribute)) {
            found.push(Conversion::Cta(self.cta_click(cta, now)));
        }

        if let Some(re) = &self.messaging_href {
            if let Some(href) = target
                .closest(|e| e.link_href().is_some_and(|href| re.is_match(href)))
                .and_then(Element::link_href)
            {
                found.push(Conversion::Whatsapp(WhatsappClick {
                    url: self.resolve(href),
                    timestamp: now,
                }));
            }
        }

        if let Some(link) = target.closest(|e| self.is_download_link(e)) {
            found.push(Conversion::Download(self.download_click(link, now)));
        }

        if let Some(href) = target
            .closest(|e| e.link_href().is_some_and(|href| tel_number(href).is_some()))
            .and_then(Element::link_href)
        {
            let phone_number = tel_number(href)
                .map(str::trim)
                .filter(|number| !number.is_empty())
                .map(String::from);
            found.push(Conversion::Call(CallClick {
                phone_number,
                timestamp: now,
            }));
        }

        found
    }

    /// A submitted form, if it carries the form marker attribute.
    pub fn detect_submit(&self, form: &Element, now: OffsetDateTime) -> Option<Conversion> {
        if !form.is("form") {
            return None;
        }
        let marker = form.attr(&self.form_attribute)?.trim();
        let form_name = if marker.is_empty() { "form" } else { marker };

        Some(Conversion::Form(FormSubmit {
            form_name: form_name.to_string(),
            timestamp: now,
        }))
    }

    fn cta_click(&self, element: &Element, now: OffsetDateTime) -> CtaClick {
        let cta_name = element
            .attr(&self.cta_attribute)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from);
        let cta_text = element
            .text
            .trim()
            .chars()
            .take(self.cta_text_limit)
            .collect();

        CtaClick {
            cta_name,
            cta_text,
            cta_url: element.link_href().map(|href| self.resolve(href)),
            timestamp: now,
        }
    }

    fn is_download_link(&self, element: &Element) -> bool {
        if !element.is("a") {
            return false;
        }
        if element.has_attr("download") {
            return true;
        }
        match (&self.download_href, element.link_href()) {
            (Some(re), Some(href)) => re.is_match(href),
            _ => false,
        }
    }

    fn download_click(&self, link: &Element, now: OffsetDateTime) -> DownloadClick {
        let file_url = link.link_href().map(|href| self.resolve(href));
        let file_name = link
            .attr("download")
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .or_else(|| file_url.as_deref().and_then(last_path_segment));

        DownloadClick {
            file_url,
            file_name,
            timestamp: now,
        }
    }

    /// Resolve `href` against the page URL; unparseable values pass through.
    fn resolve(&self, href: &str) -> String {
        self.page_url
            .join(href)
            .map(String::from)
            .unwrap_or_else(|_| href.to_string())
    }
}

fn alternation(items: &[String]) -> Option<String> {
    let escaped: Vec<String> = items
        .iter()
        .map(|item| item.trim().trim_start_matches('.'))
        .filter(|item| !item.is_empty())
        .map(regex::escape)
        .collect();
    (!escaped.is_empty()).then(|| escaped.join("|"))
}

fn tel_number(href: &str) -> Option<&str> {
    let scheme = href.get(..4)?;
    scheme
        .eq_ignore_ascii_case("tel:")
        .then(|| href.get(4..))
        .flatten()
}

fn last_path_segment(url: &str) -> Option<String> {
    let segment = match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back().map(String::from)),
        Err(_) => url.rsplit('/').next().map(String::from),
    }?;
    (!segment.is_empty()).then_some(segment)
}
