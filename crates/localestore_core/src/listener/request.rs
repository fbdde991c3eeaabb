//! Minimal request/session context consumed by locale resolution.

use crate::locale::Locale;
use std::collections::BTreeMap;

/// Session key holding a user-selected locale override.
pub const SESSION_LOCALE_KEY: &str = "_locale";

/// String-valued session attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionBag {
    values: BTreeMap<String, String>,
}

impl SessionBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }
}

/// Inbound request as far as locale handling is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    default_locale: Locale,
    locale: Option<Locale>,
    session: Option<SessionBag>,
}

impl Request {
    pub fn new(default_locale: Locale) -> Self {
        Self {
            default_locale,
            locale: None,
            session: None,
        }
    }

    /// Builds a request whose locale is negotiated from `Accept-Language`.
    pub fn negotiate(accept_language: &str, available: &[Locale], default_locale: Locale) -> Self {
        let mut request = Self::new(default_locale);
        request.locale = preferred_locale(accept_language, available);
        request
    }

    pub fn with_session(mut self, session: SessionBag) -> Self {
        self.session = Some(session);
        self
    }

    /// Request locale, or the default locale when none was set.
    pub fn locale(&self) -> &Locale {
        self.locale.as_ref().unwrap_or(&self.default_locale)
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = Some(locale);
    }

    pub fn default_locale(&self) -> &Locale {
        &self.default_locale
    }

    pub fn set_default_locale(&mut self, locale: Locale) {
        self.default_locale = locale;
    }

    pub fn session(&self) -> Option<&SessionBag> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut SessionBag> {
        self.session.as_mut()
    }
}

/// Picks the available locale best matching an `Accept-Language` header.
///
/// Entries are ranked by q-value (ties keep header order); `q=0` entries and
/// malformed tags are ignored. An exact match wins over a primary-language
/// match within the same entry.
pub fn preferred_locale(accept_language: &str, available: &[Locale]) -> Option<Locale> {
    let mut ranked: Vec<(Locale, f32)> = accept_language
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';');
            let tag = Locale::parse(parts.next()?).ok()?;
            let quality = parts
                .find_map(|param| param.trim().strip_prefix("q="))
                .map_or(Some(1.0), |raw| raw.trim().parse::<f32>().ok())?;
            (quality > 0.0).then_some((tag, quality))
        })
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    ranked.into_iter().find_map(|(tag, _)| {
        available
            .iter()
            .find(|candidate| **candidate == tag)
            .or_else(|| {
                available
                    .iter()
                    .find(|candidate| candidate.language() == tag.language())
            })
            .cloned()
    })
}
