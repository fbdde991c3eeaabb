//! Request-boundary locale resolution and propagation.

use crate::listener::request::{Request, SESSION_LOCALE_KEY};
use crate::locale::{Locale, LocaleError};
use crate::translation::provider::TranslationProvider;
use crate::translation::LocaleAware;
use log::{info, warn};
use std::sync::Arc;

/// Resolves the effective locale: session `_locale` override, else the
/// request's own locale.
///
/// # Errors
/// - Returns the parse error when the session override is not a valid tag.
pub fn resolve_locale(request: &Request) -> Result<Locale, LocaleError> {
    match request.session().and_then(|session| session.get(SESSION_LOCALE_KEY)) {
        Some(raw) => Locale::parse(raw),
        None => Ok(request.locale().clone()),
    }
}

/// Pushes the resolved locale into the translation provider, the global
/// translator and the request itself, once per request.
///
/// Must run after the session is available and before any locale-sensitive
/// read in the same request.
pub struct LocaleListener {
    translatable: Arc<dyn TranslationProvider>,
    translator: Arc<dyn LocaleAware>,
}

impl LocaleListener {
    pub fn new(translatable: Arc<dyn TranslationProvider>, translator: Arc<dyn LocaleAware>) -> Self {
        Self {
            translatable,
            translator,
        }
    }

    /// An invalid session override falls back to the request locale.
    pub fn on_late_kernel_request(&self, request: &mut Request) {
        let locale = match resolve_locale(request) {
            Ok(locale) => locale,
            Err(err) => {
                warn!(
                    "event=locale_resolved module=listener status=fallback source=request error={}",
                    err
                );
                request.locale().clone()
            }
        };

        self.translatable.set_locale(&locale);
        self.translator.set_locale(&locale);
        info!(
            "event=locale_resolved module=listener status=ok locale={}",
            locale
        );
        request.set_locale(locale);
    }
}
