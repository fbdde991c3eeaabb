//! Process-wide message translator.

use crate::locale::Locale;
use crate::translation::LocaleAware;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

/// Key/message catalogs per locale with a fallback locale.
///
/// Lookup order: active locale, its primary language, then the fallback
/// locale, then the key itself.
#[derive(Debug)]
pub struct Translator {
    fallback: Locale,
    active: RwLock<Locale>,
    catalogs: BTreeMap<String, BTreeMap<String, String>>,
}

impl Translator {
    pub fn new(fallback: Locale) -> Self {
        Self {
            active: RwLock::new(fallback.clone()),
            fallback,
            catalogs: BTreeMap::new(),
        }
    }

    pub fn add_message(
        &mut self,
        locale: &Locale,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> &mut Self {
        self.catalogs
            .entry(locale.as_str().to_string())
            .or_default()
            .insert(key.into(), message.into());
        self
    }

    pub fn active_locale(&self) -> Locale {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn trans(&self, key: &str) -> String {
        let active = self.active_locale();
        let message = [active.as_str(), active.language(), self.fallback.as_str()]
            .into_iter()
            .find_map(|catalog| self.catalogs.get(catalog)?.get(key))
            .cloned()
            .unwrap_or_else(|| key.to_string());
        message
    }
}

impl LocaleAware for Translator {
    fn set_locale(&self, locale: &Locale) {
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = locale.clone();
    }

    fn locale(&self) -> Option<Locale> {
        Some(self.active_locale())
    }
}

#[cfg(test)]
mod tests {
    use super::Translator;
    use crate::locale::Locale;
    use crate::translation::LocaleAware;

    fn locale(tag: &str) -> Locale {
        Locale::parse(tag).unwrap()
    }

    #[test]
    fn falls_back_from_region_to_language_to_default() {
        let mut translator = Translator::new(locale("en"));
        translator
            .add_message(&locale("en"), "greeting", "Hello")
            .add_message(&locale("en"), "farewell", "Bye")
            .add_message(&locale("fr"), "greeting", "Bonjour");

        translator.set_locale(&locale("fr_CA"));
        assert_eq!(translator.trans("greeting"), "Bonjour");
        assert_eq!(translator.trans("farewell"), "Bye");
        assert_eq!(translator.trans("unknown.key"), "unknown.key");
        assert_eq!(translator.locale(), Some(locale("fr_CA")));
    }

    #[test]
    fn catalog_lookup_ignores_tag_spelling() {
        let mut translator = Translator::new(locale("en"));
        translator.add_message(&locale("pt_BR"), "greeting", "Olá");

        translator.set_locale(&locale("pt-br"));
        assert_eq!(translator.trans("greeting"), "Olá");
    }
}
