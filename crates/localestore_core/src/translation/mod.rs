//! Translation subsystem: the query rewrite provider and the message
//! translator, both of which follow a process-wide active locale.
//!
//! # Invariants
//! - The provider only rewrites queries carrying its own walker hint.
//! - Active locales are shared across threads behind `RwLock`; the unit of
//!   work they feed into is not.

use crate::locale::Locale;

pub mod provider;
pub mod translator;

/// Hint naming the output walker a query should be routed through.
pub const HINT_OUTPUT_WALKER: &str = "output_walker";
/// Walker name recognized by the translation provider.
pub const TRANSLATION_WALKER: &str = "translation_walker";
/// Hint carrying the locale translatable fields should be hydrated in.
pub const HINT_TRANSLATABLE_LOCALE: &str = "translatable_locale";

/// Holder of an active locale that a locale listener can push into.
pub trait LocaleAware: Send + Sync {
    fn set_locale(&self, locale: &Locale);
    fn locale(&self) -> Option<Locale>;
}
