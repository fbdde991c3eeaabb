//! Locale context value.
//!
//! # Responsibility
//! - Represent the active language/region for a unit of work or one query.
//! - Reject malformed tags before they reach query hints or SQL params.
//!
//! # Invariants
//! - A `Locale` is immutable once constructed.
//! - "No locale" is modelled as `Option<Locale>::None`, never as an empty tag.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static LOCALE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z]{2,3}(?:[_-][A-Za-z0-9]{2,8})*$").expect("locale pattern must compile")
});

/// Locale parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleError {
    Empty,
    Malformed(String),
}

impl Display for LocaleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "locale must not be empty"),
            Self::Malformed(value) => write!(f, "malformed locale tag `{value}`"),
        }
    }
}

impl Error for LocaleError {}

/// Validated language tag such as `fr`, `en_US` or `pt-BR`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    /// Parses and validates one locale tag. Surrounding whitespace is ignored.
    ///
    /// The stored form is canonical (`ll_Ssss_RR`): lowercase language,
    /// title-case script, uppercase region and `_` separators. `pt-br` and
    /// `pt_BR` therefore parse to the same value.
    pub fn parse(value: &str) -> Result<Self, LocaleError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LocaleError::Empty);
        }
        if !LOCALE_PATTERN.is_match(trimmed) {
            return Err(LocaleError::Malformed(trimmed.to_string()));
        }
        Ok(Self(canonical(trimmed)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Primary language subtag, e.g. `pt` for `pt-BR`.
    pub fn language(&self) -> &str {
        self.0
            .split(['_', '-'])
            .next()
            .unwrap_or(self.0.as_str())
    }

}

fn canonical(tag: &str) -> String {
    tag.split(['_', '-'])
        .enumerate()
        .map(|(index, subtag)| {
            let alphabetic = subtag.chars().all(|ch| ch.is_ascii_alphabetic());
            match (index, subtag.len()) {
                (0, _) => subtag.to_ascii_lowercase(),
                (_, 2) if alphabetic => subtag.to_ascii_uppercase(),
                (_, 4) if alphabetic => {
                    let (head, tail) = subtag.split_at(1);
                    format!("{}{}", head.to_ascii_uppercase(), tail.to_ascii_lowercase())
                }
                _ => subtag.to_ascii_lowercase(),
            }
        })
        .collect::<Vec<_>>()
        .join("_")
}

impl Display for Locale {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for Locale {
    type Error = LocaleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Locale> for String {
    fn from(value: Locale) -> Self {
        value.0
    }
}

impl AsRef<str> for Locale {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::{Locale, LocaleError};

    #[test]
    fn parses_language_and_region_tags() {
        assert_eq!(Locale::parse("fr").unwrap().as_str(), "fr");
        assert_eq!(Locale::parse(" en_US ").unwrap().as_str(), "en_US");
        assert_eq!(Locale::parse("pt-BR").unwrap().language(), "pt");
    }

    #[test]
    fn rejects_empty_and_malformed_tags() {
        assert_eq!(Locale::parse("  "), Err(LocaleError::Empty));
        assert!(matches!(
            Locale::parse("fr'; DROP TABLE x"),
            Err(LocaleError::Malformed(_))
        ));
        assert!(matches!(Locale::parse("f"), Err(LocaleError::Malformed(_))));
    }

    #[test]
    fn case_and_separator_variants_parse_to_one_value() {
        let a = Locale::parse("en-US").unwrap();
        let b = Locale::parse("EN_us").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "en_US");
        assert_eq!(Locale::parse("zh-hant-tw").unwrap().as_str(), "zh_Hant_TW");
        assert_eq!(Locale::parse("es-419").unwrap().as_str(), "es_419");
        assert_eq!(Locale::parse("sl-ROZAJ").unwrap().as_str(), "sl_rozaj");
    }

    #[test]
    fn serde_roundtrip_validates() {
        let locale: Locale = serde_json::from_str("\"de\"").unwrap();
        assert_eq!(locale.as_str(), "de");
        assert!(serde_json::from_str::<Locale>("\"\"").is_err());
    }
}
