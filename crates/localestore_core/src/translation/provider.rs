//! Translation provider contract and the `translations`-table implementation.

use crate::config::CoreConfig;
use crate::locale::Locale;
use crate::model::entity::IDENTIFIER_COLUMN;
use crate::query::statement::{column_ref, Join, SelectStatement};
use crate::translation::{LocaleAware, TRANSLATION_WALKER};
use rusqlite::types::Value;
use std::sync::{PoisonError, RwLock};

/// Rewrites compiled statements so translatable columns hydrate in a locale.
pub trait TranslationProvider: LocaleAware {
    /// Walker hint value this provider answers to.
    fn walker_name(&self) -> &str;

    /// Locale base rows are stored in.
    fn default_locale(&self) -> &Locale;

    /// Rewrites `statement` for `locale`; `None` means the provider's active
    /// locale, then its default.
    fn rewrite(&self, statement: &mut SelectStatement, locale: Option<&Locale>);

    /// Locale a rewrite with `requested` would target.
    fn effective_locale(&self, requested: Option<&Locale>) -> Locale {
        requested
            .cloned()
            .or_else(|| self.locale())
            .unwrap_or_else(|| self.default_locale().clone())
    }
}

/// Provider joining the `translations` table per translatable column.
#[derive(Debug)]
pub struct SqliteTranslationProvider {
    default_locale: Locale,
    fallback: bool,
    active: RwLock<Option<Locale>>,
}

impl SqliteTranslationProvider {
    pub fn new(default_locale: Locale, fallback: bool) -> Self {
        Self {
            default_locale,
            fallback,
            active: RwLock::new(None),
        }
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(config.default_locale.clone(), config.translation_fallback)
    }

    pub fn fallback(&self) -> bool {
        self.fallback
    }
}

impl LocaleAware for SqliteTranslationProvider {
    fn set_locale(&self, locale: &Locale) {
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = Some(locale.clone());
    }

    fn locale(&self) -> Option<Locale> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TranslationProvider for SqliteTranslationProvider {
    fn walker_name(&self) -> &str {
        TRANSLATION_WALKER
    }

    fn default_locale(&self) -> &Locale {
        &self.default_locale
    }

    fn rewrite(&self, statement: &mut SelectStatement, locale: Option<&Locale>) {
        let locale = self.effective_locale(locale);
        if locale == self.default_locale {
            return;
        }

        let alias = statement.alias.clone();
        let entity = statement.entity;
        let mut joins = Vec::new();
        for projection in statement
            .projections
            .iter_mut()
            .filter(|projection| projection.translatable)
        {
            let join_alias = format!("{alias}__tr_{}", projection.column);
            joins.push(Join {
                sql: format!(
                    "LEFT JOIN translations {join_alias} \
                     ON {join_alias}.object_class = ? \
                     AND {join_alias}.field = ? \
                     AND {join_alias}.foreign_key = {} \
                     AND {join_alias}.locale = ?",
                    column_ref(&alias, IDENTIFIER_COLUMN)
                ),
                params: vec![
                    Value::Text(entity.to_string()),
                    Value::Text(projection.column.to_string()),
                    Value::Text(locale.as_str().to_string()),
                ],
            });
            projection.expr = if self.fallback {
                format!("COALESCE({join_alias}.content, {})", projection.expr)
            } else {
                format!("{join_alias}.content")
            };
        }
        statement.joins.extend(joins);
    }
}

#[cfg(test)]
mod tests {
    use super::{SqliteTranslationProvider, TranslationProvider};
    use crate::locale::Locale;
    use crate::query::statement::{Projection, SelectStatement, Selection};
    use crate::translation::LocaleAware;

    fn statement() -> SelectStatement {
        SelectStatement {
            entity: "Page",
            table: "pages",
            alias: "p".to_string(),
            projections: vec![
                Projection {
                    column: "id",
                    expr: "p.\"id\"".to_string(),
                    translatable: false,
                },
                Projection {
                    column: "title",
                    expr: "p.\"title\"".to_string(),
                    translatable: true,
                },
            ],
            selection: Selection::All,
            joins: Vec::new(),
            conditions: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    fn locale(tag: &str) -> Locale {
        Locale::parse(tag).unwrap()
    }

    #[test]
    fn default_locale_leaves_statement_untouched() {
        let provider = SqliteTranslationProvider::new(locale("en"), true);
        let mut rewritten = statement();
        provider.rewrite(&mut rewritten, Some(&locale("en")));
        assert_eq!(rewritten, statement());
    }

    #[test]
    fn rewrites_only_translatable_projections() {
        let provider = SqliteTranslationProvider::new(locale("en"), true);
        let mut rewritten = statement();
        provider.rewrite(&mut rewritten, Some(&locale("fr")));

        assert_eq!(rewritten.joins.len(), 1);
        assert_eq!(rewritten.projections[0].expr, "p.\"id\"");
        assert_eq!(
            rewritten.projections[1].expr,
            "COALESCE(p__tr_title.content, p.\"title\")"
        );
        assert!(rewritten.joins[0].sql.contains("p__tr_title.foreign_key = p.\"id\""));
        assert_eq!(rewritten.joins[0].params[2], rusqlite::types::Value::Text("fr".to_string()));
    }

    #[test]
    fn without_fallback_hydrates_translation_only() {
        let provider = SqliteTranslationProvider::new(locale("en"), false);
        let mut rewritten = statement();
        provider.rewrite(&mut rewritten, Some(&locale("de")));
        assert_eq!(rewritten.projections[1].expr, "p__tr_title.content");
    }

    #[test]
    fn missing_locale_uses_active_then_default() {
        let provider = SqliteTranslationProvider::new(locale("en"), true);
        assert_eq!(provider.effective_locale(None), locale("en"));

        provider.set_locale(&locale("es"));
        assert_eq!(provider.effective_locale(None), locale("es"));
        assert_eq!(provider.effective_locale(Some(&locale("it"))), locale("it"));
    }
}
