#![allow(dead_code)]

use localestore_core::{
    open_session_in_memory, CoreConfig, Entity, EntityId, FieldDef, Locale, Record, Session,
    StoreResult,
};
use rusqlite::types::Value;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub id: EntityId,
    pub slug: String,
    pub title: String,
    pub body: Option<String>,
    pub rank: i64,
}

impl Default for Article {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            slug: String::new(),
            title: String::new(),
            body: None,
            rank: 0,
        }
    }
}

impl Article {
    pub fn new(slug: &str, title: &str, rank: i64) -> Self {
        Self {
            slug: slug.to_string(),
            title: title.to_string(),
            rank,
            ..Self::default()
        }
    }
}

impl Entity for Article {
    const NAME: &'static str = "Article";
    const TABLE: &'static str = "articles";
    const FIELDS: &'static [FieldDef] = &[
        FieldDef::text("slug"),
        FieldDef::text("title").translatable(),
        FieldDef::text("body").translatable(),
        FieldDef::integer("rank"),
    ];

    fn id(&self) -> EntityId {
        self.id
    }

    fn field_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.slug.clone()),
            Value::Text(self.title.clone()),
            self.body.clone().map_or(Value::Null, Value::Text),
            Value::Integer(self.rank),
        ]
    }

    fn hydrate(record: &Record) -> StoreResult<Self> {
        Ok(Self {
            id: record.id("id")?,
            slug: record.text("slug")?,
            title: record.opt_text("title")?.unwrap_or_default(),
            body: record.opt_text("body")?,
            rank: record.integer("rank")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: EntityId,
    pub name: String,
}

impl Default for Category {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
        }
    }
}

impl Category {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

impl Entity for Category {
    const NAME: &'static str = "Category";
    const TABLE: &'static str = "categories";
    const FIELDS: &'static [FieldDef] = &[FieldDef::text("name").translatable()];

    fn id(&self) -> EntityId {
        self.id
    }

    fn field_values(&self) -> Vec<Value> {
        vec![Value::Text(self.name.clone())]
    }

    fn hydrate(record: &Record) -> StoreResult<Self> {
        Ok(Self {
            id: record.id("id")?,
            name: record.opt_text("name")?.unwrap_or_default(),
        })
    }
}

pub fn locale(tag: &str) -> Locale {
    Locale::parse(tag).unwrap()
}

/// In-memory session with both entity tables created.
pub fn session() -> Session {
    session_with(&CoreConfig::default())
}

pub fn session_with(config: &CoreConfig) -> Session {
    let session = open_session_in_memory(config).unwrap();
    session.ensure_schema::<Article>().unwrap();
    session.ensure_schema::<Category>().unwrap();
    session
}

/// Persists `articles` and flushes them in one transaction.
pub fn seed(session: &Session, articles: &[Article]) {
    for article in articles {
        session.persist(article);
    }
    session.flush().unwrap();
}
