use crate::domain::{
    comment::errors::CommentError,
    target::{
        entity::{KeyFormat, TargetObject, expand_url},
        registry::TargetKind,
    },
};
use anyhow::anyhow;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgPool;
use uuid::Uuid;

lazy_static! {
    static ref IDENTIFIER_REGEX: Regex =
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}(\.[A-Za-z_][A-Za-z0-9_]{0,62})?$")
            .expect("identifier pattern is valid");
}

/// A primary key converted to the key column's type.
#[derive(Debug, Clone, PartialEq, Eq)]
enum KeyParam {
    Integer(i64),
    Uuid(Uuid),
    Text(String),
}

impl KeyParam {
    fn parse(format: KeyFormat, primary_key: &str) -> Option<Self> {
        let key = primary_key.trim();
        match format {
            KeyFormat::Integer => key.parse().ok().map(Self::Integer),
            KeyFormat::Uuid => Uuid::parse_str(key).ok().map(Self::Uuid),
            KeyFormat::Text => format.accepts(key).then(|| Self::Text(key.to_string())),
        }
    }
}

fn lookup_sql(table: &str, key_column: &str) -> String {
    format!(
        "SELECT {col}::text FROM {table} WHERE {col} = $1 LIMIT 1",
        col = key_column,
        table = table
    )
}

/// Host entities stored in a Postgres table, looked up by one key column.
pub struct SqlxTargetKind {
    pool: PgPool,
    key_format: KeyFormat,
    url_pattern: String,
    lookup_sql: String,
}

impl SqlxTargetKind {
    pub fn new(
        pool: PgPool,
        table: &str,
        key_column: &str,
        key_format: KeyFormat,
        url_pattern: &str,
    ) -> anyhow::Result<Self> {
        for ident in [table, key_column] {
            if !IDENTIFIER_REGEX.is_match(ident) {
                return Err(anyhow!("invalid SQL identifier {:?} in target definition", ident));
            }
        }
        Ok(Self {
            pool,
            key_format,
            url_pattern: url_pattern.to_string(),
            lookup_sql: lookup_sql(table, key_column),
        })
    }
}

#[async_trait]
impl TargetKind for SqlxTargetKind {
    fn key_format(&self) -> KeyFormat {
        self.key_format
    }

    async fn resolve(&self, primary_key: &str) -> Result<Option<TargetObject>, CommentError> {
        let Some(param) = KeyParam::parse(self.key_format, primary_key) else {
            return Ok(None);
        };
        let query = sqlx::query_scalar::<_, String>(&self.lookup_sql);
        let query = match param {
            KeyParam::Integer(id) => query.bind(id),
            KeyParam::Uuid(id) => query.bind(id),
            KeyParam::Text(key) => query.bind(key),
        };
        let found = query.fetch_optional(&self.pool).await?;
        Ok(found.map(|pk| TargetObject {
            absolute_url: self.absolute_url(&pk),
            primary_key: pk,
        }))
    }

    fn absolute_url(&self, primary_key: &str) -> String {
        expand_url(&self.url_pattern, primary_key)
    }
}
