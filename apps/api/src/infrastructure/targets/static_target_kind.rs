use crate::domain::{
    comment::errors::CommentError,
    target::{
        entity::{KeyFormat, TargetObject, expand_url},
        registry::TargetKind,
    },
};
use async_trait::async_trait;
use std::collections::HashSet;

/// Fixed set of known keys, for tests and hosts without a database table.
pub struct StaticTargetKind {
    key_format: KeyFormat,
    url_pattern: String,
    keys: HashSet<String>,
}

impl StaticTargetKind {
    pub fn new<I, S>(key_format: KeyFormat, url_pattern: &str, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key_format,
            url_pattern: url_pattern.to_string(),
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl TargetKind for StaticTargetKind {
    fn key_format(&self) -> KeyFormat {
        self.key_format
    }

    async fn resolve(&self, primary_key: &str) -> Result<Option<TargetObject>, CommentError> {
        Ok(self.keys.get(primary_key).map(|pk| TargetObject {
            primary_key: pk.clone(),
            absolute_url: self.absolute_url(pk),
        }))
    }

    fn absolute_url(&self, primary_key: &str) -> String {
        expand_url(&self.url_pattern, primary_key)
    }
}
