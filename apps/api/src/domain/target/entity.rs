use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use ts_rs::TS;
use uuid::Uuid;

lazy_static! {
    static ref TYPE_TAG_REGEX: Regex = Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\.([A-Za-z_][A-Za-z0-9_]*)$")
        .expect("type tag pattern is valid");
}

/// Dotted `namespace.kind` name of a host entity kind, e.g. `blog.article`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeTag {
    pub namespace: String,
    pub kind: String,
}

impl TypeTag {
    pub fn parse(raw: &str) -> Option<Self> {
        let caps = TYPE_TAG_REGEX.captures(raw.trim())?;
        Some(Self {
            namespace: caps[1].to_ascii_lowercase(),
            kind: caps[2].to_ascii_lowercase(),
        })
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.kind)
    }
}

/// Polymorphic reference to a commented-on entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TargetKey {
    pub type_tag: String,
    pub primary_key: String,
}

impl TargetKey {
    pub fn new(type_tag: impl Into<String>, primary_key: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            primary_key: primary_key.into(),
        }
    }

    pub fn is_well_formed(&self) -> bool {
        TypeTag::parse(&self.type_tag).is_some() && !self.primary_key.trim().is_empty()
    }
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.type_tag, self.primary_key)
    }
}

/// A resolved target: the key plus where the entity lives on the host site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TargetRef {
    pub key: TargetKey,
    pub absolute_url: String,
}

/// What a target kind returns when an instance exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetObject {
    pub primary_key: String,
    pub absolute_url: String,
}

/// Shape of the primary keys a target kind accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyFormat {
    Integer,
    Uuid,
    Text,
}

impl KeyFormat {
    pub fn accepts(&self, key: &str) -> bool {
        let key = key.trim();
        if key.is_empty() {
            return false;
        }
        match self {
            Self::Integer => key.parse::<i64>().is_ok(),
            Self::Uuid => Uuid::parse_str(key).is_ok(),
            Self::Text => key.len() <= 255,
        }
    }
}

impl FromStr for KeyFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" => Ok(Self::Integer),
            "uuid" => Ok(Self::Uuid),
            "text" | "str" => Ok(Self::Text),
            other => Err(format!("unknown key format {:?}", other)),
        }
    }
}

/// Expands `{pk}` in a URL pattern.
pub fn expand_url(pattern: &str, primary_key: &str) -> String {
    pattern.replace("{pk}", primary_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_tags_need_exactly_one_dot() {
        assert_eq!(
            TypeTag::parse("Blog.Article").map(|t| t.to_string()),
            Some("blog.article".to_string())
        );
        assert!(TypeTag::parse("blog").is_none());
        assert!(TypeTag::parse("blog.article.extra").is_none());
        assert!(TypeTag::parse("blog.").is_none());
        assert!(TypeTag::parse("bl og.article").is_none());
    }

    #[test]
    fn key_formats_reject_malformed_keys() {
        assert!(KeyFormat::Integer.accepts("42"));
        assert!(!KeyFormat::Integer.accepts("forty-two"));
        assert!(KeyFormat::Uuid.accepts(&Uuid::now_v7().to_string()));
        assert!(!KeyFormat::Uuid.accepts("42"));
        assert!(KeyFormat::Text.accepts("intro-post"));
        assert!(!KeyFormat::Text.accepts("   "));
    }
}
